//! Error types for tableau construction and parsing.

use thiserror::Error;

/// Errors produced while building, applying gates to, or parsing a
/// [`crate::Tableau`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TableauError {
    /// A qubit index was outside `0..num_qubits`.
    #[error("qubit index {index} out of range for {num_qubits}-qubit tableau")]
    QubitOutOfRange { index: usize, num_qubits: usize },

    /// The serialized tableau text didn't match the expected row/column
    /// shape or contained invalid characters.
    #[error("malformed tableau text: {0}")]
    FormatError(String),
}

/// Convenience alias for tableau-crate results.
pub type TableauResult<T> = Result<T, TableauError>;
