//! Error types for architecture loading and queries.

use thiserror::Error;

/// Errors produced while building or querying an [`crate::Architecture`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ArchError {
    /// The coupling-map or calibration text could not be parsed.
    #[error("malformed architecture description: {0}")]
    FormatError(String),

    /// Calibration data refers to a qubit or edge outside the declared size,
    /// or a coupling-map edge set doesn't match the properties it's paired with.
    #[error("architecture mismatch: {0}")]
    ArchMismatch(String),

    /// A fidelity-aware query was made but no calibration data is loaded.
    #[error("no fidelity data available for qubit/edge {0}")]
    NoFidelityData(String),

    /// An index was outside `0..num_qubits`.
    #[error("index {index} out of range for architecture of size {size}")]
    OutOfRange { index: u32, size: u32 },
}

/// Convenience alias for architecture-crate results.
pub type ArchResult<T> = Result<T, ArchError>;
