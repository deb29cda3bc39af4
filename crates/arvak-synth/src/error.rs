//! Error types for the Clifford synthesizer.

use thiserror::Error;

use arvak_tableau::TableauError;

/// Errors produced while configuring or running [`crate::synthesizer::CliffordSynthesizer`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SynthError {
    /// A gate in an initial circuit fell outside the Clifford set the
    /// synthesizer operates over.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The two source tableaux have mismatched qubit counts or
    /// destabilizer-tracking mode.
    #[error("tableau mismatch: {0}")]
    TableauMismatch(String),

    /// A two-qubit gate was requested between physical qubits with no
    /// coupling edge.
    #[error("qubits {a} and {b} are not coupled")]
    NotCoupled { a: usize, b: usize },

    /// The solver returned `UNDEF` (timeout or resource limit) before a
    /// verdict was reached.
    #[error("solver timed out after {elapsed_ms}ms")]
    SolverTimeout { elapsed_ms: u64 },

    /// The upper-bound search exceeded its configured timestep ceiling
    /// without finding a satisfying model.
    #[error("no satisfying assignment found within {max_timesteps} timesteps")]
    UpperBoundExceeded { max_timesteps: u64 },
}

impl From<TableauError> for SynthError {
    fn from(err: TableauError) -> Self {
        SynthError::UnsupportedOperation(err.to_string())
    }
}

/// Convenience alias for synthesis-crate results.
pub type SynthResult<T> = Result<T, SynthError>;
