//! Error types for the heuristic qubit mapper.

use thiserror::Error;

/// Errors produced while laying out or routing a circuit onto an
/// [`arvak_arch::Architecture`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MapError {
    /// The circuit has more logical qubits than the device has physical
    /// qubits.
    #[error("circuit requires {required} qubits but the device only has {available}")]
    CircuitTooLarge { required: u32, available: u32 },

    /// The search frontier emptied without finding a sequence of SWAPs that
    /// makes the current layer's gates executable.
    #[error("no viable mapping found for the current layer")]
    NoViableMapping,

    /// The search exhausted its node budget (arena capacity or expansion
    /// limit) before converging.
    #[error("search exhausted its allocation budget after {expansions} expansions")]
    AllocationExhaustion { expansions: usize },

    /// An operation referenced a qubit outside the architecture's range.
    #[error("qubit {index} out of range for {num_qubits}-qubit architecture")]
    QubitOutOfRange { index: u32, num_qubits: u32 },

    /// A static or pre-supplied layout didn't cover every logical qubit.
    #[error("incomplete layout: {0}")]
    IncompleteLayout(String),
}

/// Convenience alias for mapper-crate results.
pub type MapResult<T> = Result<T, MapError>;
