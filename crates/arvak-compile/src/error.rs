//! Error types for the compilation framework.

use thiserror::Error;

/// Errors that can occur while running a [`crate::pass::Pass`] or
/// [`crate::manager::PassManager`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// An underlying IR operation failed (bad qubit, arity mismatch, ...).
    #[error(transparent)]
    Ir(#[from] arvak_ir::IrError),

    /// The heuristic qubit mapper could not route the circuit.
    #[error(transparent)]
    Map(#[from] arvak_map::MapError),

    /// A pass required a property that hadn't been set by an earlier pass.
    #[error("missing required property: {0}")]
    MissingProperty(String),

    /// A gate fell outside the set this pass knows how to place on hardware.
    #[error("gate '{0}' is not supported by this pass")]
    UnsupportedGate(String),

    /// An optimization pass detected that a gate was reordered across a
    /// measurement boundary.
    #[error(
        "measurement barrier violated: '{gate_name}' on qubit {qubit} ({detail})"
    )]
    MeasurementViolation {
        /// Name of the offending gate.
        gate_name: String,
        /// Physical/logical index of the qubit involved.
        qubit: u32,
        /// Human-readable detail of the violation.
        detail: String,
    },
}

/// Convenience alias for compile-crate results.
pub type CompileResult<T> = Result<T, CompileError>;
