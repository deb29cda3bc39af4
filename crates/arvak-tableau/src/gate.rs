//! The Clifford gate set a [`crate::Tableau`] can apply.
//!
//! Deliberately independent of `arvak-ir`'s `StandardGate`: the synthesizer
//! and the tableau evolve Clifford circuits before they're lowered into full
//! IR instructions, and the tableau's gate set is a fixed, closed algebra
//! rather than the IR's open-ended gate library.

use serde::{Deserialize, Serialize};

/// A single-qubit or two-qubit Clifford generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CliffordOp {
    H(usize),
    S(usize),
    Sdg(usize),
    X(usize),
    Y(usize),
    Z(usize),
    Cx(usize, usize),
    Swap(usize, usize),
}

impl CliffordOp {
    /// Qubits this operation touches, in operand order.
    #[must_use]
    pub fn qubits(&self) -> Vec<usize> {
        match *self {
            CliffordOp::H(q) | CliffordOp::S(q) | CliffordOp::Sdg(q) | CliffordOp::X(q)
            | CliffordOp::Y(q) | CliffordOp::Z(q) => vec![q],
            CliffordOp::Cx(a, b) | CliffordOp::Swap(a, b) => vec![a, b],
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CliffordOp::H(_) => "h",
            CliffordOp::S(_) => "s",
            CliffordOp::Sdg(_) => "sdg",
            CliffordOp::X(_) => "x",
            CliffordOp::Y(_) => "y",
            CliffordOp::Z(_) => "z",
            CliffordOp::Cx(_, _) => "cx",
            CliffordOp::Swap(_, _) => "swap",
        }
    }
}
