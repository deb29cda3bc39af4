//! Property-based tests for tableau string round-tripping and gate algebra.

use arvak_tableau::{CliffordOp, Tableau};
use proptest::prelude::*;

/// Generates a random Clifford gate acting within `num_qubits`.
fn arb_gate(num_qubits: usize) -> impl Strategy<Value = CliffordOp> {
    if num_qubits < 2 {
        prop_oneof![
            (0..num_qubits).prop_map(CliffordOp::H),
            (0..num_qubits).prop_map(CliffordOp::S),
            (0..num_qubits).prop_map(CliffordOp::Sdg),
            (0..num_qubits).prop_map(CliffordOp::X),
            (0..num_qubits).prop_map(CliffordOp::Y),
            (0..num_qubits).prop_map(CliffordOp::Z),
        ]
        .boxed()
    } else {
        prop_oneof![
            (0..num_qubits).prop_map(CliffordOp::H),
            (0..num_qubits).prop_map(CliffordOp::S),
            (0..num_qubits).prop_map(CliffordOp::Sdg),
            (0..num_qubits).prop_map(CliffordOp::X),
            (0..num_qubits).prop_map(CliffordOp::Y),
            (0..num_qubits).prop_map(CliffordOp::Z),
            (0..num_qubits, 0..num_qubits)
                .prop_filter("control and target must differ", |(c, t)| c != t)
                .prop_map(|(c, t)| CliffordOp::Cx(c, t)),
            (0..num_qubits, 0..num_qubits)
                .prop_filter("swap endpoints must differ", |(a, b)| a != b)
                .prop_map(|(a, b)| CliffordOp::Swap(a, b)),
        ]
        .boxed()
    }
}

fn arb_gate_sequence(num_qubits: usize) -> impl Strategy<Value = Vec<CliffordOp>> {
    prop::collection::vec(arb_gate(num_qubits), 0..20)
}

proptest! {
    /// `Tableau::to_string_repr` / `Tableau::from_string` round-trips for any
    /// tableau reachable by a random Clifford gate sequence, with and
    /// without destabilizers tracked.
    #[test]
    fn string_round_trip_is_identity(
        num_qubits in 1_usize..=4,
        include_destabilizers in any::<bool>(),
        gates in arb_gate_sequence(4),
    ) {
        let mut t = Tableau::new(num_qubits, include_destabilizers);
        for gate in &gates {
            if gate.qubits().iter().all(|&q| q < num_qubits) {
                let _ = t.apply_gate(*gate);
            }
        }
        let text = t.to_string_repr();
        let parsed = Tableau::from_string(&text, num_qubits).unwrap();
        prop_assert!(t.equals(&parsed));
    }

    /// Applying the same gate sequence twice to two independently built
    /// identity tableaux always yields equal tableaux (determinism).
    #[test]
    fn gate_application_is_deterministic(
        num_qubits in 1_usize..=4,
        gates in arb_gate_sequence(4),
    ) {
        let mut a = Tableau::new(num_qubits, true);
        let mut b = Tableau::new(num_qubits, true);
        for gate in &gates {
            if gate.qubits().iter().all(|&q| q < num_qubits) {
                let _ = a.apply_gate(*gate);
                let _ = b.apply_gate(*gate);
            }
        }
        prop_assert!(a.equals(&b));
    }

    /// Every generator in the Clifford set used here has finite order, so
    /// replaying it enough times returns to the identity: `H`, `X`, `Y`,
    /// `Z`, `Cx`, and `Swap` are all involutions (order 2); `S` has order 4.
    #[test]
    fn involutions_return_to_identity(num_qubits in 1_usize..=3) {
        for q in 0..num_qubits {
            let mut t = Tableau::new(num_qubits, true);
            let identity = t.clone();
            t.apply_h(q).unwrap();
            t.apply_h(q).unwrap();
            prop_assert!(t.equals(&identity));

            let mut t = Tableau::new(num_qubits, true);
            t.apply_x(q).unwrap();
            t.apply_x(q).unwrap();
            prop_assert!(t.equals(&identity));

            let mut t = Tableau::new(num_qubits, true);
            t.apply_y(q).unwrap();
            t.apply_y(q).unwrap();
            prop_assert!(t.equals(&identity));

            let mut t = Tableau::new(num_qubits, true);
            t.apply_z(q).unwrap();
            t.apply_z(q).unwrap();
            prop_assert!(t.equals(&identity));
        }
        if num_qubits >= 2 {
            let mut t = Tableau::new(num_qubits, true);
            let identity = t.clone();
            t.apply_cx(0, 1).unwrap();
            t.apply_cx(0, 1).unwrap();
            prop_assert!(t.equals(&identity));

            let mut t = Tableau::new(num_qubits, true);
            t.apply_swap(0, 1).unwrap();
            t.apply_swap(0, 1).unwrap();
            prop_assert!(t.equals(&identity));
        }
    }
}
