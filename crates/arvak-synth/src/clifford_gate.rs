//! The fixed Clifford gate set the synthesizer chooses among at each
//! timestep, plus the symbolic (Boolean) symplectic update each gate
//! applies to a tableau row — the SAT-encoding counterpart of
//! [`arvak_tableau::Tableau::apply_gate`].

use serde::{Deserialize, Serialize};
use z3::ast::{Ast, Bool};
use z3::Context;

/// A single-qubit gate slot, including the "nothing happens" case so every
/// qubit always has exactly one active single-qubit choice per timestep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SingleGate {
    NoOp,
    H,
    S,
    Sdg,
    X,
    Y,
    Z,
}

impl SingleGate {
    pub const ALL: [SingleGate; 7] = [
        SingleGate::NoOp,
        SingleGate::H,
        SingleGate::S,
        SingleGate::Sdg,
        SingleGate::X,
        SingleGate::Y,
        SingleGate::Z,
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SingleGate::NoOp => "noop",
            SingleGate::H => "h",
            SingleGate::S => "s",
            SingleGate::Sdg => "sdg",
            SingleGate::X => "x",
            SingleGate::Y => "y",
            SingleGate::Z => "z",
        }
    }

    /// Whether this slot counts toward the gate-count objective.
    #[must_use]
    pub fn is_real_gate(&self) -> bool {
        !matches!(self, SingleGate::NoOp)
    }
}

/// Builds the Boolean formula for row `r`'s new `X[q]` bit given the
/// previous-timestep bits and which single-qubit gate fired on `q`, using
/// an if-then-else chain mirroring [`arvak_tableau::Tableau`]'s gate
/// formulas. `Sdg` acts as `S` on `X`/`Z` (only the phase update differs,
/// since `S` and `S†` swap the same columns).
pub fn single_gate_new_x<'ctx>(
    _ctx: &'ctx Context,
    gate_active: &std::collections::HashMap<SingleGate, Bool<'ctx>>,
    prev_x: &Bool<'ctx>,
    prev_z: &Bool<'ctx>,
) -> Bool<'ctx> {
    // H swaps X and Z; S/Sdg leave X unchanged; X/Y/Z (Paulis) are
    // phase-only and leave X/Z unchanged; NoOp leaves X unchanged.
    let h_new_x = prev_z.clone();
    let unchanged = prev_x.clone();
    gate_active
        .get(&SingleGate::H)
        .map_or(unchanged.clone(), |h| h.ite(&h_new_x, &unchanged))
}

/// Builds the Boolean formula for row `r`'s new `Z[q]` bit.
pub fn single_gate_new_z<'ctx>(
    _ctx: &'ctx Context,
    gate_active: &std::collections::HashMap<SingleGate, Bool<'ctx>>,
    prev_x: &Bool<'ctx>,
    prev_z: &Bool<'ctx>,
) -> Bool<'ctx> {
    let h_new_z = prev_x.clone();
    let s_new_z = prev_z.xor(prev_x);
    let unchanged = prev_z.clone();

    let after_s = gate_active
        .get(&SingleGate::S)
        .map_or(unchanged.clone(), |s| s.ite(&s_new_z, &unchanged));
    let after_sdg = gate_active
        .get(&SingleGate::Sdg)
        .map_or(after_s.clone(), |sdg| sdg.ite(&s_new_z, &after_s));
    gate_active
        .get(&SingleGate::H)
        .map_or(after_sdg.clone(), |h| h.ite(&h_new_z, &after_sdg))
}

/// Builds the Boolean formula for row `r`'s phase-bit delta contributed by
/// a single-qubit gate on `q`: `H` flips iff `X∧Z`; `S` flips iff `X∧Z`
/// (`Sdg` equivalently, since `S³=S†` and the sign flip is path-independent
/// on a single application); `X` flips iff `Z`; `Y` flips iff `X⊕Z`; `Z`
/// flips iff `X`; `NoOp` never flips.
pub fn single_gate_phase_flip<'ctx>(
    ctx: &'ctx Context,
    gate_active: &std::collections::HashMap<SingleGate, Bool<'ctx>>,
    prev_x: &Bool<'ctx>,
    prev_z: &Bool<'ctx>,
) -> Bool<'ctx> {
    let both = Bool::and(ctx, &[prev_x, prev_z]);
    let xor = prev_x.xor(prev_z);
    let false_ = Bool::from_bool(ctx, false);

    let mut flip = false_.clone();
    for (gate, cond) in [
        (SingleGate::H, &both),
        (SingleGate::S, &both),
        (SingleGate::Sdg, &both),
        (SingleGate::X, prev_z),
        (SingleGate::Y, &xor),
        (SingleGate::Z, prev_x),
    ] {
        if let Some(active) = gate_active.get(&gate) {
            flip = active.ite(cond, &flip);
        }
    }
    flip
}

#[cfg(test)]
mod tests {
    use super::*;
    use z3::{Config, Context, SatResult, Solver};

    #[test]
    fn h_formula_swaps_x_and_z_when_active() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);

        let x0 = Bool::new_const(&ctx, "x0");
        let z0 = Bool::new_const(&ctx, "z0");
        solver.assert(&x0);
        solver.assert(&z0.not());

        let mut active = std::collections::HashMap::new();
        active.insert(SingleGate::H, Bool::from_bool(&ctx, true));

        let new_x = single_gate_new_x(&ctx, &active, &x0, &z0);
        let new_z = single_gate_new_z(&ctx, &active, &x0, &z0);

        solver.assert(&new_x._eq(&z0));
        solver.assert(&new_z._eq(&x0));
        assert_eq!(solver.check(), SatResult::Sat);
    }
}
