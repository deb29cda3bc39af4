//! The `gSingle[t][qubit][gate]` and `gTwo[t][a][b]` decision variables,
//! restricted to edges present in the coupling map passed to
//! [`GateVars::new`], and the structural constraints binding them under
//! either of two [`TimestepEncoding`]s: at most one gate anywhere in a
//! timestep (gate-optimal search), or at most one gate per qubit
//! (depth-optimal search, which lets disjoint two-qubit gates share a
//! timestep).

use std::collections::HashMap;

use z3::ast::Bool;
use z3::Context;

use crate::cardinality::{assert_at_most_one, assert_exactly_one, CardinalityEncoding};
use crate::clifford_gate::SingleGate;
use crate::solver::Assertable;

/// Decision variables for every timestep `1..=T` (timestep `0` is the fixed
/// initial tableau and has no gate choice).
pub struct GateVars<'ctx> {
    /// `single[t][qubit][gate]`, `t` in `1..=T`, `0` unused.
    pub single: Vec<Vec<HashMap<SingleGate, Bool<'ctx>>>>,
    /// `two[t][(a, b)]`, `t` in `1..=T`, `0` unused. Only contains entries
    /// for edges present in the coupling map passed to [`GateVars::new`].
    pub two: Vec<HashMap<(usize, usize), Bool<'ctx>>>,
}

/// How many gates a single timestep may contain.
///
/// Gate-optimal and two-qubit-gate-optimal synthesis use
/// `SingleGatePerStep`: a timestep does exactly one thing, so minimizing
/// the number of timesteps with a real gate directly minimizes gate count.
/// Depth-optimal synthesis uses `MultiGatePerStep`: several two-qubit gates
/// on disjoint qubits (or single-qubit gates on the qubits they don't
/// touch) may fire in the same timestep, so depth (timesteps with *any*
/// active gate) can be smaller than gate count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestepEncoding {
    SingleGatePerStep,
    MultiGatePerStep,
}

impl<'ctx> GateVars<'ctx> {
    /// Allocates gate decision variables for `timesteps` steps over
    /// `num_qubits` physical qubits, with two-qubit gates restricted to
    /// `coupling` (directed pairs `(control, target)`).
    #[must_use]
    pub fn new(
        ctx: &'ctx Context,
        num_qubits: usize,
        timesteps: usize,
        coupling: &[(usize, usize)],
    ) -> Self {
        let mut single = Vec::with_capacity(timesteps + 1);
        single.push(Vec::new());
        let mut two = Vec::with_capacity(timesteps + 1);
        two.push(HashMap::new());

        for t in 1..=timesteps {
            let mut single_t = Vec::with_capacity(num_qubits);
            for q in 0..num_qubits {
                let mut gates = HashMap::new();
                for g in SingleGate::ALL {
                    gates.insert(g, Bool::new_const(ctx, format!("g1_t{t}_q{q}_{}", g.name())));
                }
                single_t.push(gates);
            }
            single.push(single_t);

            let mut two_t = HashMap::new();
            for &(a, b) in coupling {
                two_t.insert((a, b), Bool::new_const(ctx, format!("g2_t{t}_{a}_{b}")));
            }
            two.push(two_t);
        }

        Self { single, two }
    }

    /// Asserts the structural constraints for `mode`; see
    /// [`TimestepEncoding`] for what each mode allows within one timestep.
    pub fn assert_structure(
        &self,
        ctx: &'ctx Context,
        solver: &impl Assertable<'ctx>,
        encoding: CardinalityEncoding,
        mode: TimestepEncoding,
    ) {
        match mode {
            TimestepEncoding::SingleGatePerStep => self.assert_structure_single(ctx, solver, encoding),
            TimestepEncoding::MultiGatePerStep => self.assert_structure_multi(ctx, solver, encoding),
        }
    }

    /// Each qubit picks exactly one single-qubit gate (to parameterize its
    /// own row-transformation formula), and exactly one *real* gate fires
    /// in the timestep overall — one qubit's non-`NoOp` choice, or one
    /// two-qubit gate — so a timestep is never idle: under this encoding
    /// `T` timesteps mean exactly `T` gates, which is what lets
    /// gate-optimal search minimize gate count by minimizing `T` directly.
    fn assert_structure_single(&self, ctx: &'ctx Context, solver: &impl Assertable<'ctx>, encoding: CardinalityEncoding) {
        let timesteps = self.single.len() - 1;
        for t in 1..=timesteps {
            for gates in &self.single[t] {
                let vars: Vec<Bool<'ctx>> = SingleGate::ALL.iter().map(|g| gates[g].clone()).collect();
                assert_exactly_one(ctx, solver, &vars, encoding);
            }

            let real_this_step: Vec<Bool<'ctx>> = self.real_gate_indicators(t);
            assert_exactly_one(ctx, solver, &real_this_step, encoding);

            for (&(a, b), active) in &self.two[t] {
                let noop_a = &self.single[t][a][&SingleGate::NoOp];
                let noop_b = &self.single[t][b][&SingleGate::NoOp];
                solver.assert_bool(&active.implies(noop_a));
                solver.assert_bool(&active.implies(noop_b));
            }
        }
    }

    /// Each qubit picks exactly one gate to be part of this timestep: one
    /// of its own single-qubit slots, or a two-qubit gate on an edge it's
    /// an endpoint of. Unlike [`Self::assert_structure_single`] this is a
    /// single combined exactly-one per qubit rather than a separate
    /// single/two split, which is what lets disjoint two-qubit gates (and
    /// single-qubit gates on the qubits they don't touch) coexist in the
    /// same timestep.
    fn assert_structure_multi(&self, ctx: &'ctx Context, solver: &impl Assertable<'ctx>, encoding: CardinalityEncoding) {
        let timesteps = self.single.len() - 1;
        for t in 1..=timesteps {
            let num_qubits = self.single[t].len();
            for q in 0..num_qubits {
                let mut vars: Vec<Bool<'ctx>> = SingleGate::ALL.iter().map(|g| self.single[t][q][g].clone()).collect();
                for (&(a, b), active) in &self.two[t] {
                    if a == q || b == q {
                        vars.push(active.clone());
                    }
                }
                assert_exactly_one(ctx, solver, &vars, encoding);
            }
        }
    }

    /// Counts how many real (non-`NoOp`, non-identity-two-qubit) gates are
    /// active at `t`, as a list of Boolean indicators for the objective
    /// encoder to sum over.
    #[must_use]
    pub fn real_gate_indicators(&self, t: usize) -> Vec<Bool<'ctx>> {
        let mut out = Vec::new();
        for gates in &self.single[t] {
            for g in SingleGate::ALL {
                if g.is_real_gate() {
                    out.push(gates[&g].clone());
                }
            }
        }
        out.extend(self.two[t].values().cloned());
        out
    }

    /// The two-qubit gate indicators active at `t`, for the `TwoQubitGates`
    /// objective.
    #[must_use]
    pub fn two_qubit_indicators(&self, t: usize) -> Vec<Bool<'ctx>> {
        self.two[t].values().cloned().collect()
    }

    /// Whether timestep `t` has any real gate active at all, for the `Depth`
    /// objective (a no-op timestep doesn't count toward depth).
    #[must_use]
    pub fn timestep_active(&self, ctx: &'ctx Context, t: usize) -> Bool<'ctx> {
        let indicators = self.real_gate_indicators(t);
        if indicators.is_empty() {
            return Bool::from_bool(ctx, false);
        }
        let refs: Vec<&Bool<'ctx>> = indicators.iter().collect();
        Bool::or(ctx, &refs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use z3::{Config, SatResult, Solver};

    #[test]
    fn exactly_one_single_gate_choice_is_satisfiable() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);

        let vars = GateVars::new(&ctx, 2, 1, &[(0, 1)]);
        vars.assert_structure(&ctx, &solver, CardinalityEncoding::Naive, TimestepEncoding::SingleGatePerStep);
        assert_eq!(solver.check(), SatResult::Sat);
    }

    #[test]
    fn two_qubit_gate_forces_noop_on_both_endpoints() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);

        let vars = GateVars::new(&ctx, 2, 1, &[(0, 1)]);
        vars.assert_structure(&ctx, &solver, CardinalityEncoding::Naive, TimestepEncoding::SingleGatePerStep);
        solver.assert_bool(&vars.two[1][&(0, 1)]);
        solver.assert_bool(&vars.single[1][0][&SingleGate::H]);
        assert_eq!(solver.check(), SatResult::Unsat);
    }

    #[test]
    fn at_most_one_two_qubit_gate_per_timestep() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);

        let vars = GateVars::new(&ctx, 3, 1, &[(0, 1), (1, 2)]);
        vars.assert_structure(&ctx, &solver, CardinalityEncoding::Naive, TimestepEncoding::SingleGatePerStep);
        solver.assert_bool(&vars.two[1][&(0, 1)]);
        solver.assert_bool(&vars.two[1][&(1, 2)]);
        assert_eq!(solver.check(), SatResult::Unsat);
    }

    #[test]
    fn multi_gate_per_step_allows_disjoint_two_qubit_gates_together() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);

        let vars = GateVars::new(&ctx, 4, 1, &[(0, 1), (2, 3)]);
        vars.assert_structure(&ctx, &solver, CardinalityEncoding::Naive, TimestepEncoding::MultiGatePerStep);
        solver.assert_bool(&vars.two[1][&(0, 1)]);
        solver.assert_bool(&vars.two[1][&(2, 3)]);
        assert_eq!(solver.check(), SatResult::Sat);
    }

    #[test]
    fn multi_gate_per_step_still_forbids_sharing_a_qubit() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);

        let vars = GateVars::new(&ctx, 3, 1, &[(0, 1), (1, 2)]);
        vars.assert_structure(&ctx, &solver, CardinalityEncoding::Naive, TimestepEncoding::MultiGatePerStep);
        solver.assert_bool(&vars.two[1][&(0, 1)]);
        solver.assert_bool(&vars.two[1][&(1, 2)]);
        assert_eq!(solver.check(), SatResult::Unsat);
    }
}
