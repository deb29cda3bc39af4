//! Emits the per-timestep tableau bit variables and the constraints tying
//! timestep `t`'s bits to timestep `t-1`'s bits via whichever gate fired.

use z3::ast::{Ast, Bool};
use z3::Context;

use arvak_tableau::Tableau;

use crate::clifford_gate::{single_gate_new_x, single_gate_new_z, single_gate_phase_flip};
use crate::gate_encoder::GateVars;
use crate::solver::Assertable;

/// `X[t][row][qubit]`, `Z[t][row][qubit]`, `phase[t][row]` Boolean
/// variables across all `T+1` snapshots.
pub struct TableauVars<'ctx> {
    pub x: Vec<Vec<Vec<Bool<'ctx>>>>,
    pub z: Vec<Vec<Vec<Bool<'ctx>>>>,
    pub phase: Vec<Vec<Bool<'ctx>>>,
    num_rows: usize,
    num_qubits: usize,
    timesteps: usize,
}

impl<'ctx> TableauVars<'ctx> {
    /// Allocates fresh variables for `timesteps + 1` tableau snapshots over
    /// `num_rows` rows and `num_qubits` columns.
    #[must_use]
    pub fn new(ctx: &'ctx Context, num_rows: usize, num_qubits: usize, timesteps: usize) -> Self {
        let mut x = Vec::with_capacity(timesteps + 1);
        let mut z = Vec::with_capacity(timesteps + 1);
        let mut phase = Vec::with_capacity(timesteps + 1);

        for t in 0..=timesteps {
            let mut x_t = Vec::with_capacity(num_rows);
            let mut z_t = Vec::with_capacity(num_rows);
            let mut phase_t = Vec::with_capacity(num_rows);
            for r in 0..num_rows {
                let x_row: Vec<Bool<'ctx>> = (0..num_qubits)
                    .map(|q| Bool::new_const(ctx, format!("x_t{t}_r{r}_q{q}")))
                    .collect();
                let z_row: Vec<Bool<'ctx>> = (0..num_qubits)
                    .map(|q| Bool::new_const(ctx, format!("z_t{t}_r{r}_q{q}")))
                    .collect();
                x_t.push(x_row);
                z_t.push(z_row);
                phase_t.push(Bool::new_const(ctx, format!("phase_t{t}_r{r}")));
            }
            x.push(x_t);
            z.push(z_t);
            phase.push(phase_t);
        }

        Self {
            x,
            z,
            phase,
            num_rows,
            num_qubits,
            timesteps,
        }
    }

    /// Pins timestep `0`'s bits to `tableau`'s values.
    pub fn assert_initial(&self, ctx: &'ctx Context, solver: &impl Assertable<'ctx>, tableau: &Tableau) {
        self.assert_equal_to(ctx, solver, 0, tableau);
    }

    /// Pins the final timestep's bits to `tableau`'s values.
    pub fn assert_target(&self, ctx: &'ctx Context, solver: &impl Assertable<'ctx>, tableau: &Tableau) {
        self.assert_equal_to(ctx, solver, self.timesteps, tableau);
    }

    fn assert_equal_to(&self, ctx: &'ctx Context, solver: &impl Assertable<'ctx>, t: usize, tableau: &Tableau) {
        for r in 0..self.num_rows {
            for q in 0..self.num_qubits {
                let expected_x = Bool::from_bool(ctx, tableau.x_bit(r, q));
                let expected_z = Bool::from_bool(ctx, tableau.z_bit(r, q));
                solver.assert_bool(&self.x[t][r][q]._eq(&expected_x));
                solver.assert_bool(&self.z[t][r][q]._eq(&expected_z));
            }
            let expected_phase = Bool::from_bool(ctx, tableau.phase_bit(r));
            solver.assert_bool(&self.phase[t][r]._eq(&expected_phase));
        }
    }

    /// Asserts the gate-action constraints biconditionally tying timestep
    /// `t`'s bits to timestep `t-1`'s bits and the gates active at `t`,
    /// under the single-gate-per-step encoding: at `t`, at most one qubit
    /// pair fires a `gTwo` gate and every other qubit's `gSingle` choice
    /// (including the other member of that pair, forced to `NoOp`) governs
    /// its own row transformation.
    pub fn assert_transition(&self, ctx: &'ctx Context, solver: &impl Assertable<'ctx>, t: usize, gates: &GateVars<'ctx>) {
        for r in 0..self.num_rows {
            let mut phase_flip = Bool::from_bool(ctx, false);

            for q in 0..self.num_qubits {
                let prev_x = &self.x[t - 1][r][q];
                let prev_z = &self.z[t - 1][r][q];

                let single_active = &gates.single[t][q];

                let mut new_x = single_gate_new_x(ctx, single_active, prev_x, prev_z);
                let mut new_z = single_gate_new_z(ctx, single_active, prev_x, prev_z);
                let single_flip = single_gate_phase_flip(ctx, single_active, prev_x, prev_z);
                phase_flip = phase_flip.xor(&single_flip);

                // Two-qubit gates: `a` is control, `b` is target for every
                // `gTwo[t][a][b]` this qubit participates in. Exactly one
                // `gTwo` can be active per timestep under the single-gate
                // encoding, and a qubit touched by one has its `gSingle`
                // forced to `NoOp` by the gate encoder, so the two updates
                // never both apply to the same qubit.
                for (&(a, b), active) in &gates.two[t] {
                    if a == q {
                        let xc = &self.x[t - 1][r][a];
                        let zc = &self.z[t - 1][r][a];
                        let xt = &self.x[t - 1][r][b];
                        let zt = &self.z[t - 1][r][b];
                        let new_zc = zc.xor(zt);
                        new_z = active.ite(&new_zc, &new_z);
                        let cx_flip = Bool::and(ctx, &[xc, zt, &xt.xor(zc).not()]);
                        let gated_flip = active.ite(&cx_flip, &Bool::from_bool(ctx, false));
                        phase_flip = phase_flip.xor(&gated_flip);
                    } else if b == q {
                        let xc = &self.x[t - 1][r][a];
                        let xt = &self.x[t - 1][r][b];
                        let new_xt = xt.xor(xc);
                        new_x = active.ite(&new_xt, &new_x);
                    }
                }

                solver.assert_bool(&self.x[t][r][q]._eq(&new_x));
                solver.assert_bool(&self.z[t][r][q]._eq(&new_z));
            }

            let new_phase = self.phase[t - 1][r].xor(&phase_flip);
            solver.assert_bool(&self.phase[t][r]._eq(&new_phase));
        }
    }
}
