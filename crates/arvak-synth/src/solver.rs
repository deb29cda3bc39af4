//! Thin wrapper around the z3 SAT/MaxSAT backend: applies a timeout budget
//! to a single solver call and turns `Unknown` into [`SynthError::SolverTimeout`].

use std::time::{Duration, Instant};

use z3::ast::Bool;
use z3::{Context, Optimize, Params, SatResult, Solver};

use crate::error::{SynthError, SynthResult};

/// Lets the encoders (tableau, gate, objective, cardinality) assert into
/// either a plain [`Solver`] (SAT-only bound search) or an [`Optimize`]
/// handle (MaxSAT search) without duplicating every constraint-building
/// method for both backends.
pub trait Assertable<'ctx> {
    fn assert_bool(&self, b: &Bool<'ctx>);
}

impl<'ctx> Assertable<'ctx> for Solver<'ctx> {
    fn assert_bool(&self, b: &Bool<'ctx>) {
        self.assert(b);
    }
}

impl<'ctx> Assertable<'ctx> for Optimize<'ctx> {
    fn assert_bool(&self, b: &Bool<'ctx>) {
        self.assert(b);
    }
}

/// Outcome of a single bounded solver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    Sat,
    Unsat,
}

fn timeout_ms(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}

/// Runs `solver.check()` under `timeout`, mapping `Unknown` (expiry or
/// resource limit) to [`SynthError::SolverTimeout`].
pub fn check_with_timeout<'ctx>(ctx: &'ctx Context, solver: &Solver<'ctx>, timeout: Duration) -> SynthResult<SolveOutcome> {
    let mut params = Params::new(ctx);
    params.set_u32("timeout", timeout_ms(timeout));
    solver.set_params(&params);

    let start = Instant::now();
    match solver.check() {
        SatResult::Sat => Ok(SolveOutcome::Sat),
        SatResult::Unsat => Ok(SolveOutcome::Unsat),
        SatResult::Unknown => Err(SynthError::SolverTimeout {
            elapsed_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

/// Runs `optimize.check(&[])` under `timeout` for the MaxSAT search path.
pub fn optimize_with_timeout<'ctx>(ctx: &'ctx Context, optimize: &Optimize<'ctx>, timeout: Duration) -> SynthResult<SolveOutcome> {
    let mut params = Params::new(ctx);
    params.set_u32("timeout", timeout_ms(timeout));
    optimize.set_params(&params);

    let start = Instant::now();
    match optimize.check(&[]) {
        SatResult::Sat => Ok(SolveOutcome::Sat),
        SatResult::Unsat => Ok(SolveOutcome::Unsat),
        SatResult::Unknown => Err(SynthError::SolverTimeout {
            elapsed_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use z3::ast::Bool;
    use z3::Config;

    #[test]
    fn trivial_satisfiable_problem_reports_sat() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);
        let v = Bool::new_const(&ctx, "v");
        solver.assert(&v);
        assert_eq!(check_with_timeout(&ctx, &solver, Duration::from_secs(5)).unwrap(), SolveOutcome::Sat);
    }

    #[test]
    fn contradiction_reports_unsat() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);
        let v = Bool::new_const(&ctx, "v");
        solver.assert(&v);
        solver.assert(&v.not());
        assert_eq!(check_with_timeout(&ctx, &solver, Duration::from_secs(5)).unwrap(), SolveOutcome::Unsat);
    }
}
