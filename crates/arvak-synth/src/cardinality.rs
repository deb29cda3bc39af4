//! "At most one" / "exactly one" Boolean cardinality encodings.
//!
//! The choice between these is a pure encoding detail: every variant below
//! is logically equivalent (models one literal true out of `vars`), they
//! only differ in the number of auxiliary variables and clauses introduced,
//! which matters for solver performance on large qubit counts.

use serde::{Deserialize, Serialize};
use z3::ast::{Ast, Bool};
use z3::Context;

use crate::solver::Assertable;

/// How a group of mutually-exclusive Boolean choices is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardinalityEncoding {
    /// Pairwise `¬(vᵢ ∧ vⱼ)` for every pair — quadratic in clause count, no
    /// auxiliary variables, cheapest to reason about for small groups.
    Naive,
    /// Commander encoding: partitions `vars` into groups, recursively
    /// constrains each group via a commander variable.
    Commander(CommanderGrouping),
    /// Bimander encoding: splits into `sqrt(n)`-sized groups with a binary
    /// (log-sized) selector, trading more auxiliary variables for fewer
    /// clauses than `Naive` on large groups.
    Bimander,
}

/// How `Commander` partitions its input variables into groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommanderGrouping {
    /// Two groups of roughly equal size.
    Halves,
    /// Fixed groups of 2.
    Fixed2,
    /// Fixed groups of 3.
    Fixed3,
    /// `log2(n)`-sized groups.
    Logarithm,
}

fn group_sizes(n: usize, grouping: CommanderGrouping) -> usize {
    match grouping {
        CommanderGrouping::Halves => n.div_ceil(2).max(1),
        CommanderGrouping::Fixed2 => 2,
        CommanderGrouping::Fixed3 => 3,
        CommanderGrouping::Logarithm => (n as f64).log2().ceil().max(1.0) as usize,
    }
}

/// Asserts `at_most_one(vars)` into `solver` using the chosen encoding.
pub fn assert_at_most_one<'ctx>(
    ctx: &'ctx Context,
    solver: &impl Assertable<'ctx>,
    vars: &[Bool<'ctx>],
    encoding: CardinalityEncoding,
) {
    if vars.len() < 2 {
        return;
    }
    match encoding {
        CardinalityEncoding::Naive => naive_at_most_one_in(ctx, solver, vars),
        CardinalityEncoding::Commander(grouping) => {
            commander_at_most_one(ctx, solver, vars, grouping);
        }
        CardinalityEncoding::Bimander => bimander_at_most_one(ctx, solver, vars),
    }
}

/// Asserts `exactly_one(vars)`: `at_most_one` plus `at_least_one`.
pub fn assert_exactly_one<'ctx>(
    ctx: &'ctx Context,
    solver: &impl Assertable<'ctx>,
    vars: &[Bool<'ctx>],
    encoding: CardinalityEncoding,
) {
    assert_at_most_one(ctx, solver, vars, encoding);
    if !vars.is_empty() {
        let refs: Vec<&Bool<'ctx>> = vars.iter().collect();
        solver.assert_bool(&Bool::or(ctx, &refs));
    }
}

fn naive_at_most_one_in<'ctx>(ctx: &'ctx Context, solver: &impl Assertable<'ctx>, vars: &[Bool<'ctx>]) {
    for i in 0..vars.len() {
        for j in (i + 1)..vars.len() {
            solver.assert_bool(&Bool::and(ctx, &[&vars[i], &vars[j]]).not());
        }
    }
}

/// Recursively splits `vars` into groups, each guarded by a commander
/// variable `c_g` that is true iff exactly one variable in group `g` is
/// true; `at_most_one` over the commander variables then bounds the whole
/// set, same as a tournament bracket.
fn commander_at_most_one<'ctx>(
    ctx: &'ctx Context,
    solver: &impl Assertable<'ctx>,
    vars: &[Bool<'ctx>],
    grouping: CommanderGrouping,
) {
    if vars.len() <= 3 {
        naive_at_most_one_in(ctx, solver, vars);
        return;
    }

    let group_size = group_sizes(vars.len(), grouping).max(2);
    let groups: Vec<&[Bool<'ctx>]> = vars.chunks(group_size).collect();

    let mut commanders = Vec::with_capacity(groups.len());
    for (gi, group) in groups.iter().enumerate() {
        naive_at_most_one_in(ctx, solver, group);
        let commander = Bool::new_const(ctx, format!("cmd_{}_{:p}", gi, group.as_ptr()));
        // commander <-> at least one of group
        let refs: Vec<&Bool<'ctx>> = group.iter().collect();
        let any = Bool::or(ctx, &refs);
        solver.assert_bool(&commander._eq(&any));
        commanders.push(commander);
    }

    commander_at_most_one(ctx, solver, &commanders, grouping);
}

/// Splits `vars` into `sqrt(n)` groups, each with a naive at-most-one
/// constraint, plus a `ceil(log2(groups))`-bit binary selector that
/// disambiguates which group holds the (at most one) true literal.
fn bimander_at_most_one<'ctx>(ctx: &'ctx Context, solver: &impl Assertable<'ctx>, vars: &[Bool<'ctx>]) {
    let n = vars.len();
    let group_count = (n as f64).sqrt().ceil().max(1.0) as usize;
    let groups: Vec<&[Bool<'ctx>]> = vars.chunks(n.div_ceil(group_count).max(1)).collect();

    let bits = (groups.len() as f64).log2().ceil().max(1.0) as usize;
    let selector: Vec<Bool<'ctx>> = (0..bits)
        .map(|b| Bool::new_const(ctx, format!("bimander_bit_{b}_{:p}", vars.as_ptr())))
        .collect();

    for (gi, group) in groups.iter().enumerate() {
        naive_at_most_one_in(ctx, solver, group);
        for &v in group.iter() {
            for (b, bit) in selector.iter().enumerate() {
                let want_true = (gi >> b) & 1 == 1;
                let literal = if want_true { bit.clone() } else { bit.not() };
                // v => selector encodes group index gi
                solver.assert_bool(&v.implies(&literal));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use z3::{Config, Context, Solver};

    fn fresh_vars<'ctx>(ctx: &'ctx Context, n: usize, prefix: &str) -> Vec<Bool<'ctx>> {
        (0..n)
            .map(|i| Bool::new_const(ctx, format!("{prefix}_{i}")))
            .collect()
    }

    #[test]
    fn naive_at_most_one_blocks_two_true() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);
        let vars = fresh_vars(&ctx, 3, "v");
        assert_at_most_one(&ctx, &solver, &vars, CardinalityEncoding::Naive);
        solver.assert_bool(&vars[0]);
        solver.assert_bool(&vars[1]);
        assert_eq!(solver.check(), z3::SatResult::Unsat);
    }

    #[test]
    fn naive_exactly_one_is_satisfiable_with_one_true() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);
        let vars = fresh_vars(&ctx, 3, "v");
        assert_exactly_one(&ctx, &solver, &vars, CardinalityEncoding::Naive);
        solver.assert_bool(&vars[0]);
        assert_eq!(solver.check(), z3::SatResult::Sat);
    }

    #[test]
    fn commander_at_most_one_blocks_two_true_on_larger_group() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);
        let vars = fresh_vars(&ctx, 8, "v");
        assert_at_most_one(
            &ctx,
            &solver,
            &vars,
            CardinalityEncoding::Commander(CommanderGrouping::Fixed2),
        );
        solver.assert_bool(&vars[0]);
        solver.assert_bool(&vars[5]);
        assert_eq!(solver.check(), z3::SatResult::Unsat);
    }

    #[test]
    fn bimander_at_most_one_blocks_two_true() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);
        let vars = fresh_vars(&ctx, 9, "v");
        assert_at_most_one(&ctx, &solver, &vars, CardinalityEncoding::Bimander);
        solver.assert_bool(&vars[0]);
        solver.assert_bool(&vars[3]);
        assert_eq!(solver.check(), z3::SatResult::Unsat);
    }
}
