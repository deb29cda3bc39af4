//! Turns a chosen optimization target into either a soft-constraint
//! objective for MaxSAT (z3 `Optimize`) or a hard `sum <= bound` assertion
//! for the binary/linear-search paths, which only ever need a SAT-level
//! yes/no answer at a given bound.

use arvak_arch::Properties;
use serde::{Deserialize, Serialize};
use z3::ast::{Ast, Bool, Int};
use z3::{Context, Optimize};

use crate::gate_encoder::GateVars;
use crate::solver::Assertable;

/// The metric the synthesizer optimizes for, mirroring the `target` config
/// option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveTarget {
    Gates,
    TwoQubitGates,
    Depth,
    Fidelity,
}

fn bool_to_int<'ctx>(ctx: &'ctx Context, b: &Bool<'ctx>) -> Int<'ctx> {
    b.ite(&Int::from_i64(ctx, 1), &Int::from_i64(ctx, 0))
}

fn sum_ints<'ctx>(ctx: &'ctx Context, ints: &[Int<'ctx>]) -> Int<'ctx> {
    if ints.is_empty() {
        return Int::from_i64(ctx, 0);
    }
    let refs: Vec<&Int<'ctx>> = ints.iter().collect();
    Int::add(ctx, &refs)
}

/// The set of Boolean indicators the chosen target sums over, collected
/// across every timestep `1..=timesteps`.
fn target_indicators<'ctx>(
    ctx: &'ctx Context,
    gates: &GateVars<'ctx>,
    timesteps: usize,
    target: ObjectiveTarget,
) -> Vec<Bool<'ctx>> {
    match target {
        ObjectiveTarget::Gates => (1..=timesteps).flat_map(|t| gates.real_gate_indicators(t)).collect(),
        ObjectiveTarget::TwoQubitGates => (1..=timesteps).flat_map(|t| gates.two_qubit_indicators(t)).collect(),
        ObjectiveTarget::Depth => (1..=timesteps).map(|t| gates.timestep_active(ctx, t)).collect(),
        ObjectiveTarget::Fidelity => Vec::new(),
    }
}

/// Per-`(timestep, indicator)` fidelity weight used by the `Fidelity`
/// target: `-ln(fidelity)` of whichever physical resource the gate
/// consumes, so minimizing the weighted sum maximizes total circuit
/// fidelity (additive under the usual independent-error approximation).
fn fidelity_weighted_terms<'ctx>(
    ctx: &'ctx Context,
    gates: &GateVars<'ctx>,
    timesteps: usize,
    properties: &Properties,
) -> Vec<Int<'ctx>> {
    let mut terms = Vec::new();
    for t in 1..=timesteps {
        for (qubit, slots) in gates.single[t].iter().enumerate() {
            for (gate, var) in slots {
                if !gate.is_real_gate() {
                    continue;
                }
                let fidelity = properties.single_qubit_fidelity(qubit as u32).unwrap_or(1.0);
                let weight = (-fidelity.max(1e-12).ln() * 1_000_000.0).round() as i64;
                let term = bool_to_int(ctx, var);
                terms.push(Int::mul(ctx, &[&term, &Int::from_i64(ctx, weight)]));
            }
        }
        for (&(a, b), var) in &gates.two[t] {
            let fidelity = properties.two_qubit_fidelity(a as u32, b as u32).unwrap_or(1.0);
            let weight = (-fidelity.max(1e-12).ln() * 1_000_000.0).round() as i64;
            let term = bool_to_int(ctx, var);
            terms.push(Int::mul(ctx, &[&term, &Int::from_i64(ctx, weight)]));
        }
    }
    terms
}

/// Asserts `sum(target indicators) <= bound` for use in binary/linear
/// bound search. Returns `false` (and asserts nothing) for `Fidelity`,
/// which has no natural integer bound and is only usable with `MaxSAT`.
#[must_use]
pub fn assert_bound<'ctx>(
    ctx: &'ctx Context,
    solver: &impl Assertable<'ctx>,
    gates: &GateVars<'ctx>,
    timesteps: usize,
    target: ObjectiveTarget,
    bound: u64,
) -> bool {
    if target == ObjectiveTarget::Fidelity {
        return false;
    }
    let indicators = target_indicators(ctx, gates, timesteps, target);
    let ints: Vec<Int<'ctx>> = indicators.iter().map(|b| bool_to_int(ctx, b)).collect();
    let sum = sum_ints(ctx, &ints);
    solver.assert_bool(&sum.le(&Int::from_i64(ctx, bound as i64)));
    true
}

/// Registers the chosen target as a soft objective to minimize on an
/// `Optimize` handle, for the MaxSAT search path.
pub fn minimize<'ctx>(
    ctx: &'ctx Context,
    optimize: &Optimize<'ctx>,
    gates: &GateVars<'ctx>,
    timesteps: usize,
    target: ObjectiveTarget,
    properties: Option<&Properties>,
) {
    let sum = if target == ObjectiveTarget::Fidelity {
        let terms = properties
            .map(|props| fidelity_weighted_terms(ctx, gates, timesteps, props))
            .unwrap_or_default();
        sum_ints(ctx, &terms)
    } else {
        let indicators = target_indicators(ctx, gates, timesteps, target);
        let ints: Vec<Int<'ctx>> = indicators.iter().map(|b| bool_to_int(ctx, b)).collect();
        sum_ints(ctx, &ints)
    };
    optimize.minimize(&sum);
}
