//! Aggregated circuit statistics and search benchmarks for a completed (or
//! timed-out) synthesis run, mirroring [`arvak_map::results::Report`]'s role
//! on the mapper side.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use arvak_tableau::CliffordOp;

use crate::objective_encoder::ObjectiveTarget;

/// One probe of the bound-search loop: the timestep bound tried and
/// whether the solver found it satisfiable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundProbe {
    pub timesteps: u64,
    pub sat: bool,
    pub elapsed_ms: u64,
}

/// The outcome of one [`crate::synthesizer::CliffordSynthesizer::synthesize`]
/// call: the synthesized circuit plus the metrics and search trace a caller
/// uses to judge solution quality and solver effort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynthesisResults {
    /// The synthesized gate sequence, in application order. Empty and
    /// `sat = false` on a run that never found a satisfying bound.
    pub circuit: Vec<CliffordOp>,
    /// The metric the search optimized for.
    pub target: Option<ObjectiveTarget>,
    /// Timestep bound of the returned model (`circuit.len() <= timesteps`
    /// since `NoOp` slots don't emit a gate).
    pub timesteps: u64,
    pub gates: u64,
    pub two_qubit_gates: u64,
    /// Active timesteps (timesteps with at least one real gate); equal to
    /// `gates` under the single-gate-per-step encoding, may be smaller
    /// under depth-optimal multi-gate-per-step synthesis.
    pub depth: u64,
    /// Whether the final returned bound was confirmed satisfiable. `false`
    /// means the run exhausted its search without a model, usually because
    /// every attempt timed out.
    pub sat: bool,
    /// Whether any solver call in this run returned `UNDEF` (timeout).
    pub timeout: bool,
    pub total_solve_time_ms: u64,
    /// Every bound tried during upper-bound and binary/linear search, in
    /// call order, for diagnosing how much search effort a circuit cost.
    pub bound_trace: Vec<BoundProbe>,
    /// Gate count removed by the post-synthesis redundant-gate pass.
    pub redundant_gates_removed: u64,
}

impl SynthesisResults {
    #[must_use]
    pub fn unsat(target: ObjectiveTarget) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }

    pub fn record_probe(&mut self, timesteps: u64, sat: bool, elapsed: Duration) {
        self.total_solve_time_ms += u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.bound_trace.push(BoundProbe {
            timesteps,
            sat,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        });
    }

    /// Whether `other` is an improvement over `self` under `target`'s
    /// primary metric, secondary metrics breaking ties per the
    /// update-on-improvement rule (gates secondary for depth and
    /// two-qubit-gates targets, and vice versa for the gates target).
    #[must_use]
    pub fn improves_on(&self, other: &SynthesisResults, target: ObjectiveTarget) -> bool {
        if !other.sat {
            return false;
        }
        if !self.sat {
            return true;
        }
        match target {
            ObjectiveTarget::Gates => {
                (other.gates, other.two_qubit_gates) < (self.gates, self.two_qubit_gates)
            }
            ObjectiveTarget::TwoQubitGates => {
                (other.two_qubit_gates, other.gates) < (self.two_qubit_gates, self.gates)
            }
            ObjectiveTarget::Depth => (other.depth, other.gates) < (self.depth, self.gates),
            ObjectiveTarget::Fidelity => other.gates < self.gates,
        }
    }

    /// Canonical JSON projection, for the same reason
    /// [`arvak_map::results::Report`] serializes: dumping intermediate or
    /// final results to disk for the CLI/binding layer.
    ///
    /// # Errors
    /// Propagates `serde_json`'s error if somehow the struct can't be
    /// serialized (should not happen for this shape).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// A single CSV row: `timesteps,gates,two_qubit_gates,depth,sat,timeout,total_solve_time_ms`.
    #[must_use]
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{}",
            self.timesteps, self.gates, self.two_qubit_gates, self.depth, self.sat, self.timeout, self.total_solve_time_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsat_result_never_improves_over_nothing() {
        let baseline = SynthesisResults::unsat(ObjectiveTarget::Gates);
        assert!(!baseline.improves_on(&baseline, ObjectiveTarget::Gates));
    }

    #[test]
    fn any_sat_result_improves_on_an_unsat_baseline() {
        let baseline = SynthesisResults::unsat(ObjectiveTarget::Gates);
        let candidate = SynthesisResults {
            sat: true,
            gates: 5,
            ..SynthesisResults::default()
        };
        assert!(baseline.improves_on(&candidate, ObjectiveTarget::Gates));
    }

    #[test]
    fn fewer_gates_improves_under_gates_target() {
        let worse = SynthesisResults {
            sat: true,
            gates: 5,
            two_qubit_gates: 2,
            ..SynthesisResults::default()
        };
        let better = SynthesisResults {
            sat: true,
            gates: 3,
            two_qubit_gates: 2,
            ..SynthesisResults::default()
        };
        assert!(worse.improves_on(&better, ObjectiveTarget::Gates));
        assert!(!better.improves_on(&worse, ObjectiveTarget::Gates));
    }

    #[test]
    fn ties_on_primary_metric_break_on_secondary() {
        let worse = SynthesisResults {
            sat: true,
            gates: 5,
            two_qubit_gates: 3,
            ..SynthesisResults::default()
        };
        let better = SynthesisResults {
            sat: true,
            gates: 5,
            two_qubit_gates: 1,
            ..SynthesisResults::default()
        };
        assert!(worse.improves_on(&better, ObjectiveTarget::Gates));
    }

    #[test]
    fn csv_row_has_seven_fields() {
        let r = SynthesisResults::default();
        assert_eq!(r.to_csv_row().split(',').count(), 7);
    }
}
