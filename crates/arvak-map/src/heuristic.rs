//! Cost-to-go heuristics the A* router uses to rank candidate layouts.

use arvak_arch::Architecture;
use serde::{Deserialize, Serialize};

use crate::layer::Layer;

/// A heuristic family for estimating the remaining SWAP cost of making a
/// layer's gates executable from a given layout.
///
/// `GateCountMaxDistance` and `GateCountSumDistance` are admissible (never
/// overestimate the true minimal SWAP count) because each counts, at worst,
/// the BFS hop distance a gate's operands must close — which is a lower
/// bound on the SWAPs needed. `GateCountSumDistanceMinusSharedSwaps`
/// relaxes admissibility by crediting SWAPs that would simultaneously help
/// two gates, which is usually but not always realizable, trading
/// guaranteed optimality for a tighter, faster-converging estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Heuristic {
    /// Maximum, over the layer's gates, of the operands' physical distance.
    GateCountMaxDistance,
    /// Sum, over the layer's gates, of the operands' physical distance.
    GateCountSumDistance,
    /// Sum of distances minus a credit for SWAPs estimated to benefit more
    /// than one gate simultaneously. Not admissible.
    GateCountSumDistanceMinusSharedSwaps,
    /// The max of the two admissible variants, refined by the shared-swap
    /// credit when it doesn't push the estimate below the admissible floor.
    GateCountMaxDistanceOrSumDistanceMinusSharedSwaps,
    /// Fidelity-aware variant: estimates cost in `-log2(fidelity)` units
    /// using the architecture's calibration data rather than raw hop
    /// count, picking the highest-fidelity path for each gate.
    FidelityBestLocation,
}

impl Heuristic {
    /// Whether this heuristic never overestimates the true remaining cost.
    #[must_use]
    pub fn is_admissible(&self) -> bool {
        matches!(
            self,
            Heuristic::GateCountMaxDistance | Heuristic::GateCountSumDistance
        )
    }

    /// Whether this heuristic is both admissible and exactly equal to the
    /// true cost on single-gate layers (a stronger guarantee than mere
    /// admissibility, useful for early termination).
    #[must_use]
    pub fn is_tight(&self) -> bool {
        matches!(self, Heuristic::GateCountMaxDistance)
    }

    /// Whether this heuristic consults calibration data rather than pure
    /// topology.
    #[must_use]
    pub fn is_fidelity_aware(&self) -> bool {
        matches!(self, Heuristic::FidelityBestLocation)
    }

    /// Whether this heuristic is admissible "in principle" — i.e. would be
    /// admissible if its shared-swap credit were disabled. Used by the
    /// router to decide whether an A* run with this heuristic can safely
    /// claim optimality.
    #[must_use]
    pub fn is_principally_admissible(&self) -> bool {
        self.is_admissible()
            || matches!(
                self,
                Heuristic::GateCountMaxDistanceOrSumDistanceMinusSharedSwaps
            )
    }

    /// Estimates the remaining SWAP cost of `layer` given the current
    /// logical-to-physical `layout`.
    #[must_use]
    pub fn estimate(&self, arch: &Architecture, layout: &[u32], layer: &Layer) -> f64 {
        match self {
            Heuristic::GateCountMaxDistance => self.max_distance(arch, layout, layer),
            Heuristic::GateCountSumDistance => self.sum_distance(arch, layout, layer),
            Heuristic::GateCountSumDistanceMinusSharedSwaps => {
                self.sum_distance(arch, layout, layer) - self.shared_swap_credit(arch, layout, layer)
            }
            Heuristic::GateCountMaxDistanceOrSumDistanceMinusSharedSwaps => {
                let admissible = self.max_distance(arch, layout, layer);
                let relaxed = self.sum_distance(arch, layout, layer)
                    - self.shared_swap_credit(arch, layout, layer);
                admissible.max(relaxed.min(self.sum_distance(arch, layout, layer)))
            }
            Heuristic::FidelityBestLocation => self.fidelity_cost(arch, layout, layer),
        }
    }

    fn gate_distance(arch: &Architecture, layout: &[u32], gate: (u32, u32)) -> f64 {
        let p0 = layout[gate.0 as usize];
        let p1 = layout[gate.1 as usize];
        f64::from(arch.distance(p0, p1).unwrap_or(0).saturating_sub(1))
    }

    fn max_distance(&self, arch: &Architecture, layout: &[u32], layer: &Layer) -> f64 {
        layer
            .gates
            .iter()
            .map(|&g| Self::gate_distance(arch, layout, g))
            .fold(0.0, f64::max)
    }

    fn sum_distance(&self, arch: &Architecture, layout: &[u32], layer: &Layer) -> f64 {
        layer
            .gates
            .iter()
            .map(|&g| Self::gate_distance(arch, layout, g))
            .sum()
    }

    /// Estimates SWAPs that lie on more than one gate's shortest path and
    /// so could be credited once instead of once per gate.
    fn shared_swap_credit(&self, arch: &Architecture, layout: &[u32], layer: &Layer) -> f64 {
        use rustc_hash::FxHashMap;
        let mut edge_uses: FxHashMap<(u32, u32), u32> = FxHashMap::default();
        for &(l0, l1) in &layer.gates {
            let p0 = layout[l0 as usize];
            let p1 = layout[l1 as usize];
            if let Some(path) = arch.shortest_path(p0, p1) {
                for window in path.windows(2) {
                    let key = if window[0] <= window[1] {
                        (window[0], window[1])
                    } else {
                        (window[1], window[0])
                    };
                    *edge_uses.entry(key).or_insert(0) += 1;
                }
            }
        }
        edge_uses
            .values()
            .filter(|&&count| count > 1)
            .map(|&count| f64::from(count - 1))
            .sum()
    }

    /// `costHeur = pair_costs − savings_potential`: the fidelity cost of
    /// relocating every two-qubit pair onto its nearest edge, minus the
    /// best achievable improvement in single-qubit gate fidelity for any
    /// logical qubit that still carries 1Q gates in this layer (crediting
    /// moves toward a physical qubit with better calibrated fidelity).
    fn fidelity_cost(&self, arch: &Architecture, layout: &[u32], layer: &Layer) -> f64 {
        let pair_costs: f64 = layer
            .gates
            .iter()
            .map(|&(l0, l1)| {
                let p0 = layout[l0 as usize];
                let p1 = layout[l1 as usize];
                let Some(path) = arch.shortest_path(p0, p1) else {
                    return f64::INFINITY;
                };
                path.windows(2)
                    .map(|w| arch.fidelity_swap_cost(w[0], w[1]).unwrap_or(1.0))
                    .sum()
            })
            .sum();

        let single_qubit_cost = |p: u32| -> f64 {
            arch.properties()
                .and_then(|props| props.single_qubit_fidelity(p).ok())
                .map_or(0.0, |f| -f.log2())
        };

        let savings_potential: f64 = layer
            .single_qubit_mult
            .iter()
            .map(|(&q, &mult)| {
                let current = layout[q as usize];
                let current_cost = single_qubit_cost(current);
                (0..layout.len() as u32)
                    .filter(|&p| p != current)
                    .map(|p| {
                        let move_cost = arch.fidelity_distance(current, p, 0);
                        f64::from(mult) * (current_cost - single_qubit_cost(p)) - move_cost
                    })
                    .fold(0.0_f64, f64::max)
            })
            .sum();

        pair_costs - savings_potential
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(n: u32) -> Architecture {
        Architecture::new(n, (0..n - 1).map(|i| (i, i + 1)).collect())
    }

    #[test]
    fn max_distance_is_zero_for_adjacent_gate() {
        let arch = linear(3);
        let layout = vec![0, 1, 2];
        let layer = Layer::from_gates(vec![(0, 1)]);
        assert_eq!(
            Heuristic::GateCountMaxDistance.estimate(&arch, &layout, &layer),
            0.0
        );
    }

    #[test]
    fn max_distance_grows_with_separation() {
        let arch = linear(3);
        let layout = vec![0, 1, 2];
        let layer = Layer::from_gates(vec![(0, 2)]);
        assert_eq!(
            Heuristic::GateCountMaxDistance.estimate(&arch, &layout, &layer),
            1.0
        );
    }

    #[test]
    fn admissible_heuristics_never_exceed_sum_distance() {
        let arch = linear(5);
        let layout = vec![0, 1, 2, 3, 4];
        let layer = Layer::from_gates(vec![(0, 4), (1, 3)]);
        let sum = Heuristic::GateCountSumDistance.estimate(&arch, &layout, &layer);
        let max = Heuristic::GateCountMaxDistance.estimate(&arch, &layout, &layer);
        assert!(max <= sum);
    }

    #[test]
    fn predicates_classify_families_correctly() {
        assert!(Heuristic::GateCountMaxDistance.is_admissible());
        assert!(Heuristic::GateCountMaxDistance.is_tight());
        assert!(!Heuristic::GateCountSumDistanceMinusSharedSwaps.is_admissible());
        assert!(Heuristic::FidelityBestLocation.is_fidelity_aware());
        assert!(Heuristic::GateCountMaxDistanceOrSumDistanceMinusSharedSwaps.is_principally_admissible());
    }
}
