//! Reporting: per-layer routing outcomes and the aggregate benchmark
//! statistics a caller uses to judge how hard a circuit was to route.

use serde::{Deserialize, Serialize};

use crate::layer::Layer;
use crate::node::Swap;

/// What the router did to make a single layer's gates executable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerReport {
    /// SWAPs inserted, in application order, as physical-qubit edges.
    pub swaps: Vec<Swap>,
    /// Cost of the inserted SWAPs (topology cost, or fidelity cost when the
    /// fidelity heuristic is active).
    pub swap_cost: f64,
    /// Cost charged for two-qubit gates whose direction disagrees with the
    /// physical edge's native CX direction, requiring H-wraps.
    pub reversal_cost: f64,
    /// Number of gate occurrences that needed a direction reversal.
    pub reversed_gates: u32,
    /// Nodes expanded by the A\* search to resolve this layer (`0` if the
    /// layer was already valid on arrival).
    pub nodes_expanded: usize,
    /// The (possibly automatically split) logical layer this report
    /// resolved, so a caller can replay which original gates it covers.
    pub layer: Layer,
    /// Logical→physical layout in effect before this layer's SWAPs.
    pub locations_before: Vec<u32>,
    /// Logical→physical layout in effect after this layer's SWAPs, i.e.
    /// the one its gates (and any later layer's root) should use.
    pub locations_after: Vec<u32>,
}

impl LayerReport {
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.swap_cost + self.reversal_cost
    }
}

/// The outcome of routing an entire op stream: one [`LayerReport`] per
/// layer plus the layout in effect once the last layer was resolved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingResult {
    pub layers: Vec<LayerReport>,
    /// Physical→logical assignment after the final layer.
    pub final_qubits: Vec<u32>,
    /// Logical→physical assignment after the final layer.
    pub final_locations: Vec<u32>,
}

impl RoutingResult {
    #[must_use]
    pub fn total_swap_cost(&self) -> f64 {
        self.layers.iter().map(LayerReport::total_cost).sum()
    }

    #[must_use]
    pub fn total_swaps(&self) -> usize {
        self.layers.iter().map(|l| l.swaps.len()).sum()
    }

    #[must_use]
    pub fn total_nodes_expanded(&self) -> usize {
        self.layers.iter().map(|l| l.nodes_expanded).sum()
    }

    /// Builds the aggregate [`Report`] summarizing this run.
    #[must_use]
    pub fn report(&self) -> Report {
        let total_layers = self.layers.len();
        let total_nodes = self.total_nodes_expanded();
        Report {
            total_layers,
            total_swaps: self.total_swaps(),
            total_swap_cost: self.total_swap_cost(),
            total_reversed_gates: self.layers.iter().map(|l| l.reversed_gates).sum(),
            total_nodes_expanded: total_nodes,
            effective_branching_factor: effective_branching_factor(total_nodes, total_layers),
        }
    }
}

/// Circuit- and search-level summary statistics for a completed routing run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Report {
    pub total_layers: usize,
    pub total_swaps: usize,
    pub total_swap_cost: f64,
    pub total_reversed_gates: u32,
    pub total_nodes_expanded: usize,
    /// The branching factor `b` such that a uniform tree of depth
    /// `total_layers` and `b` children per node would expand exactly
    /// `total_nodes_expanded` nodes; `None` if there were no layers or no
    /// expansions to measure.
    pub effective_branching_factor: Option<f64>,
}

/// Solves `1 + b + b^2 + ... + b^depth == nodes` for `b` via binary search,
/// converging to within `1e-10`. This is the standard effective branching
/// factor used to characterize how "wide" a search was independent of its
/// depth, letting different circuits' search difficulty be compared on one
/// scale.
#[must_use]
fn effective_branching_factor(nodes: usize, depth: usize) -> Option<f64> {
    if depth == 0 || nodes == 0 {
        return None;
    }
    let nodes = nodes as f64;
    let depth = depth as f64;

    let geometric_sum = |b: f64| -> f64 {
        if (b - 1.0).abs() < 1e-12 {
            depth + 1.0
        } else {
            (b.powf(depth + 1.0) - 1.0) / (b - 1.0)
        }
    };

    let mut lo = 1.0_f64;
    let mut hi = nodes.max(2.0);
    // geometric_sum is monotonically increasing in b for b > 0.
    while geometric_sum(hi) < nodes {
        hi *= 2.0;
    }

    for _ in 0..200 {
        let mid = (lo + hi) / 2.0;
        if hi - lo < 1e-10 {
            break;
        }
        if geometric_sum(mid) < nodes {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Some((lo + hi) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branching_factor_of_single_node_tree_is_none_without_depth() {
        assert_eq!(effective_branching_factor(1, 0), None);
    }

    #[test]
    fn branching_factor_of_a_line_is_one() {
        // depth 3, 4 nodes total (root + 3 descendants in a single chain):
        // 1 + b + b^2 + b^3 = 4 has the exact solution b = 1.
        let b = effective_branching_factor(4, 3).unwrap();
        assert!((b - 1.0).abs() < 1e-6);
    }

    #[test]
    fn branching_factor_of_a_binary_tree_is_two() {
        // depth 3 full binary tree: 1 + 2 + 4 + 8 = 15 nodes.
        let b = effective_branching_factor(15, 3).unwrap();
        assert!((b - 2.0).abs() < 1e-6);
    }

    #[test]
    fn report_aggregates_layer_costs() {
        let result = RoutingResult {
            layers: vec![
                LayerReport {
                    swaps: vec![(0, 1)],
                    swap_cost: 30.0,
                    reversal_cost: 4.0,
                    reversed_gates: 1,
                    nodes_expanded: 5,
                    layer: Layer::default(),
                    locations_before: vec![0, 1],
                    locations_after: vec![1, 0],
                },
                LayerReport {
                    swaps: vec![],
                    swap_cost: 0.0,
                    reversal_cost: 0.0,
                    reversed_gates: 0,
                    nodes_expanded: 1,
                    layer: Layer::default(),
                    locations_before: vec![1, 0],
                    locations_after: vec![1, 0],
                },
            ],
            final_qubits: vec![0, 1],
            final_locations: vec![0, 1],
        };
        let report = result.report();
        assert_eq!(report.total_swaps, 1);
        assert_eq!(report.total_swap_cost, 34.0);
        assert_eq!(report.total_reversed_gates, 1);
        assert_eq!(report.total_nodes_expanded, 6);
    }
}
