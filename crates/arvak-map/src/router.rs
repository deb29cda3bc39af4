//! The A\* qubit router: turns a layered logical gate stream into a
//! physical-qubit layout plus the SWAPs needed to make each layer's
//! two-qubit gates executable.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use arvak_arch::Architecture;

use crate::early_termination::{EarlyTermination, SearchProgress};
use crate::error::{MapError, MapResult};
use crate::frontier::PriorityFrontier;
use crate::heuristic::Heuristic;
use crate::initial_layout::{self, InitialLayoutPolicy};
use crate::layer::{Layer, LayerOp, Layerer};
use crate::lookahead::{self, LookaheadConfig};
use crate::node::SearchNode;
use crate::results::{LayerReport, RoutingResult};

/// Tunable knobs for one routing run.
#[derive(Debug, Clone, Copy)]
pub struct RouterConfig {
    pub heuristic: Heuristic,
    pub lookahead: LookaheadConfig,
    pub initial_layout: InitialLayoutPolicy,
    pub early_termination: EarlyTermination,
    /// Arena/frontier capacity per layer, beyond which the layer is split
    /// (if splittable) or the search gives up with [`MapError::AllocationExhaustion`].
    pub max_nodes_per_layer: usize,
    /// Number of bidirectional routing passes: after an initial forward
    /// pass, the circuit (and its resulting layout) is routed again in
    /// reverse to smooth out a poor initial layout, repeated up to this
    /// many times.
    pub bidirectional_passes: u32,
    /// Documented no-op, kept for parity with the original binding surface.
    ///
    /// The search already allows SWAPs before the first layer's gates
    /// regardless of this flag: the root node for layer 0 starts with an
    /// empty swap list, but nothing stops the search from adding swaps to
    /// reach a goal for layer 0 exactly as it would for any later layer.
    /// There is no discernible behavioral difference between `true` and
    /// `false` here, so the field is retained without inventing new
    /// semantics for it.
    pub swap_on_first_layer: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            heuristic: Heuristic::GateCountMaxDistanceOrSumDistanceMinusSharedSwaps,
            lookahead: LookaheadConfig::new(5, 0.5),
            initial_layout: InitialLayoutPolicy::Static,
            early_termination: EarlyTermination::ExpandedNodes(10_000),
            max_nodes_per_layer: 5_000,
            bidirectional_passes: 0,
            swap_on_first_layer: false,
        }
    }
}

/// Reason a goal candidate is considered valid: every two-qubit gate in the
/// layer sits on an architecture edge under the candidate layout.
fn is_valid_mapping(arch: &Architecture, locations: &[u32], layer: &Layer) -> bool {
    layer
        .gates
        .iter()
        .all(|&(l0, l1)| arch.is_connected(locations[l0 as usize], locations[l1 as usize]))
}

/// Count of the layer's two-qubit gates already on an architecture edge
/// under `locations` — the frontier's `validMappedSize` tie-break term.
fn valid_mapped_count(arch: &Architecture, locations: &[u32], layer: &Layer) -> u32 {
    layer
        .gates
        .iter()
        .filter(|&&(l0, l1)| arch.is_connected(locations[l0 as usize], locations[l1 as usize]))
        .count() as u32
}

/// Direction-reversal cost charged at a goal node: for every two-qubit gate
/// whose control/target orientation disagrees with the physical edge's
/// native CX direction, [`arvak_arch::COST_DIRECTION_REVERSE`] is charged
/// once per occurrence, tallied separately from the SWAP cost so forward and
/// reverse gates can be reported individually.
fn reversal_cost(arch: &Architecture, locations: &[u32], layer: &Layer) -> (f64, u32) {
    let mut cost = 0.0;
    let mut reversed = 0;
    for (&(q0, q1), &(fwd, rev)) in &layer.two_qubit_mult {
        let p0 = locations[q0 as usize];
        let p1 = locations[q1 as usize];
        if arch.is_bidirectional(p0, p1) {
            continue;
        }
        let native_is_q0_to_q1 = arch.is_native_direction(p0, p1);
        let (matching, mismatching) = if native_is_q0_to_q1 {
            (fwd, rev)
        } else {
            (rev, fwd)
        };
        let _ = matching;
        cost += f64::from(mismatching) * f64::from(arvak_arch::COST_DIRECTION_REVERSE);
        reversed += mismatching;
    }
    (cost, reversed)
}

/// A\* router over layered logical gate streams.
#[derive(Debug, Clone)]
pub struct AStarRouter {
    config: RouterConfig,
    layerer: Layerer,
}

impl AStarRouter {
    #[must_use]
    pub fn new(config: RouterConfig, layerer: Layerer) -> Self {
        Self { config, layerer }
    }

    /// Routes a program-order op stream of `num_logical` logical qubits
    /// onto `arch`, returning the SWAPs inserted per layer and the final
    /// logical→physical layout. Each op is assigned its position in `ops`
    /// as its original-stream index (see [`Self::route_indexed`] for
    /// callers that need those indices to line up with a larger stream).
    #[instrument(skip(self, arch, ops))]
    pub fn route(
        &self,
        arch: &Architecture,
        num_logical: u32,
        ops: &[LayerOp],
    ) -> MapResult<RoutingResult> {
        let indexed: Vec<(LayerOp, usize)> = ops.iter().copied().zip(0..).collect();
        self.route_indexed(arch, num_logical, &indexed)
    }

    /// Like [`Self::route`], but each op already carries the index
    /// identifying it in some larger original instruction stream. A caller
    /// that needs to replay each [`LayerReport`]'s gates back against that
    /// original stream (rather than against `ops` alone) should use this so
    /// the indices it gets back in `report.layer` are the real ones.
    #[instrument(skip(self, arch, ops))]
    pub fn route_indexed(
        &self,
        arch: &Architecture,
        num_logical: u32,
        ops: &[(LayerOp, usize)],
    ) -> MapResult<RoutingResult> {
        if num_logical > arch.num_qubits() {
            return Err(MapError::CircuitTooLarge {
                required: num_logical,
                available: arch.num_qubits(),
            });
        }

        let layers = self.layerer.build_from_indexed_ops(ops);
        let mut result = self.route_layers(arch, num_logical, &layers)?;

        for pass in 0..self.config.bidirectional_passes {
            debug!(pass, "running bidirectional routing pass");
            let reversed: Vec<Layer> = layers.iter().rev().cloned().collect();
            let mut reverse_result = self.route_layers(arch, num_logical, &reversed)?;
            reverse_result.layers.reverse();
            if reverse_result.total_swap_cost() < result.total_swap_cost() {
                result = reverse_result;
            }
        }

        Ok(result)
    }

    /// Routes an already-layered op stream, splitting any layer that blows
    /// the node budget before giving up on it.
    fn route_layers(
        &self,
        arch: &Architecture,
        num_logical: u32,
        layers: &[Layer],
    ) -> MapResult<RoutingResult> {
        let (mut qubits, mut locations) =
            initial_layout::compute(self.config.initial_layout, arch, num_logical, layers.first());

        let mut reports = Vec::with_capacity(layers.len());
        let mut pending: Vec<Layer> = layers.to_vec();
        pending.reverse(); // process front-to-back via pop()

        let mut cursor = 0usize;
        while let Some(layer) = pending.pop() {
            let future: Vec<Layer> = pending.iter().rev().take(self.config.lookahead.depth).cloned().collect();

            match self.route_one_layer(arch, &qubits, &locations, &layer, &future) {
                Ok((report, new_qubits, new_locations)) => {
                    qubits = new_qubits;
                    locations = new_locations;
                    reports.push(report);
                    cursor += 1;
                }
                Err(MapError::AllocationExhaustion { .. }) if layer.is_splittable() => {
                    debug!(cursor, "layer exceeded node budget, splitting");
                    let (a, b) = layer.split();
                    pending.push(b);
                    pending.push(a);
                }
                Err(err) => return Err(err),
            }
        }

        Ok(RoutingResult {
            layers: reports,
            final_qubits: qubits,
            final_locations: locations,
        })
    }

    /// Runs one A\* search to find the cheapest SWAP path making `layer`'s
    /// gates executable from `(qubits, locations)`, returning the report
    /// plus the resulting layout.
    fn route_one_layer(
        &self,
        arch: &Architecture,
        qubits: &[u32],
        locations: &[u32],
        layer: &Layer,
        future_layers: &[Layer],
    ) -> MapResult<(LayerReport, Vec<u32>, Vec<u32>)> {
        let mut locations = locations.to_vec();
        let mut qubits = qubits.to_vec();

        // Dynamic layout: map any as-yet-unseen logical qubit this layer
        // touches before routing begins.
        for &(l0, l1) in &layer.gates {
            if locations[l0 as usize] == initial_layout::UNMAPPED {
                initial_layout::map_on_demand(arch, &mut qubits, &mut locations, l0, Some(l1));
            }
            if locations[l1 as usize] == initial_layout::UNMAPPED {
                initial_layout::map_on_demand(arch, &mut qubits, &mut locations, l1, Some(l0));
            }
        }
        for &q in layer.single_qubit_mult.keys() {
            if locations[q as usize] == initial_layout::UNMAPPED {
                initial_layout::map_on_demand(arch, &mut qubits, &mut locations, q, None);
            }
        }

        if is_valid_mapping(arch, &locations, layer) {
            let (reversal, reversed_gates) = reversal_cost(arch, &locations, layer);
            return Ok((
                LayerReport {
                    swaps: Vec::new(),
                    swap_cost: 0.0,
                    reversal_cost: reversal,
                    reversed_gates,
                    nodes_expanded: 0,
                    layer: layer.clone(),
                    locations_before: locations.clone(),
                    locations_after: locations.clone(),
                },
                qubits,
                locations,
            ));
        }

        let locations_before = locations.clone();
        let root = SearchNode::root(qubits.clone(), locations.clone());
        let mut arena: Vec<SearchNode> = vec![root];
        let mut frontier = PriorityFrontier::new(self.config.max_nodes_per_layer.max(1));
        let mut progress = SearchProgress::new();
        let mut best: Option<u64> = None;

        frontier.push(
            0,
            arena[0].locations.clone(),
            self.f_cost(arch, &arena[0], layer, future_layers),
            is_valid_mapping(arch, &arena[0].locations, layer),
            arena[0].cost_heur,
            valid_mapped_count(arch, &arena[0].locations, layer),
        );

        while let Some(node_id) = frontier.pop() {
            if arena.len() > self.config.max_nodes_per_layer {
                return Err(MapError::AllocationExhaustion {
                    expansions: progress.expanded,
                });
            }
            progress.record_expansion();

            let valid = is_valid_mapping(arch, &arena[node_id as usize].locations, layer);
            if valid {
                let (reversal, _) = reversal_cost(arch, &arena[node_id as usize].locations, layer);
                let node = &mut arena[node_id as usize];
                node.valid_mapping = true;
                node.cost_fixed_reversals = node.cost_fixed + reversal;
                progress.record_solution(node.total_cost());
                best = Some(node_id);
                break;
            }

            if progress.should_stop(self.config.early_termination) {
                break;
            }

            let active: FxHashSet<u32> = layer
                .active_qubits()
                .into_iter()
                .map(|q| arena[node_id as usize].locations[q as usize])
                .collect();

            let mut candidate_edges: Vec<(u32, u32)> = Vec::new();
            for &p in &active {
                for &n in arch.neighbors(p) {
                    let edge = if p <= n { (p, n) } else { (n, p) };
                    if !candidate_edges.contains(&edge) {
                        candidate_edges.push(edge);
                    }
                }
            }

            for (a, b) in candidate_edges {
                let Some(swap_cost) = arch.swap_cost(a, b) else {
                    continue;
                };
                let child_id = arena.len() as u32;
                let mut child = arena[node_id as usize].child_with_swap(child_id, a, b, f64::from(swap_cost));
                child.shared_swaps = shared_swap_bonus(arch, &arena[node_id as usize].locations, layer, a, b);
                let heur = self.heuristic_with_lookahead(arch, &child.locations, layer, future_layers);
                child.cost_heur = heur;
                let f = child.total_cost();
                let child_valid = is_valid_mapping(arch, &child.locations, layer);
                let child_valid_mapped_size = valid_mapped_count(arch, &child.locations, layer);
                arena.push(child);
                frontier.push(
                    u64::from(child_id),
                    arena[child_id as usize].locations.clone(),
                    f,
                    child_valid,
                    heur,
                    child_valid_mapped_size,
                );
            }
        }

        let Some(goal_id) = best else {
            return Err(MapError::NoViableMapping);
        };

        let goal = &arena[goal_id as usize];
        let (reversal, reversed_gates) = reversal_cost(arch, &goal.locations, layer);

        Ok((
            LayerReport {
                swaps: goal.swaps.clone(),
                swap_cost: goal.cost_fixed,
                reversal_cost: reversal,
                reversed_gates,
                nodes_expanded: progress.expanded,
                layer: layer.clone(),
                locations_before,
                locations_after: goal.locations.clone(),
            },
            goal.qubits.clone(),
            goal.locations.clone(),
        ))
    }

    fn heuristic_with_lookahead(
        &self,
        arch: &Architecture,
        locations: &[u32],
        layer: &Layer,
        future_layers: &[Layer],
    ) -> f64 {
        let base = self.config.heuristic.estimate(arch, locations, layer);
        let look = lookahead::penalty(self.config.lookahead, self.config.heuristic, arch, locations, future_layers);
        base + look
    }

    fn f_cost(&self, arch: &Architecture, node: &SearchNode, layer: &Layer, future_layers: &[Layer]) -> f64 {
        node.cost_fixed + self.heuristic_with_lookahead(arch, &node.locations, layer, future_layers)
    }
}

/// Credits a SWAP `(a, b)` once for every gate in `layer` whose operand
/// distance it reduces, used as a diagnostic counter rather than a search
/// input (the heuristic's own shared-swap credit drives the ranking).
fn shared_swap_bonus(arch: &Architecture, locations: &[u32], layer: &Layer, a: u32, b: u32) -> u32 {
    let mut count = 0;
    for &(l0, l1) in &layer.gates {
        let p0 = locations[l0 as usize];
        let p1 = locations[l1 as usize];
        let before = arch.distance(p0, p1).unwrap_or(u32::MAX);
        let moved0 = if p0 == a { b } else if p0 == b { a } else { p0 };
        let moved1 = if p1 == a { b } else if p1 == b { a } else { p1 };
        if (moved0, moved1) == (p0, p1) {
            continue;
        }
        let after = arch.distance(moved0, moved1).unwrap_or(u32::MAX);
        if after < before {
            count += 1;
        }
    }
    if count > 1 {
        count
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayeringPolicy;

    fn linear(n: u32) -> Architecture {
        Architecture::new(n, (0..n - 1).flat_map(|i| [(i, i + 1), (i + 1, i)]).collect())
    }

    fn router(config: RouterConfig) -> AStarRouter {
        AStarRouter::new(config, Layerer::new(LayeringPolicy::DisjointQubits, None))
    }

    #[test]
    fn already_adjacent_gate_needs_no_swaps() {
        let arch = linear(3);
        let r = router(RouterConfig {
            initial_layout: InitialLayoutPolicy::Identity,
            ..RouterConfig::default()
        });
        let result = r.route(&arch, 3, &[LayerOp::Two(0, 1)]).unwrap();
        assert_eq!(result.layers.len(), 1);
        assert!(result.layers[0].swaps.is_empty());
    }

    #[test]
    fn distant_gate_requires_at_least_one_swap() {
        let arch = linear(4);
        let r = router(RouterConfig {
            initial_layout: InitialLayoutPolicy::Identity,
            ..RouterConfig::default()
        });
        let result = r.route(&arch, 4, &[LayerOp::Two(0, 3)]).unwrap();
        assert!(!result.layers[0].swaps.is_empty());
        assert!(arch.is_connected(
            result.final_locations[0],
            result.final_locations[3]
        ));
    }

    #[test]
    fn sequential_layers_compound_the_layout() {
        let arch = linear(4);
        let r = router(RouterConfig {
            initial_layout: InitialLayoutPolicy::Identity,
            ..RouterConfig::default()
        });
        let result = r
            .route(&arch, 4, &[LayerOp::Two(0, 3), LayerOp::Two(1, 2)])
            .unwrap();
        assert_eq!(result.layers.len(), 2);
    }

    #[test]
    fn circuit_larger_than_device_is_rejected() {
        let arch = linear(2);
        let r = router(RouterConfig::default());
        let err = r.route(&arch, 4, &[]).unwrap_err();
        assert!(matches!(err, MapError::CircuitTooLarge { .. }));
    }

    #[test]
    fn tiny_node_budget_forces_a_split_or_exhausts() {
        let arch = linear(6);
        let r = router(RouterConfig {
            initial_layout: InitialLayoutPolicy::Identity,
            max_nodes_per_layer: 2,
            early_termination: EarlyTermination::ExpandedNodes(2),
            ..RouterConfig::default()
        });
        // A single disjoint-qubit layer over many far-apart pairs; whether
        // it succeeds via splitting or exhausts, it must not panic.
        let _ = r.route(
            &arch,
            6,
            &[LayerOp::Two(0, 5), LayerOp::Two(1, 4), LayerOp::Two(2, 3)],
        );
    }

    /// Directed IBM QX4-style bow-tie: two triangles {0,1,2} and {2,3,4}
    /// sharing the hub qubit 2, with the same CX directions IBM QX4 ships
    /// (control listed first).
    fn directed_bow_tie() -> Architecture {
        Architecture::new(5, vec![(1, 0), (2, 0), (2, 1), (3, 2), (3, 4), (2, 4)])
    }

    #[test]
    fn dynamic_layout_center_pivots_a_shared_control_onto_a_bow_tie() {
        let arch = directed_bow_tie();
        let r = router(RouterConfig {
            heuristic: Heuristic::GateCountMaxDistance,
            initial_layout: InitialLayoutPolicy::Dynamic,
            ..RouterConfig::default()
        });
        // `q0` is the shared control of both gates; on a bow-tie, a
        // dynamic layout can always land it on a hub physical qubit
        // adjacent to both partners' physical qubits, needing no swaps.
        let result = r
            .route(&arch, 3, &[LayerOp::Two(0, 1), LayerOp::Two(0, 2)])
            .unwrap();
        assert_eq!(result.total_swaps(), 0);
        let locations = &result.final_locations;
        assert!(arch.is_connected(locations[0], locations[1]));
        assert!(arch.is_connected(locations[0], locations[2]));
    }

    #[test]
    fn one_reversed_edge_wraps_in_hadamards_with_no_swaps() {
        let arch = Architecture::new(2, vec![(1, 0)]);
        let r = router(RouterConfig {
            initial_layout: InitialLayoutPolicy::Identity,
            ..RouterConfig::default()
        });
        let result = r.route(&arch, 2, &[LayerOp::Two(0, 1)]).unwrap();
        assert_eq!(result.layers.len(), 1);
        assert!(result.layers[0].swaps.is_empty());
        assert_eq!(result.layers[0].reversed_gates, 1);
    }

    #[test]
    fn one_bidirectional_pass_never_increases_the_swap_count() {
        let arch = linear(3);
        let ops = [
            LayerOp::Two(0, 1),
            LayerOp::Two(1, 2),
            LayerOp::Two(0, 2),
        ];

        let without = router(RouterConfig {
            initial_layout: InitialLayoutPolicy::Identity,
            bidirectional_passes: 0,
            ..RouterConfig::default()
        })
        .route(&arch, 3, &ops)
        .unwrap();

        let with = router(RouterConfig {
            initial_layout: InitialLayoutPolicy::Identity,
            bidirectional_passes: 1,
            ..RouterConfig::default()
        })
        .route(&arch, 3, &ops)
        .unwrap();

        assert!(with.total_swaps() <= without.total_swaps());
    }
}
