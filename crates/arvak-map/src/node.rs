//! A\* search node: a candidate physical layout plus the SWAP path that
//! reached it.
//!
//! Nodes are stored in a flat arena (see [`crate::router::AStarRouter`]) and
//! referenced by `u32` id rather than through owned parent pointers — this
//! turns bulk frontier eviction into an `O(1)` drop of the arena itself,
//! with no back-edge bookkeeping required (§9 of the design notes: "Cyclic
//! graphs and pointer graphs").

/// One step of the SWAP path: a physical edge `(a, b)` swapped.
pub type Swap = (u32, u32);

/// A node in the A\* search over physical-qubit layouts for a single layer.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// This node's id in the owning arena.
    pub id: u32,
    /// This node's parent in the owning arena, `None` for the root.
    pub parent: Option<u32>,

    /// Physical→logical assignment: `qubits[p]` is the logical qubit
    /// currently placed at physical qubit `p`, or `u32::MAX` if free.
    pub qubits: Vec<u32>,
    /// Logical→physical assignment, the inverse of `qubits`:
    /// `locations[q] == p` iff `qubits[p] == q`.
    pub locations: Vec<u32>,

    /// SWAPs chosen from the layer's root to reach this node, each a
    /// physical edge.
    pub swaps: Vec<Swap>,

    /// Accumulated cost of the swaps taken so far (`g`-cost).
    pub cost_fixed: f64,
    /// Accumulated cost including direction-reversal charges, populated
    /// only once a node is confirmed as a goal (kept separate from
    /// `cost_fixed` so non-goal comparisons stay reversal-agnostic during
    /// search, matching the heuristic's own treatment of reversals).
    pub cost_fixed_reversals: f64,
    /// Heuristic estimate of remaining cost (`h`-cost).
    pub cost_heur: f64,
    /// Depreciated lookahead penalty from future layers.
    pub lookahead_penalty: f64,

    /// Number of SWAPs on this node's path that simultaneously reduced
    /// distance for two logical pairs considered during expansion.
    pub shared_swaps: u32,
    /// Number of SWAPs taken to reach this node from the layer root.
    pub depth: u32,
    /// `true` iff every two-qubit gate in the current layer is mapped onto
    /// an existing (undirected) architecture edge.
    pub valid_mapping: bool,
}

impl SearchNode {
    /// The root node for a layer: the incoming layout, no SWAPs taken.
    #[must_use]
    pub fn root(qubits: Vec<u32>, locations: Vec<u32>) -> Self {
        Self {
            id: 0,
            parent: None,
            qubits,
            locations,
            swaps: Vec::new(),
            cost_fixed: 0.0,
            cost_fixed_reversals: 0.0,
            cost_heur: 0.0,
            lookahead_penalty: 0.0,
            shared_swaps: 0,
            depth: 0,
            valid_mapping: false,
        }
    }

    /// Total estimated cost `f = g + h`, including the lookahead penalty,
    /// used to order the search frontier.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.cost_fixed + self.cost_heur + self.lookahead_penalty
    }

    /// Builds a child by applying a SWAP between physical qubits `a` and
    /// `b`. Does not recompute `cost_heur`; the caller fills that in once
    /// the child's layer-validity is known.
    #[must_use]
    pub fn child_with_swap(&self, id: u32, a: u32, b: u32, swap_cost: f64) -> Self {
        let mut qubits = self.qubits.clone();
        qubits.swap(a as usize, b as usize);
        let mut locations = self.locations.clone();
        for (logical, &physical) in qubits.iter().enumerate() {
            if physical != u32::MAX {
                locations[physical as usize] = logical as u32;
            }
        }

        let mut swaps = self.swaps.clone();
        swaps.push((a, b));

        Self {
            id,
            parent: Some(self.id),
            qubits,
            locations,
            swaps,
            cost_fixed: self.cost_fixed + swap_cost,
            cost_fixed_reversals: 0.0,
            cost_heur: 0.0,
            lookahead_penalty: 0.0,
            shared_swaps: self.shared_swaps,
            depth: self.depth + 1,
            valid_mapping: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_no_swaps_and_zero_cost() {
        let root = SearchNode::root(vec![0, 1, 2], vec![0, 1, 2]);
        assert!(root.swaps.is_empty());
        assert_eq!(root.total_cost(), 0.0);
        assert_eq!(root.depth, 0);
        assert!(root.parent.is_none());
    }

    #[test]
    fn child_swap_updates_both_permutations() {
        let root = SearchNode::root(vec![0, 1, 2], vec![0, 1, 2]);
        let child = root.child_with_swap(1, 0, 1, 30.0);
        assert_eq!(child.qubits, vec![1, 0, 2]);
        assert_eq!(child.locations, vec![1, 0, 2]);
        assert_eq!(child.cost_fixed, 30.0);
        assert_eq!(child.depth, 1);
        assert_eq!(child.parent, Some(0));
        assert_eq!(child.swaps, vec![(0, 1)]);
    }

    #[test]
    fn permutation_invariant_holds_after_swap() {
        let root = SearchNode::root(vec![2, 0, 1], vec![1, 2, 0]);
        let child = root.child_with_swap(1, 0, 2, 30.0);
        for (logical, &physical) in child.qubits.iter().enumerate() {
            assert_eq!(child.locations[physical as usize], logical as u32);
        }
    }
}
