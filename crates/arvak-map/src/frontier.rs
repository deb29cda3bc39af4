//! Bounded min-priority queue of search nodes, deduplicated by permutation
//! identity so the router never explores the same layout twice at a worse
//! cost.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

/// An entry in the frontier, ordered by the total key `(totalCost,
/// validMapping-first, heurCost, validMappedSize-desc, qubits-lex)`.
#[derive(Debug, Clone, PartialEq)]
struct Entry {
    total_cost: f64,
    /// `true` iff every two-qubit gate in the layer is already on an
    /// architecture edge under this entry's permutation — goal candidates
    /// sort ahead of non-goal nodes at equal `total_cost`.
    valid_mapping: bool,
    heur_cost: f64,
    /// Count of the layer's two-qubit gates already on an architecture
    /// edge; higher ranks better (closer to a goal) as a tie-break.
    valid_mapped_size: u32,
    qubits: Vec<u32>,
    node_id: u64,
}

impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed throughout so `BinaryHeap` (a max-heap) pops the entry
        // that ranks lowest under the key first.
        other
            .total_cost
            .partial_cmp(&self.total_cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.valid_mapping.cmp(&other.valid_mapping))
            .then_with(|| {
                other
                    .heur_cost
                    .partial_cmp(&self.heur_cost)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| self.valid_mapped_size.cmp(&other.valid_mapped_size))
            .then_with(|| other.qubits.cmp(&self.qubits))
            .then_with(|| other.node_id.cmp(&self.node_id))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue over search nodes, keyed by the full `(totalCost,
/// validMapping-first, heurCost, validMappedSize-desc, qubits-lex)` tuple,
/// that keeps at most one entry per distinct permutation (the layout a node
/// represents).
///
/// When a node arrives for a permutation already in the frontier, only the
/// one with strictly lower `totalCost` survives — deduplication looks at
/// `totalCost` alone, since that is the dominant term of the ordering key
/// and the remaining fields exist only to break ties between otherwise
/// equal-cost, distinct-permutation entries. When the frontier grows past
/// `capacity`, it is trimmed back down to roughly one sixth of capacity,
/// discarding the entries that rank worst under the key — bounding memory
/// on wide searches at the cost of occasionally dropping a node that would
/// have led to the optimal path.
pub struct PriorityFrontier {
    heap: BinaryHeap<Entry>,
    best_cost_for_permutation: FxHashMap<Vec<u32>, f64>,
    node_permutation: FxHashMap<u64, Vec<u32>>,
    capacity: usize,
}

/// Fraction of `capacity` the frontier is trimmed down to on overflow.
const TRIM_RATIO: f64 = 1.0 / 6.0;

impl PriorityFrontier {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::new(),
            best_cost_for_permutation: FxHashMap::default(),
            node_permutation: FxHashMap::default(),
            capacity,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Pushes a node. Returns `false` without enqueuing if a cheaper node
    /// for the same permutation already exists.
    ///
    /// `valid_mapping`, `heur_cost`, and `valid_mapped_size` only affect
    /// ordering among entries tied on `total_cost`; the duplicate-permutation
    /// check below still compares `total_cost` alone.
    pub fn push(
        &mut self,
        node_id: u64,
        permutation: Vec<u32>,
        total_cost: f64,
        valid_mapping: bool,
        heur_cost: f64,
        valid_mapped_size: u32,
    ) -> bool {
        if let Some(&existing) = self.best_cost_for_permutation.get(&permutation) {
            if existing <= total_cost {
                return false;
            }
        }
        self.best_cost_for_permutation
            .insert(permutation.clone(), total_cost);
        self.node_permutation.insert(node_id, permutation.clone());
        self.heap.push(Entry {
            total_cost,
            valid_mapping,
            heur_cost,
            valid_mapped_size,
            qubits: permutation,
            node_id,
        });

        if self.heap.len() > self.capacity {
            self.trim();
        }
        true
    }

    /// Pops the node that ranks lowest under the ordering key.
    pub fn pop(&mut self) -> Option<u64> {
        loop {
            let entry = self.heap.pop()?;
            // Skip stale entries superseded by a cheaper push for the same
            // permutation after this entry was queued.
            if let Some(perm) = self.node_permutation.get(&entry.node_id) {
                if self.best_cost_for_permutation.get(perm) == Some(&entry.total_cost) {
                    self.best_cost_for_permutation.remove(perm);
                    self.node_permutation.remove(&entry.node_id);
                    return Some(entry.node_id);
                }
            }
        }
    }

    /// Drops all but the cheapest `capacity * TRIM_RATIO` entries.
    fn trim(&mut self) {
        let keep = ((self.capacity as f64) * TRIM_RATIO).ceil() as usize;
        let mut kept: Vec<Entry> = Vec::with_capacity(keep);
        while kept.len() < keep {
            let Some(entry) = self.heap.pop() else {
                break;
            };
            kept.push(entry);
        }
        let dropped: Vec<Entry> = self.heap.drain().collect();
        for entry in dropped {
            if let Some(perm) = self.node_permutation.remove(&entry.node_id) {
                self.best_cost_for_permutation.remove(&perm);
            }
        }
        self.heap = BinaryHeap::from(kept);
    }
}
