//! Grouping a stream of gates into layers that can be routed together.
//!
//! The router operates on logical qubit operations rather than IR
//! instructions directly — callers convert a circuit's gate stream into
//! [`LayerOp`]s in program order before handing it to a [`Layerer`].

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// A logical two-qubit gate, identified only by the pair of logical qubits
/// it acts on (the routing search doesn't care which gate it is, only that
/// it needs its operands adjacent).
pub type GateRef = (u32, u32);

/// One gate from the input circuit's program order, reduced to what the
/// layerer needs: which qubits it touches, and — for two-qubit gates —
/// whether its control/target order matches the pair's canonical `q1 < q2`
/// orientation (`forward`) or not (`reverse`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerOp {
    /// A single-qubit gate on the given logical qubit.
    Single(u32),
    /// A two-qubit gate with the given control and target, in program
    /// order. `forward` is derived automatically against `min(control,
    /// target)`.
    Two(u32, u32),
}

/// How eagerly successive gates are grouped into the same layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayeringPolicy {
    /// One gate per layer — maximally conservative, gives the router the
    /// most information per decision at the cost of more search calls.
    IndividualGates,
    /// Gates join a layer as long as they don't share a logical qubit with
    /// anything already in it ("push gates left").
    DisjointQubits,
    /// Like `DisjointQubits`, but repeated two-qubit gates on the same
    /// unordered pair stay in the same layer, and single-qubit gates attach
    /// to the last layer that already touches their qubit rather than
    /// opening a new one.
    Disjoint2qBlocks,
    /// Groups gates so each layer ends up with an odd number of entries,
    /// which in practice spreads SWAP insertion points more evenly across
    /// alternating layers.
    OddGates,
    /// Greedily grows a layer by accepting gates connected to qubits
    /// already present, forming a "triangle" of related interactions, and
    /// opens a new layer once the layer's qubit support would exceed 3
    /// distinct qubits.
    QubitTriangle,
}

/// A set of gates the router will try to make jointly executable via one
/// batch of SWAP insertions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Two-qubit gates in this layer, each as `(control, target)` in its
    /// original occurrence direction (not canonicalized) so per-occurrence
    /// direction survives a later [`Layer::split`].
    pub gates: Vec<GateRef>,
    /// Original instruction-stream position of each entry in `gates`, same
    /// length and order — lets a caller replay this layer's gates against
    /// the original gate stream by identity rather than by count.
    pub two_qubit_indices: Vec<usize>,
    /// Per-logical-qubit count of single-qubit gates in this layer.
    pub single_qubit_mult: FxHashMap<u32, u32>,
    /// Per-logical-qubit original instruction-stream positions of this
    /// layer's single-qubit gates, in occurrence order; `.len()` of each
    /// entry always matches the corresponding `single_qubit_mult` count.
    pub single_qubit_indices: FxHashMap<u32, Vec<usize>>,
    /// Per-unordered-pair `(forward_count, reverse_count)`: how many of the
    /// pair's two-qubit gates in this layer had control/target matching
    /// the pair's `q1 < q2` orientation versus the opposite.
    pub two_qubit_mult: FxHashMap<(u32, u32), (u32, u32)>,
}

impl Layer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a layer from bare gate pairs with no original stream position
    /// tracked (each entry is assigned its position in `gates` as a stand-in
    /// index); used by tests and by [`Layerer::build`]'s non-indexed path.
    #[must_use]
    pub fn from_gates(gates: Vec<GateRef>) -> Self {
        let indexed = gates.into_iter().enumerate().map(|(i, g)| (g, i)).collect();
        Self::from_indexed_gates(indexed)
    }

    #[must_use]
    pub fn from_indexed_gates(gates: Vec<(GateRef, usize)>) -> Self {
        let mut layer = Self::new();
        for ((a, b), index) in gates {
            layer.record_two_qubit(a, b, index);
        }
        layer
    }

    fn record_two_qubit(&mut self, control: u32, target: u32, index: usize) {
        let pair = if control <= target {
            (control, target)
        } else {
            (target, control)
        };
        // `gates` keeps the occurrence's actual control/target order (not
        // the canonical pair) so a later `split` can recover which
        // direction — forward or reverse — each occurrence was, which
        // `two_qubit_mult` only tracks in aggregate.
        self.gates.push((control, target));
        self.two_qubit_indices.push(index);
        let entry = self.two_qubit_mult.entry(pair).or_insert((0, 0));
        if control <= target {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }

    fn record_single_qubit(&mut self, qubit: u32, index: usize) {
        *self.single_qubit_mult.entry(qubit).or_insert(0) += 1;
        self.single_qubit_indices.entry(qubit).or_default().push(index);
    }

    /// Every qubit this layer's two-qubit gates touch.
    #[must_use]
    pub fn qubits(&self) -> FxHashSet<u32> {
        self.gates.iter().flat_map(|&(a, b)| [a, b]).collect()
    }

    /// Every qubit touched by any gate — two-qubit or single-qubit — in
    /// this layer.
    #[must_use]
    pub fn active_qubits(&self) -> FxHashSet<u32> {
        let mut qubits = self.qubits();
        qubits.extend(self.single_qubit_mult.keys().copied());
        qubits
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty() && self.single_qubit_mult.is_empty()
    }

    fn shares_qubit_with(&self, gate: GateRef) -> bool {
        let qubits = self.qubits();
        qubits.contains(&gate.0) || qubits.contains(&gate.1)
    }

    fn touches_qubit_in(&self, gate: GateRef) -> bool {
        self.shares_qubit_with(gate)
    }

    /// A layer is splittable iff it has more than one two-qubit pair, more
    /// than two qubits carrying single-qubit gates, or a single-qubit-gate
    /// qubit not covered by any two-qubit gate in the layer.
    #[must_use]
    pub fn is_splittable(&self) -> bool {
        if self.two_qubit_mult.len() > 1 {
            return true;
        }
        if self.single_qubit_mult.len() > 2 {
            return true;
        }
        let two_qubit_qubits = self.qubits();
        self.single_qubit_mult
            .keys()
            .any(|q| !two_qubit_qubits.contains(q))
    }

    /// Splits a splittable layer into two child layers: two-qubit pairs
    /// alternate between the two children, assigned in the deterministic
    /// order each pair first appeared in the original gate stream (not
    /// `two_qubit_mult`'s hash-iteration order, which would make the split
    /// depend on hash state rather than program order); a single-qubit gate
    /// attaches to whichever child's two-qubit gate set covers that qubit,
    /// or alternates if neither (or both) does. Every occurrence keeps the
    /// original stream index it carried in `self`.
    #[must_use]
    pub fn split(&self) -> (Layer, Layer) {
        let mut a = Layer::new();
        let mut b = Layer::new();

        let mut pair_order: Vec<(u32, u32)> = Vec::new();
        let mut seen: FxHashSet<(u32, u32)> = FxHashSet::default();
        for &(q0, q1) in &self.gates {
            let pair = Self::unordered_pair((q0, q1));
            if seen.insert(pair) {
                pair_order.push(pair);
            }
        }
        let assign_to_a: FxHashMap<(u32, u32), bool> = pair_order
            .iter()
            .enumerate()
            .map(|(i, &pair)| (pair, i % 2 == 0))
            .collect();

        for (i, &(control, target)) in self.gates.iter().enumerate() {
            let pair = Self::unordered_pair((control, target));
            let index = self.two_qubit_indices[i];
            let dest = if assign_to_a[&pair] { &mut a } else { &mut b };
            dest.record_two_qubit(control, target, index);
        }

        let mut alternate_next_to_a = true;
        for (&qubit, indices) in &self.single_qubit_indices {
            let in_a = a.qubits().contains(&qubit);
            let in_b = b.qubits().contains(&qubit);
            let target = match (in_a, in_b) {
                (true, false) => &mut a,
                (false, true) => &mut b,
                _ => {
                    alternate_next_to_a = !alternate_next_to_a;
                    if alternate_next_to_a { &mut a } else { &mut b }
                }
            };
            for &index in indices {
                target.record_single_qubit(qubit, index);
            }
        }

        (a, b)
    }

    fn unordered_pair(gate: GateRef) -> (u32, u32) {
        if gate.0 <= gate.1 {
            gate
        } else {
            (gate.1, gate.0)
        }
    }
}

/// Builds layers from a program-order stream of gates according to a
/// [`LayeringPolicy`], automatically splitting any layer that would
/// otherwise exceed `max_layer_size`.
#[derive(Debug, Clone)]
pub struct Layerer {
    policy: LayeringPolicy,
    max_layer_size: Option<usize>,
}

impl Layerer {
    #[must_use]
    pub fn new(policy: LayeringPolicy, max_layer_size: Option<usize>) -> Self {
        Self {
            policy,
            max_layer_size,
        }
    }

    /// Layers a bare stream of two-qubit logical pairs, with no
    /// single-qubit multiplicities recorded. Each gate is assigned its
    /// position in `gates` as its original-stream index.
    #[must_use]
    pub fn build(&self, gates: &[GateRef]) -> Vec<Layer> {
        let ops: Vec<LayerOp> = gates.iter().map(|&(a, b)| LayerOp::Two(a, b)).collect();
        self.build_from_ops(&ops)
    }

    /// Layers a full program-order op stream, tracking single-qubit
    /// multiplicities and two-qubit direction counts per layer. Each op is
    /// assigned its position in `ops` as its original-stream index.
    #[must_use]
    pub fn build_from_ops(&self, ops: &[LayerOp]) -> Vec<Layer> {
        let indexed: Vec<(LayerOp, usize)> = ops.iter().copied().zip(0..).collect();
        self.build_from_indexed_ops(&indexed)
    }

    /// Layers a program-order op stream where each op already carries the
    /// index identifying it in some larger original instruction stream
    /// (e.g. a position among *all* of a circuit's instructions, not just
    /// its gates). This is what a caller that needs to replay routed layers
    /// back against the original instructions should use — replaying by an
    /// op's carried identity is correct regardless of how a layer was later
    /// split, or how a `Disjoint2qBlocks` single-qubit gate got attached to
    /// an earlier layer than its stream position would suggest.
    #[must_use]
    pub fn build_from_indexed_ops(&self, ops: &[(LayerOp, usize)]) -> Vec<Layer> {
        let mut layers: Vec<Layer> = Vec::new();
        let mut current = Layer::new();
        // Tracks, per qubit, the index of the last layer that touched it —
        // used by `DisjointQubits`/`Disjoint2qBlocks` to decide placement
        // independent of whether `current` already closed.
        let mut last_layer_for_qubit: FxHashMap<u32, usize> = FxHashMap::default();

        macro_rules! close_current {
            () => {
                if !current.is_empty() {
                    layers.push(std::mem::take(&mut current));
                }
            };
        }

        for &(op, stream_index) in ops {
            match op {
                LayerOp::Single(q) => {
                    match self.policy {
                        LayeringPolicy::Disjoint2qBlocks => {
                            // Attach to the layer that last touched q, if any.
                            if let Some(&idx) = last_layer_for_qubit.get(&q) {
                                if idx == layers.len() {
                                    current.record_single_qubit(q, stream_index);
                                } else {
                                    layers[idx].record_single_qubit(q, stream_index);
                                }
                            } else {
                                current.record_single_qubit(q, stream_index);
                            }
                        }
                        _ => current.record_single_qubit(q, stream_index),
                    }
                }
                LayerOp::Two(control, target) => {
                    let gate: GateRef = (control, target);
                    let fits_size = self.max_layer_size.is_none_or(|max| current.len() < max);

                    let accepts = fits_size
                        && match self.policy {
                            LayeringPolicy::IndividualGates => current.is_empty(),
                            LayeringPolicy::DisjointQubits => {
                                current.is_empty() || !current.shares_qubit_with(gate)
                            }
                            LayeringPolicy::Disjoint2qBlocks => {
                                current.is_empty()
                                    || !current.shares_qubit_with(gate)
                                    || current.two_qubit_mult.contains_key(&Self::unordered(gate))
                            }
                            LayeringPolicy::OddGates => {
                                current.is_empty()
                                    || (!current.shares_qubit_with(gate) && current.len() % 2 == 1)
                            }
                            LayeringPolicy::QubitTriangle => {
                                current.is_empty() || current.touches_qubit_in(gate)
                            }
                        };

                    if !accepts {
                        close_current!();
                    }
                    current.record_two_qubit(control, target, stream_index);
                    last_layer_for_qubit.insert(control, layers.len());
                    last_layer_for_qubit.insert(target, layers.len());
                }
            }
        }
        close_current!();

        self.split_oversized(layers)
    }

    fn unordered(gate: GateRef) -> (u32, u32) {
        if gate.0 <= gate.1 {
            gate
        } else {
            (gate.1, gate.0)
        }
    }

    /// Enforces `max_layer_size` even for the initial accumulation (e.g. a
    /// `QubitTriangle` layer that grew unbounded before hitting a
    /// disconnected gate), splitting any layer over the limit into
    /// fixed-size chunks. Chunking walks `gates`/`two_qubit_indices`
    /// together so each chunk keeps the original stream index of the
    /// occurrences it inherits.
    fn split_oversized(&self, layers: Vec<Layer>) -> Vec<Layer> {
        let Some(max) = self.max_layer_size else {
            return layers;
        };
        let mut out = Vec::with_capacity(layers.len());
        for layer in layers {
            if layer.len() <= max {
                out.push(layer);
                continue;
            }
            let indexed_gates: Vec<(GateRef, usize)> = layer
                .gates
                .iter()
                .copied()
                .zip(layer.two_qubit_indices.iter().copied())
                .collect();
            for chunk in indexed_gates.chunks(max) {
                out.push(Layer::from_indexed_gates(chunk.to_vec()));
            }
        }
        out
    }
}
