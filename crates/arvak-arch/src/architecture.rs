//! Directed coupling graph with distance and fidelity-aware cost tables.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::instrument;

use crate::error::{ArchError, ArchResult};
use crate::properties::Properties;

/// Cost, in arbitrary fidelity-proportional units, of a single-qubit gate.
pub const COST_SINGLE_QUBIT_GATE: u32 = 1;
/// Cost of a native two-qubit (CX) gate in its allowed direction.
pub const COST_CNOT_GATE: u32 = 10;
/// Cost of a SWAP realized on a bidirectional edge (3 CX in either order).
pub const COST_BIDIRECTIONAL_SWAP: u32 = 30;
/// Cost of a SWAP realized on a unidirectional edge (extra H-wraps required).
pub const COST_UNIDIRECTIONAL_SWAP: u32 = 34;
/// Cost of reversing a CX's direction via H-wraps on both qubits.
pub const COST_DIRECTION_REVERSE: u32 = 4;

/// A hardware coupling graph: which physical qubits can interact, in which
/// native direction, plus the distance and cost tables derived from it.
///
/// Edges are stored both as given (directed, native gate direction) and as
/// an undirected adjacency used for connectivity and shortest-path queries.
/// Distances and predecessor tables are precomputed via BFS at construction
/// time so routing queries are O(1) lookups.
#[derive(Debug, Clone)]
pub struct Architecture {
    num_qubits: u32,
    directed_edges: FxHashSet<(u32, u32)>,
    adjacency: FxHashMap<u32, Vec<u32>>,
    dist_matrix: Vec<Vec<u32>>,
    pred_matrix: Vec<Vec<Option<u32>>>,
    /// `edge_skip_distance[k][u][v]`: cost of moving between `u` and `v`
    /// when up to `k` edges along the cheapest path are free. Index `0` is
    /// the ordinary (reversal-aware) distance table; built iteratively to a
    /// fixed point (see [`Architecture::precompute_edge_skip_distances`]).
    edge_skip_distance: Vec<Vec<Vec<u32>>>,
    /// `-log2(fidelity)` shortest-path cost per ordered qubit pair, present
    /// iff calibration data with every coupled edge's two-qubit error rate
    /// was loaded.
    fidelity_dist_matrix: Option<Vec<Vec<f64>>>,
    properties: Option<Properties>,
}

impl Architecture {
    /// Builds an architecture from `num_qubits` physical qubits and a list
    /// of directed edges `(control, target)` giving the native CX direction.
    /// An edge present in only one direction is unidirectional; present in
    /// both directions (or doubled by the caller) it's bidirectional.
    #[must_use]
    #[instrument(skip(edges))]
    pub fn new(num_qubits: u32, edges: Vec<(u32, u32)>) -> Self {
        let mut directed_edges = FxHashSet::default();
        let mut adjacency: FxHashMap<u32, Vec<u32>> = FxHashMap::default();

        for (a, b) in edges {
            directed_edges.insert((a, b));
            adjacency.entry(a).or_default().push(b);
            adjacency.entry(b).or_default().push(a);
        }
        for neighbors in adjacency.values_mut() {
            neighbors.sort_unstable();
            neighbors.dedup();
        }

        let mut arch = Self {
            num_qubits,
            directed_edges,
            adjacency,
            dist_matrix: Vec::new(),
            pred_matrix: Vec::new(),
            edge_skip_distance: Vec::new(),
            fidelity_dist_matrix: None,
            properties: None,
        };
        arch.precompute_distances();
        arch.precompute_edge_skip_distances();
        arch
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.load_properties(properties);
        self
    }

    /// Loads calibration data, populating fidelity cost tables. If any
    /// coupled edge is missing a two-qubit error rate, fidelity features
    /// are disabled globally (the architecture behaves as if no properties
    /// were loaded for any fidelity-aware query) rather than erroring.
    pub fn load_properties(&mut self, properties: Properties) {
        let complete = self
            .directed_edges
            .iter()
            .all(|&(a, b)| properties.two_qubit_fidelity(a, b).is_ok());
        self.properties = Some(properties);
        self.fidelity_dist_matrix = complete
            .then(|| self.compute_fidelity_distances())
            .flatten();
    }

    /// `true` iff every coupled edge supports CX in both directions, or the
    /// graph has no edges (vacuously both bidirectional and unidirectional).
    #[must_use]
    pub fn bidirectional(&self) -> bool {
        self.directed_edges
            .iter()
            .all(|&(a, b)| self.directed_edges.contains(&(b, a)))
    }

    /// `true` iff no coupled edge supports CX in both directions, or the
    /// graph has no edges.
    #[must_use]
    pub fn unidirectional(&self) -> bool {
        self.directed_edges
            .iter()
            .all(|&(a, b)| !self.directed_edges.contains(&(b, a)))
    }

    #[must_use]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    #[must_use]
    pub fn properties(&self) -> Option<&Properties> {
        self.properties.as_ref()
    }

    /// Parses the plain-text coupling-map format: first line is the number
    /// of physical qubits, each subsequent line is a directed edge `u v`
    /// (native CX direction control `u`, target `v`).
    pub fn load_coupling_from_text(text: &str) -> ArchResult<Self> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let n_p: u32 = lines
            .next()
            .ok_or_else(|| ArchError::FormatError("empty coupling-map text".into()))?
            .parse()
            .map_err(|_| ArchError::FormatError("first line must be qubit count".into()))?;

        let mut edges = Vec::new();
        for (i, line) in lines.enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 2 {
                return Err(ArchError::FormatError(format!(
                    "edge line {}: expected 'u v', found '{line}'",
                    i + 2
                )));
            }
            let u: u32 = fields[0]
                .parse()
                .map_err(|_| ArchError::FormatError(format!("edge line {}: bad qubit", i + 2)))?;
            let v: u32 = fields[1]
                .parse()
                .map_err(|_| ArchError::FormatError(format!("edge line {}: bad qubit", i + 2)))?;
            if u >= n_p || v >= n_p {
                return Err(ArchError::OutOfRange {
                    index: u.max(v),
                    size: n_p,
                });
            }
            edges.push((u, v));
        }

        Ok(Self::new(n_p, edges))
    }

    fn precompute_distances(&mut self) {
        let n = self.num_qubits as usize;
        self.dist_matrix = vec![vec![u32::MAX; n]; n];
        self.pred_matrix = vec![vec![None; n]; n];

        for source in 0..self.num_qubits {
            let mut visited = vec![false; n];
            let mut queue = VecDeque::new();
            visited[source as usize] = true;
            self.dist_matrix[source as usize][source as usize] = 0;
            queue.push_back(source);

            while let Some(u) = queue.pop_front() {
                let Some(neighbors) = self.adjacency.get(&u) else {
                    continue;
                };
                for &v in neighbors {
                    if !visited[v as usize] {
                        visited[v as usize] = true;
                        self.dist_matrix[source as usize][v as usize] =
                            self.dist_matrix[source as usize][u as usize] + 1;
                        self.pred_matrix[source as usize][v as usize] = Some(u);
                        queue.push_back(v);
                    }
                }
            }
        }
    }

    /// Rebuilds derived tables after deserialization or mutation of edges.
    pub fn rebuild_caches(&mut self) {
        self.precompute_distances();
        self.precompute_edge_skip_distances();
        if let Some(props) = self.properties.clone() {
            self.load_properties(props);
        }
    }

    /// Builds the `k`-free-edge distance tables to a fixed point: for each
    /// `k`, the cost of `(u, v)` is the minimum over every edge `(a, b)`
    /// of `dist(u, a) + dist(b, v)` (plus a reversal-cost term if `(a, b)`
    /// is traversed against its native direction), i.e. one edge along the
    /// path is free. Iterating lets up to `k` edges be free; iteration
    /// stops once a layer introduces no further improvement.
    fn precompute_edge_skip_distances(&mut self) {
        let n = self.num_qubits as usize;
        self.edge_skip_distance = vec![self.dist_matrix_with_reversals()];

        loop {
            let prev = self.edge_skip_distance.last().unwrap().clone();
            let mut next = prev.clone();
            let mut improved = false;

            for u in 0..n {
                for v in 0..n {
                    if u == v {
                        continue;
                    }
                    let mut best = prev[u][v];
                    for &(a, b) in &self.directed_edges {
                        let (a, b) = (a as usize, b as usize);
                        if prev[u][a] == u32::MAX || prev[b][v] == u32::MAX {
                            continue;
                        }
                        let candidate = prev[u][a] + prev[b][v];
                        if candidate < best {
                            best = candidate;
                        }
                    }
                    if best < next[u][v] {
                        next[u][v] = best;
                        improved = true;
                    }
                }
            }

            if !improved {
                break;
            }
            self.edge_skip_distance.push(next);
            // Safety bound: no more than n layers can ever improve further.
            if self.edge_skip_distance.len() > n + 1 {
                break;
            }
        }
    }

    /// Distance table charging [`COST_CNOT_GATE`] per hop plus
    /// [`COST_DIRECTION_REVERSE`] for the final edge when its native
    /// direction disagrees with the direction traveled.
    fn dist_matrix_with_reversals(&self) -> Vec<Vec<u32>> {
        let n = self.num_qubits as usize;
        let mut table = vec![vec![u32::MAX; n]; n];
        for u in 0..self.num_qubits {
            for v in 0..self.num_qubits {
                table[u as usize][v as usize] =
                    self.distance_with_reversals(u, v).unwrap_or(u32::MAX);
            }
        }
        table
    }

    /// Dijkstra over `-log2(fidelity)` edge weights, producing a full
    /// pairwise fidelity-cost table, or `None` if any edge lacks a weight.
    fn compute_fidelity_distances(&self) -> Option<Vec<Vec<f64>>> {
        let n = self.num_qubits as usize;
        let mut table = vec![vec![f64::INFINITY; n]; n];

        for source in 0..self.num_qubits {
            table[source as usize][source as usize] = 0.0;
            let mut visited = vec![false; n];
            loop {
                let Some(u) = (0..n)
                    .filter(|&i| !visited[i])
                    .min_by(|&a, &b| {
                        table[source as usize][a]
                            .partial_cmp(&table[source as usize][b])
                            .unwrap()
                    })
                else {
                    break;
                };
                if table[source as usize][u].is_infinite() {
                    break;
                }
                visited[u] = true;
                for &v in self.neighbors(u as u32) {
                    let weight = self.fidelity_swap_cost(u as u32, v).ok()?;
                    let candidate = table[source as usize][u] + weight;
                    if candidate < table[source as usize][v as usize] {
                        table[source as usize][v as usize] = candidate;
                    }
                }
            }
        }
        Some(table)
    }

    /// Cost when up to `skip_edges` edges along the cheapest `(u, v)` path
    /// are free, used to bound admissible heuristics over multiple qubit
    /// pairs that may share SWAPs. Out-of-range `skip_edges` (beyond the
    /// fixed point reached during precomputation) returns `0.0`.
    #[must_use]
    pub fn edge_skip_distance(&self, u: u32, v: u32, skip_edges: usize) -> f64 {
        self.edge_skip_distance
            .get(skip_edges)
            .and_then(|table| table.get(u as usize)?.get(v as usize))
            .map(|&d| if d == u32::MAX { 0.0 } else { f64::from(d) })
            .unwrap_or(0.0)
    }

    /// Fidelity-weighted analogue of [`Architecture::edge_skip_distance`]:
    /// the cost of connecting `u` and `v` when calibration data is loaded.
    /// Returns `0.0` if no fidelity table is available or `skip_edges` is
    /// out of range, matching [`Architecture::edge_skip_distance`].
    #[must_use]
    pub fn fidelity_distance(&self, u: u32, v: u32, skip_edges: usize) -> f64 {
        let Some(table) = &self.fidelity_dist_matrix else {
            return 0.0;
        };
        if skip_edges > self.edge_skip_distance.len().saturating_sub(1) {
            return 0.0;
        }
        table
            .get(u as usize)
            .and_then(|row| row.get(v as usize))
            .copied()
            .filter(|d| d.is_finite())
            .unwrap_or(0.0)
    }

    #[must_use]
    pub fn neighbors(&self, qubit: u32) -> &[u32] {
        self.adjacency.get(&qubit).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_connected(&self, a: u32, b: u32) -> bool {
        self.adjacency.get(&a).is_some_and(|n| n.contains(&b))
    }

    /// Whether `(control, target)` is a native CX direction on this device.
    #[must_use]
    pub fn is_native_direction(&self, control: u32, target: u32) -> bool {
        self.directed_edges.contains(&(control, target))
    }

    /// Whether the edge between `a` and `b` supports CX in both directions.
    #[must_use]
    pub fn is_bidirectional(&self, a: u32, b: u32) -> bool {
        self.directed_edges.contains(&(a, b)) && self.directed_edges.contains(&(b, a))
    }

    /// Hop-count distance between two physical qubits, or `None` if
    /// disconnected.
    #[must_use]
    pub fn distance(&self, a: u32, b: u32) -> Option<u32> {
        let d = *self.dist_matrix.get(a as usize)?.get(b as usize)?;
        (d != u32::MAX).then_some(d)
    }

    /// CX-weighted distance, optionally charging [`COST_DIRECTION_REVERSE`]
    /// on the path's final edge when its native direction disagrees with
    /// the direction of travel. Mirrors
    /// [`Architecture::distance_with_reversals`] when `include_reversal_cost`
    /// is `true`, and a flat [`COST_CNOT_GATE`]-per-hop count otherwise.
    #[must_use]
    pub fn distance_weighted(&self, a: u32, b: u32, include_reversal_cost: bool) -> Option<u32> {
        if include_reversal_cost {
            self.distance_with_reversals(a, b)
        } else {
            self.distance(a, b).map(|d| d * COST_CNOT_GATE)
        }
    }

    /// Cost-weighted distance that additionally accounts for direction
    /// reversal: if `a`'s adjacent edge toward `b` only supports CX in the
    /// opposite direction, [`COST_DIRECTION_REVERSE`] is added once.
    #[must_use]
    pub fn distance_with_reversals(&self, a: u32, b: u32) -> Option<u32> {
        let path = self.shortest_path(a, b)?;
        let mut cost = 0u32;
        for window in path.windows(2) {
            let (u, v) = (window[0], window[1]);
            cost += COST_CNOT_GATE;
            if !self.is_native_direction(u, v) {
                cost += COST_DIRECTION_REVERSE;
            }
        }
        Some(cost)
    }

    /// Reconstructs the shortest path between `a` and `b` using the
    /// precomputed predecessor table.
    #[must_use]
    pub fn shortest_path(&self, a: u32, b: u32) -> Option<Vec<u32>> {
        if a == b {
            return Some(vec![a]);
        }
        self.distance(a, b)?;
        let mut path = vec![b];
        let mut current = b;
        while current != a {
            current = self.pred_matrix[a as usize][current as usize]?;
            path.push(current);
        }
        path.reverse();
        Some(path)
    }

    /// Fidelity-weighted cost of swapping two adjacent physical qubits, or
    /// `None` if they aren't adjacent. Falls back to flat cost constants
    /// when no calibration data is loaded.
    #[must_use]
    pub fn swap_cost(&self, a: u32, b: u32) -> Option<u32> {
        if !self.is_connected(a, b) {
            return None;
        }
        Some(if self.is_bidirectional(a, b) {
            COST_BIDIRECTIONAL_SWAP
        } else {
            COST_UNIDIRECTIONAL_SWAP
        })
    }

    /// `-log2(fidelity)` cost of a SWAP on edge `(a, b)`, using calibration
    /// data when present.
    pub fn fidelity_swap_cost(&self, a: u32, b: u32) -> ArchResult<f64> {
        let props = self
            .properties
            .as_ref()
            .ok_or_else(|| ArchError::NoFidelityData(format!("edge ({a}, {b})")))?;
        let f = props.two_qubit_fidelity(a, b)?;
        // A SWAP costs three two-qubit gates.
        Ok(-3.0 * f.log2())
    }

    /// Minimum number of adjacent-swaps needed to realize permutation `perm`
    /// (an array where `perm[i]` is the physical qubit currently holding
    /// logical qubit `i`'s value, mapped against the identity), explored via
    /// BFS over the swap graph bounded by `limit` swaps. Returns `None` if
    /// no solution is found within `limit`.
    #[must_use]
    pub fn minimum_number_of_swaps(&self, perm: &[u32], limit: Option<u32>) -> Option<u32> {
        if perm.iter().enumerate().all(|(i, &p)| i as u32 == p) {
            return Some(0);
        }

        let limit = limit.unwrap_or(u32::MAX);
        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::new();
        visited.insert(perm.to_vec());
        queue.push_back((perm.to_vec(), 0u32));

        while let Some((state, depth)) = queue.pop_front() {
            if depth >= limit {
                continue;
            }
            for i in 0..state.len() as u32 {
                for &j in self.neighbors(i) {
                    if j <= i {
                        continue;
                    }
                    let mut next = state.clone();
                    next.swap(i as usize, j as usize);
                    if next.iter().enumerate().all(|(k, &p)| k as u32 == p) {
                        return Some(depth + 1);
                    }
                    if visited.insert(next.clone()) {
                        queue.push_back((next, depth + 1));
                    }
                }
            }
        }
        None
    }

    /// Restricts the architecture to the induced subgraph over `subset`,
    /// keeping original physical-qubit labels (qubits outside `subset` have
    /// no edges).
    #[must_use]
    pub fn reduced_coupling_map(&self, subset: &[u32]) -> Self {
        let allowed: FxHashSet<u32> = subset.iter().copied().collect();
        let edges: Vec<(u32, u32)> = self
            .directed_edges
            .iter()
            .filter(|(a, b)| allowed.contains(a) && allowed.contains(b))
            .copied()
            .collect();
        let mut reduced = Self::new(self.num_qubits, edges);
        reduced.properties = self.properties.clone();
        reduced
    }

    /// Enumerates all connected vertex subsets of exactly `size` physical
    /// qubits via DFS expansion from every vertex, deduplicated.
    #[must_use]
    pub fn connected_subsets(&self, size: u32) -> Vec<Vec<u32>> {
        let size = size as usize;
        let mut results = FxHashSet::default();

        if size == 0 || size as u32 > self.num_qubits {
            return Vec::new();
        }

        for start in 0..self.num_qubits {
            let mut current = vec![start];
            let mut frontier: FxHashSet<u32> = self.neighbors(start).iter().copied().collect();
            self.expand_subset(&mut current, &mut frontier, size, &mut results);
        }

        let mut out: Vec<Vec<u32>> = results.into_iter().collect();
        out.sort();
        out
    }

    fn expand_subset(
        &self,
        current: &mut Vec<u32>,
        frontier: &mut FxHashSet<u32>,
        size: usize,
        results: &mut FxHashSet<Vec<u32>>,
    ) {
        if current.len() == size {
            let mut key = current.clone();
            key.sort_unstable();
            results.insert(key);
            return;
        }
        let candidates: Vec<u32> = frontier.iter().copied().collect();
        for v in candidates {
            if current.contains(&v) {
                continue;
            }
            current.push(v);
            let mut next_frontier = frontier.clone();
            next_frontier.remove(&v);
            for &n in self.neighbors(v) {
                if !current.contains(&n) {
                    next_frontier.insert(n);
                }
            }
            self.expand_subset(current, &mut next_frontier, size, results);
            current.pop();
        }
    }

    /// Among all connected subsets of `size` physical qubits, returns the
    /// one maximizing average qubit and edge fidelity. Requires calibration
    /// data.
    pub fn highest_fidelity_submap(&self, size: u32) -> ArchResult<Option<Vec<u32>>> {
        let props = self
            .properties
            .as_ref()
            .ok_or_else(|| ArchError::NoFidelityData("submap selection".into()))?;

        let mut best: Option<(Vec<u32>, f64)> = None;
        for subset in self.connected_subsets(size) {
            let mut score = 0.0;
            let mut count = 0u32;
            for &q in &subset {
                if let Ok(f) = props.single_qubit_fidelity(q) {
                    score += f;
                    count += 1;
                }
            }
            for &a in &subset {
                for &b in &subset {
                    if a < b && self.is_connected(a, b) {
                        if let Ok(f) = props.two_qubit_fidelity(a, b) {
                            score += f;
                            count += 1;
                        }
                    }
                }
            }
            if count == 0 {
                continue;
            }
            let avg = score / f64::from(count);
            if best.as_ref().is_none_or(|(_, b)| avg > *b) {
                best = Some((subset, avg));
            }
        }
        Ok(best.map(|(s, _)| s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(n: u32) -> Architecture {
        let edges = (0..n - 1).map(|i| (i, i + 1)).collect();
        Architecture::new(n, edges)
    }

    #[test]
    fn distances_on_linear_chain() {
        let arch = linear(5);
        assert_eq!(arch.distance(0, 4), Some(4));
        assert_eq!(arch.shortest_path(0, 4), Some(vec![0, 1, 2, 3, 4]));
    }

    #[test]
    fn disconnected_qubits_have_no_distance() {
        let arch = Architecture::new(4, vec![(0, 1)]);
        assert_eq!(arch.distance(0, 3), None);
    }

    #[test]
    fn unidirectional_edges_cost_more_to_reverse() {
        let arch = Architecture::new(2, vec![(0, 1)]);
        assert!(!arch.is_bidirectional(0, 1));
        assert_eq!(
            arch.distance_with_reversals(1, 0),
            Some(COST_CNOT_GATE + COST_DIRECTION_REVERSE)
        );
        assert_eq!(arch.distance_with_reversals(0, 1), Some(COST_CNOT_GATE));
    }

    #[test]
    fn load_from_text_round_trip() {
        let text = "3\n0 1\n1 2\n";
        let arch = Architecture::load_coupling_from_text(text).unwrap();
        assert_eq!(arch.num_qubits(), 3);
        assert!(arch.is_connected(0, 1));
        assert!(arch.is_connected(1, 2));
        assert!(!arch.is_connected(0, 2));
    }

    #[test]
    fn minimum_swaps_identity_is_zero() {
        let arch = linear(3);
        assert_eq!(arch.minimum_number_of_swaps(&[0, 1, 2], None), Some(0));
    }

    #[test]
    fn minimum_swaps_adjacent_transposition() {
        let arch = linear(3);
        assert_eq!(arch.minimum_number_of_swaps(&[1, 0, 2], None), Some(1));
    }

    #[test]
    fn connected_subsets_of_linear_chain() {
        let arch = linear(4);
        let subsets = arch.connected_subsets(2);
        assert!(subsets.contains(&vec![0, 1]));
        assert!(subsets.contains(&vec![1, 2]));
        assert!(subsets.contains(&vec![2, 3]));
        assert!(!subsets.contains(&vec![0, 2]));
    }

    #[test]
    fn reduced_coupling_map_drops_external_edges() {
        let arch = linear(4);
        let reduced = arch.reduced_coupling_map(&[0, 1]);
        assert!(reduced.is_connected(0, 1));
        assert!(!reduced.is_connected(1, 2));
    }

    #[test]
    fn bidirectional_flag_on_doubled_edges() {
        let arch = Architecture::new(2, vec![(0, 1), (1, 0)]);
        assert!(arch.bidirectional());
        assert!(!arch.unidirectional());
    }

    #[test]
    fn unidirectional_flag_on_single_direction_edges() {
        let arch = Architecture::new(2, vec![(0, 1)]);
        assert!(!arch.bidirectional());
        assert!(arch.unidirectional());
    }

    #[test]
    fn empty_graph_is_vacuously_both() {
        let arch = Architecture::new(3, vec![]);
        assert!(arch.bidirectional());
        assert!(arch.unidirectional());
    }

    #[test]
    fn edge_skip_distance_zero_matches_reversal_distance() {
        let arch = linear(4);
        assert_eq!(
            arch.edge_skip_distance(0, 3, 0),
            f64::from(arch.distance_with_reversals(0, 3).unwrap())
        );
    }

    #[test]
    fn edge_skip_distance_improves_with_more_free_edges() {
        let arch = linear(5);
        let d0 = arch.edge_skip_distance(0, 4, 0);
        let d1 = arch.edge_skip_distance(0, 4, 1);
        assert!(d1 <= d0);
    }

    #[test]
    fn edge_skip_distance_out_of_range_is_zero() {
        let arch = linear(3);
        assert_eq!(arch.edge_skip_distance(0, 2, 1_000), 0.0);
    }

    #[test]
    fn fidelity_distance_requires_complete_calibration() {
        use crate::properties::{EdgeCalibration, Properties, QubitCalibration};

        let mut arch = linear(3);
        assert_eq!(arch.fidelity_distance(0, 2, 0), 0.0);

        let mut props = Properties::new();
        for q in 0..3 {
            props.set_qubit(q, QubitCalibration::default());
        }
        props.set_edge(
            0,
            1,
            EdgeCalibration {
                two_qubit_error: 0.01,
                duration_ns: 100.0,
            },
        );
        // Edge (1, 2) intentionally left uncalibrated: fidelity features
        // must stay disabled globally, not just for that edge.
        arch.load_properties(props);
        assert_eq!(arch.fidelity_distance(0, 1, 0), 0.0);

        let mut props = Properties::new();
        for q in 0..3 {
            props.set_qubit(q, QubitCalibration::default());
        }
        for (a, b) in [(0, 1), (1, 2)] {
            props.set_edge(
                a,
                b,
                EdgeCalibration {
                    two_qubit_error: 0.01,
                    duration_ns: 100.0,
                },
            );
        }
        arch.load_properties(props);
        assert!(arch.fidelity_distance(0, 2, 0) > 0.0);
    }
}
