//! Initial logical→physical layout policies.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use arvak_arch::Architecture;

use crate::layer::Layer;

/// How the router picks the starting layout before routing the first
/// layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitialLayoutPolicy {
    /// Logical qubit `q` starts at physical qubit `q`.
    Identity,
    /// Scans the first layer, greedily mapping each of its two-qubit gates
    /// onto a free connected architecture edge, then fills any remaining
    /// logical qubits onto the remaining physical qubits arbitrarily.
    Static,
    /// Leaves every logical qubit unmapped; the router assigns a physical
    /// qubit the first time it appears during the search, choosing the
    /// free physical qubit nearest its already-mapped partner (or, if
    /// neither operand is mapped yet, the lowest-index free physical
    /// qubit).
    Dynamic,
}

/// A logical→physical assignment under construction; `locations[q] ==
/// u32::MAX` marks `q` unmapped (only possible with [`InitialLayoutPolicy::Dynamic`]).
pub const UNMAPPED: u32 = u32::MAX;

/// Computes the starting `(qubits, locations)` pair for `num_logical`
/// logical qubits on `arch`, given the first layer to be routed.
#[must_use]
pub fn compute(
    policy: InitialLayoutPolicy,
    arch: &Architecture,
    num_logical: u32,
    first_layer: Option<&Layer>,
) -> (Vec<u32>, Vec<u32>) {
    let n = arch.num_qubits();
    match policy {
        InitialLayoutPolicy::Identity => identity(n),
        InitialLayoutPolicy::Static => static_layout(arch, num_logical, first_layer),
        InitialLayoutPolicy::Dynamic => (
            vec![UNMAPPED; n as usize],
            vec![UNMAPPED; num_logical as usize],
        ),
    }
}

fn identity(n: u32) -> (Vec<u32>, Vec<u32>) {
    let qubits: Vec<u32> = (0..n).collect();
    let locations = qubits.clone();
    (qubits, locations)
}

fn static_layout(arch: &Architecture, num_logical: u32, first_layer: Option<&Layer>) -> (Vec<u32>, Vec<u32>) {
    let n = arch.num_qubits();
    let mut qubits = vec![UNMAPPED; n as usize];
    let mut locations = vec![UNMAPPED; num_logical as usize];
    let mut used_physical: FxHashSet<u32> = FxHashSet::default();

    if let Some(layer) = first_layer {
        for &(l0, l1) in &layer.gates {
            if locations[l0 as usize] != UNMAPPED || locations[l1 as usize] != UNMAPPED {
                continue;
            }
            let Some((p0, p1)) = find_free_edge(arch, &used_physical) else {
                continue;
            };
            place(&mut qubits, &mut locations, &mut used_physical, l0, p0);
            place(&mut qubits, &mut locations, &mut used_physical, l1, p1);
        }
    }

    let mut next_physical = 0u32;
    for logical in 0..num_logical {
        if locations[logical as usize] != UNMAPPED {
            continue;
        }
        while used_physical.contains(&next_physical) {
            next_physical += 1;
        }
        place(&mut qubits, &mut locations, &mut used_physical, logical, next_physical);
    }

    (qubits, locations)
}

fn find_free_edge(arch: &Architecture, used: &FxHashSet<u32>) -> Option<(u32, u32)> {
    for p0 in 0..arch.num_qubits() {
        if used.contains(&p0) {
            continue;
        }
        for &p1 in arch.neighbors(p0) {
            if p1 > p0 && !used.contains(&p1) {
                return Some((p0, p1));
            }
        }
    }
    None
}

fn place(
    qubits: &mut [u32],
    locations: &mut [u32],
    used: &mut FxHashSet<u32>,
    logical: u32,
    physical: u32,
) {
    qubits[physical as usize] = logical;
    locations[logical as usize] = physical;
    used.insert(physical);
}

/// Dynamically maps an unmapped logical qubit `q` onto the free physical
/// qubit nearest `partner`'s physical location (or the lowest-index free
/// physical qubit, if `partner` is also unmapped).
pub fn map_on_demand(
    arch: &Architecture,
    qubits: &mut [u32],
    locations: &mut [u32],
    logical: u32,
    partner: Option<u32>,
) {
    if locations[logical as usize] != UNMAPPED {
        return;
    }
    let free: Vec<u32> = (0..arch.num_qubits())
        .filter(|&p| qubits[p as usize] == UNMAPPED)
        .collect();
    if free.is_empty() {
        return;
    }

    let chosen = match partner.map(|p| locations[p as usize]) {
        Some(anchor) if anchor != UNMAPPED => *free
            .iter()
            .min_by_key(|&&p| arch.distance(anchor, p).unwrap_or(u32::MAX))
            .unwrap(),
        _ => free[0],
    };

    qubits[chosen as usize] = logical;
    locations[logical as usize] = chosen;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(n: u32) -> Architecture {
        Architecture::new(n, (0..n - 1).map(|i| (i, i + 1)).collect())
    }

    #[test]
    fn identity_maps_logical_to_same_physical_index() {
        let arch = linear(4);
        let (qubits, locations) = compute(InitialLayoutPolicy::Identity, &arch, 4, None);
        assert_eq!(qubits, vec![0, 1, 2, 3]);
        assert_eq!(locations, vec![0, 1, 2, 3]);
    }

    #[test]
    fn dynamic_starts_fully_unmapped() {
        let arch = linear(4);
        let (qubits, locations) = compute(InitialLayoutPolicy::Dynamic, &arch, 4, None);
        assert!(qubits.iter().all(|&q| q == UNMAPPED));
        assert!(locations.iter().all(|&p| p == UNMAPPED));
    }

    #[test]
    fn static_layout_places_first_layer_gate_on_an_edge() {
        let arch = linear(4);
        let layer = Layer::from_gates(vec![(0, 1)]);
        let (qubits, locations) =
            compute(InitialLayoutPolicy::Static, &arch, 4, Some(&layer));
        let p0 = locations[0];
        let p1 = locations[1];
        assert!(arch.is_connected(p0, p1));
        assert_eq!(qubits[p0 as usize], 0);
        assert_eq!(qubits[p1 as usize], 1);
    }

    #[test]
    fn map_on_demand_picks_nearest_free_qubit() {
        let arch = linear(5);
        let mut qubits = vec![UNMAPPED; 5];
        let mut locations = vec![UNMAPPED; 5];
        // Logical 0 is already at physical 2.
        qubits[2] = 0;
        locations[0] = 2;

        map_on_demand(&arch, &mut qubits, &mut locations, 1, Some(0));
        // Nearest free physical qubit to 2 is 1 or 3; either is valid.
        assert!(locations[1] == 1 || locations[1] == 3);
    }
}
