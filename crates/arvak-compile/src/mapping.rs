//! Bridges a logical [`CircuitDag`] to the heuristic qubit mapper.
//!
//! Converts a circuit's gate stream into the [`LayerOp`]s
//! [`arvak_map::router::AStarRouter`] consumes, routes it against an
//! [`Architecture`], then replays the resulting layer-by-layer layout back
//! onto the original gate stream to emit a DAG over physical qubits —
//! inserting SWAPs and wrapping direction-mismatched CX gates in
//! Hadamards, per the architecture's native CX direction.

use tracing::{debug, instrument};

use arvak_arch::Architecture;
use arvak_ir::{
    CircuitDag, CircuitLevel, ClbitId, Gate, GateKind, Instruction, InstructionKind, QubitId,
    StandardGate,
};
use arvak_map::layer::{LayerOp, LayeringPolicy, Layerer};
use arvak_map::results::RoutingResult;
use arvak_map::router::{AStarRouter, RouterConfig};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Transformation pass that maps a logical circuit onto a target
/// [`Architecture`] using the heuristic A\* qubit mapper.
///
/// Requires `properties.architecture` to already be set (e.g. via
/// [`PropertySet::with_target`]). On success, leaves the DAG at
/// [`CircuitLevel::Physical`] and records the [`RoutingResult`] in
/// `properties.routing_result` for passes or callers that want the SWAP
/// count, reversal count, or search statistics.
pub struct HeuristicMappingPass {
    config: RouterConfig,
    layerer: Layerer,
    /// Insert a barrier between each routed layer's emitted gates, so a
    /// downstream optimizer cannot merge across a boundary the router
    /// reasoned about independently. Default `false`.
    pub add_barriers_between_layers: bool,
    /// Append a final measurement on every physical qubit holding a
    /// still-live logical qubit, using the final layout. Default `false`.
    pub add_measurements_to_mapped_circuit: bool,
}

impl HeuristicMappingPass {
    #[must_use]
    pub fn new(config: RouterConfig, layerer: Layerer) -> Self {
        Self {
            config,
            layerer,
            add_barriers_between_layers: false,
            add_measurements_to_mapped_circuit: false,
        }
    }

    /// Toggle inserting a barrier between each routed layer's gates.
    #[must_use]
    pub fn with_barriers_between_layers(mut self, enabled: bool) -> Self {
        self.add_barriers_between_layers = enabled;
        self
    }

    /// Toggle appending a final measurement on every live physical qubit.
    #[must_use]
    pub fn with_measurements_to_mapped_circuit(mut self, enabled: bool) -> Self {
        self.add_measurements_to_mapped_circuit = enabled;
        self
    }
}

impl Default for HeuristicMappingPass {
    fn default() -> Self {
        Self::new(RouterConfig::default(), Layerer::new(LayeringPolicy::DisjointQubits, None))
    }
}

impl Pass for HeuristicMappingPass {
    fn name(&self) -> &str {
        "heuristic_mapping"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    #[instrument(skip(self, dag, properties))]
    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let arch = properties
            .architecture
            .clone()
            .ok_or_else(|| CompileError::MissingProperty("architecture".into()))?;

        let (mapped, result) = map_dag(
            dag,
            &arch,
            &self.config,
            &self.layerer,
            self.add_barriers_between_layers,
            self.add_measurements_to_mapped_circuit,
        )?;
        *dag = mapped;
        properties.routing_result = Some(result);
        Ok(())
    }
}

/// Maps `dag`'s gate stream onto `arch`, returning the physical-qubit DAG
/// and the [`RoutingResult`] describing what the router did.
///
/// The mapper's closed two-qubit vocabulary is `CX` (direction-aware, via
/// H-wraps) and any other two-qubit gate (placed as-is, since it only
/// needs the pair adjacent — not a specific direction). Single-qubit
/// gates, measurements, resets, barriers, delays and shuttles all pass
/// through untouched beyond qubit remapping.
///
/// `add_barriers_between_layers` inserts a barrier after each routed
/// layer's gates; `add_measurements_to_mapped_circuit` appends a final
/// measurement on every physical qubit holding a still-live logical qubit
/// at the end of the circuit. Both default to off in
/// [`HeuristicMappingPass::default`].
pub fn map_dag(
    dag: &CircuitDag,
    arch: &Architecture,
    config: &RouterConfig,
    layerer: &Layerer,
    add_barriers_between_layers: bool,
    add_measurements_to_mapped_circuit: bool,
) -> CompileResult<(CircuitDag, RoutingResult)> {
    let num_logical = dag.num_qubits() as u32;

    // Every instruction in stream order, gate or not — replay below indexes
    // into this directly rather than re-walking `dag.topological_ops()`, so
    // each routed layer's gates (identified by their position here) can be
    // replayed by identity instead of by per-layer count.
    let all_insts: Vec<(_, &Instruction)> = dag.topological_ops().collect();

    let mut ops = Vec::new();
    for (i, (_, inst)) in all_insts.iter().enumerate() {
        if let InstructionKind::Gate(gate) = &inst.kind {
            match inst.qubits.len() {
                1 => ops.push((LayerOp::Single(inst.qubits[0].0), i)),
                2 => ops.push((LayerOp::Two(inst.qubits[0].0, inst.qubits[1].0), i)),
                _ => return Err(CompileError::UnsupportedGate(gate.kind.name().to_string())),
            }
        }
    }

    let router = AStarRouter::new(config.clone(), layerer.clone());
    let result = router.route_indexed(arch, num_logical, &ops)?;

    let mut new_dag = CircuitDag::new();
    for p in 0..arch.num_qubits() {
        new_dag.add_qubit(QubitId(p));
    }
    for c in dag.clbits() {
        new_dag.add_clbit(c);
    }
    new_dag.set_global_phase(dag.global_phase());
    new_dag.set_level(CircuitLevel::Physical);

    let mut locations: Vec<u32> = result
        .layers
        .first()
        .map(|l| l.locations_before.clone())
        .unwrap_or_else(|| (0..num_logical).collect());

    // Advances strictly forward through `all_insts`, emitting any
    // non-gate instruction (barrier, measure, reset, ...) it passes over
    // under `locations` as currently in effect. Gate instructions are
    // skipped here — each is replayed exactly once, by its own layer,
    // below — so this only ever "fills in" what isn't part of any layer.
    let mut passthrough_cursor = 0usize;

    for report in &result.layers {
        for &(a, b) in &report.swaps {
            emit_swap(&mut new_dag, arch, a, b)?;
        }
        locations = report.locations_after.clone();

        let mut indices: Vec<usize> = report
            .layer
            .two_qubit_indices
            .iter()
            .copied()
            .chain(report.layer.single_qubit_indices.values().flatten().copied())
            .collect();
        indices.sort_unstable();

        for idx in indices {
            sweep_passthrough(&mut new_dag, &all_insts, &mut passthrough_cursor, idx, &locations)?;
            replay(&mut new_dag, arch, all_insts[idx].1, &locations)?;
            passthrough_cursor = passthrough_cursor.max(idx + 1);
        }

        if add_barriers_between_layers {
            let live_physical: Vec<QubitId> = (0..arch.num_qubits()).map(QubitId).collect();
            new_dag.apply(Instruction::barrier(live_physical))?;
        }
    }

    // Any instruction not claimed by a layer — trailing measurements,
    // barriers, or anything after the last routed layer — carried over at
    // the final layout.
    sweep_passthrough(&mut new_dag, &all_insts, &mut passthrough_cursor, all_insts.len(), &locations)?;

    if add_measurements_to_mapped_circuit {
        let mut next_clbit = dag.clbits().map(|c| c.0).max().map_or(0, |m| m + 1);
        for &physical in &locations {
            let clbit = ClbitId(next_clbit);
            next_clbit += 1;
            new_dag.add_clbit(clbit);
            new_dag.apply(Instruction::measure(QubitId(physical), clbit))?;
        }
    }

    Ok((new_dag, result))
}

/// Replays every not-yet-visited instruction in `all_insts[*cursor..upto]`
/// that is NOT a gate (a barrier, measurement, reset, ...), under
/// `locations`, advancing `*cursor` to `upto`. Gate instructions in that
/// range are left untouched — they belong to some routed layer and are
/// replayed by that layer's own index list instead.
fn sweep_passthrough(
    new_dag: &mut CircuitDag,
    all_insts: &[(arvak_ir::NodeIndex, &Instruction)],
    cursor: &mut usize,
    upto: usize,
    locations: &[u32],
) -> CompileResult<()> {
    while *cursor < upto {
        let inst = all_insts[*cursor].1;
        if !matches!(inst.kind, InstructionKind::Gate(_)) {
            replay_passthrough(new_dag, inst, locations)?;
        }
        *cursor += 1;
    }
    Ok(())
}

fn replay(
    new_dag: &mut CircuitDag,
    arch: &Architecture,
    inst: &Instruction,
    locations: &[u32],
) -> CompileResult<()> {
    match &inst.kind {
        InstructionKind::Gate(gate) if inst.qubits.len() == 2 => {
            let p0 = locations[inst.qubits[0].0 as usize];
            let p1 = locations[inst.qubits[1].0 as usize];
            emit_two_qubit(new_dag, arch, gate, p0, p1)
        }
        InstructionKind::Gate(gate) if inst.qubits.len() == 1 => {
            let physical = locations[inst.qubits[0].0 as usize];
            new_dag.apply(Instruction::gate(gate.clone(), [QubitId(physical)]))?;
            Ok(())
        }
        _ => replay_passthrough(new_dag, inst, locations),
    }
}

fn replay_passthrough(
    new_dag: &mut CircuitDag,
    inst: &Instruction,
    locations: &[u32],
) -> CompileResult<()> {
    let qubits = inst
        .qubits
        .iter()
        .map(|q| QubitId(locations[q.0 as usize]))
        .collect();
    new_dag.apply(Instruction {
        kind: inst.kind.clone(),
        qubits,
        clbits: inst.clbits.clone(),
    })?;
    Ok(())
}

/// Emits a two-qubit gate between physical qubits `p0` and `p1`. `CX` gets
/// direction-aware placement (H-wrapped if only the reverse direction is
/// native); any other two-qubit gate is placed as-is, since the router
/// already guarantees the pair is adjacent.
fn emit_two_qubit(
    new_dag: &mut CircuitDag,
    arch: &Architecture,
    gate: &Gate,
    p0: u32,
    p1: u32,
) -> CompileResult<()> {
    if matches!(gate.kind, GateKind::Standard(StandardGate::CX)) {
        emit_cx(new_dag, arch, p0, p1)
    } else {
        new_dag.apply(Instruction::gate(gate.clone(), [QubitId(p0), QubitId(p1)]))?;
        Ok(())
    }
}

/// Emits a native CX(control, target). Wraps in four Hadamards when only
/// the reverse direction is native, using the identity
/// `CX(c,t) = (H⊗H) · CX(t,c) · (H⊗H)`.
fn emit_cx(new_dag: &mut CircuitDag, arch: &Architecture, control: u32, target: u32) -> CompileResult<()> {
    if arch.is_native_direction(control, target) {
        new_dag.apply(Instruction::two_qubit_gate(
            StandardGate::CX,
            QubitId(control),
            QubitId(target),
        ))?;
    } else {
        debug!(control, target, "wrapping reversed CX in Hadamards");
        new_dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(control)))?;
        new_dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(target)))?;
        new_dag.apply(Instruction::two_qubit_gate(
            StandardGate::CX,
            QubitId(target),
            QubitId(control),
        ))?;
        new_dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(control)))?;
        new_dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(target)))?;
    }
    Ok(())
}

/// Decomposes a SWAP between physical qubits `a` and `b` into three native
/// CXs, each direction-resolved independently — reproducing
/// [`arvak_arch::COST_BIDIRECTIONAL_SWAP`] / [`arvak_arch::COST_UNIDIRECTIONAL_SWAP`]
/// exactly depending on how many of the three legs need H-wraps.
fn emit_swap(new_dag: &mut CircuitDag, arch: &Architecture, a: u32, b: u32) -> CompileResult<()> {
    emit_cx(new_dag, arch, a, b)?;
    emit_cx(new_dag, arch, b, a)?;
    emit_cx(new_dag, arch, a, b)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arvak_ir::{Circuit, QubitId as Q};

    fn line3() -> Architecture {
        Architecture::new(3, vec![(0, 1), (1, 0), (1, 2), (2, 1)])
    }

    #[test]
    fn adjacent_gate_needs_no_swaps() {
        let mut circuit = Circuit::with_size("t", 2, 0);
        circuit.h(Q(0)).unwrap();
        circuit.cx(Q(0), Q(1)).unwrap();
        let dag = circuit.into_dag();

        let arch = Architecture::new(2, vec![(0, 1), (1, 0)]);
        let (mapped, result) = map_dag(
            &dag,
            &arch,
            &RouterConfig::default(),
            &Layerer::new(LayeringPolicy::DisjointQubits, None),
            false,
            false,
        )
        .unwrap();

        assert_eq!(result.total_swaps(), 0);
        assert_eq!(mapped.num_ops(), 2);
        assert_eq!(mapped.level(), CircuitLevel::Physical);
    }

    #[test]
    fn distant_gate_gets_routed_with_swaps() {
        let mut circuit = Circuit::with_size("t", 3, 0);
        circuit.cx(Q(0), Q(2)).unwrap();
        let dag = circuit.into_dag();

        let arch = line3();
        let (mapped, result) = map_dag(
            &dag,
            &arch,
            &RouterConfig::default(),
            &Layerer::new(LayeringPolicy::DisjointQubits, None),
            false,
            false,
        )
        .unwrap();

        assert!(result.total_swaps() >= 1);
        // Every CX in the emitted circuit must land on a native edge.
        for (_, inst) in mapped.topological_ops() {
            if let InstructionKind::Gate(gate) = &inst.kind {
                if matches!(gate.kind, GateKind::Standard(StandardGate::CX)) {
                    let c = inst.qubits[0].0;
                    let t = inst.qubits[1].0;
                    assert!(arch.is_native_direction(c, t));
                }
            }
        }
    }

    #[test]
    fn unidirectional_edge_wraps_reversed_cx_in_hadamards() {
        let mut circuit = Circuit::with_size("t", 2, 0);
        circuit.cx(Q(1), Q(0)).unwrap();
        let dag = circuit.into_dag();

        // Only 0 -> 1 is native.
        let arch = Architecture::new(2, vec![(0, 1)]);
        let (mapped, _) = map_dag(
            &dag,
            &arch,
            &RouterConfig::default(),
            &Layerer::new(LayeringPolicy::DisjointQubits, None),
            false,
            false,
        )
        .unwrap();

        let mut h_count = 0;
        let mut cx_count = 0;
        for (_, inst) in mapped.topological_ops() {
            if let InstructionKind::Gate(gate) = &inst.kind {
                match &gate.kind {
                    GateKind::Standard(StandardGate::H) => h_count += 1,
                    GateKind::Standard(StandardGate::CX) => {
                        cx_count += 1;
                        assert!(arch.is_native_direction(inst.qubits[0].0, inst.qubits[1].0));
                    }
                    _ => {}
                }
            }
        }
        assert_eq!(cx_count, 1);
        assert_eq!(h_count, 4);
    }

    #[test]
    fn measurements_survive_mapping_at_final_layout() {
        let mut circuit = Circuit::with_size("t", 3, 3);
        circuit.cx(Q(0), Q(2)).unwrap();
        circuit.measure_all().unwrap();
        let dag = circuit.into_dag();

        let arch = line3();
        let (mapped, _) = map_dag(
            &dag,
            &arch,
            &RouterConfig::default(),
            &Layerer::new(LayeringPolicy::DisjointQubits, None),
            false,
            false,
        )
        .unwrap();

        let measure_count = mapped
            .topological_ops()
            .filter(|(_, inst)| inst.is_measure())
            .count();
        assert_eq!(measure_count, 3);
    }

    #[test]
    fn larger_circuit_than_device_is_rejected() {
        let mut circuit = Circuit::with_size("t", 4, 0);
        circuit.cx(Q(0), Q(1)).unwrap();
        let dag = circuit.into_dag();

        let arch = Architecture::new(3, vec![(0, 1), (1, 0), (1, 2), (2, 1)]);
        let err = map_dag(
            &dag,
            &arch,
            &RouterConfig::default(),
            &Layerer::new(LayeringPolicy::DisjointQubits, None),
            false,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::Map(_)));
    }

    #[test]
    fn barriers_inserted_between_layers_when_enabled() {
        let mut circuit = Circuit::with_size("t", 4, 0);
        circuit.cx(Q(0), Q(1)).unwrap();
        circuit.cx(Q(2), Q(3)).unwrap();
        let dag = circuit.into_dag();

        let arch = Architecture::new(4, vec![(0, 1), (1, 0), (1, 2), (2, 1), (2, 3), (3, 2)]);
        let (mapped, result) = map_dag(
            &dag,
            &arch,
            &RouterConfig::default(),
            &Layerer::new(LayeringPolicy::DisjointQubits, None),
            true,
            false,
        )
        .unwrap();

        let barrier_count = mapped
            .topological_ops()
            .filter(|(_, inst)| inst.is_barrier())
            .count();
        assert_eq!(barrier_count, result.layers.len());
    }

    #[test]
    fn measurements_appended_when_enabled() {
        let mut circuit = Circuit::with_size("t", 2, 0);
        circuit.cx(Q(0), Q(1)).unwrap();
        let dag = circuit.into_dag();

        let arch = Architecture::new(2, vec![(0, 1), (1, 0)]);
        let (mapped, _) = map_dag(
            &dag,
            &arch,
            &RouterConfig::default(),
            &Layerer::new(LayeringPolicy::DisjointQubits, None),
            false,
            true,
        )
        .unwrap();

        let measure_count = mapped
            .topological_ops()
            .filter(|(_, inst)| inst.is_measure())
            .count();
        assert_eq!(measure_count, 2);
    }
}
