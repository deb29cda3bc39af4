//! Orchestrates bound determination and solver iteration: turns a
//! `(initial tableau, target tableau)` pair into a synthesized Clifford
//! circuit, optimal under the configured metric.
//!
//! The three building blocks ([`crate::tableau_encoder::TableauVars`],
//! [`crate::gate_encoder::GateVars`], [`crate::objective_encoder`]) only
//! know how to build one bounded-timestep constraint system and check it.
//! Everything about *which* bounds to try, in what order, and what to do
//! when the solver times out lives here.

use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};
use z3::ast::{Ast, Bool};
use z3::{Config as Z3Config, Context, Model, Optimize, Solver};

use arvak_tableau::{CliffordOp, Tableau};

use crate::cardinality::CardinalityEncoding;
use crate::clifford_gate::SingleGate;
use crate::error::{SynthError, SynthResult};
use crate::gate_encoder::{GateVars, TimestepEncoding};
use crate::objective_encoder::{self, ObjectiveTarget};
use crate::results::SynthesisResults;
use crate::solver::{self, SolveOutcome};
use crate::tableau_encoder::TableauVars;

/// Hard ceiling on the timestep-doubling search, guarding against an
/// unreachable target (which would otherwise double forever). Any
/// well-formed Clifford tableau is reachable from any other in at most
/// `O(n^2 / log n)` gates (Aaronson-Gottesman), so this is generous for
/// any qubit count this core is meant to run on.
const MAX_TIMESTEP_CEILING: u64 = 1 << 16;

/// Tunable knobs for one synthesis run, mirroring the `target`,
/// `initial_timestep_limit`, `use_max_sat`, ... options of the synthesis
/// config surface.
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    pub target: ObjectiveTarget,
    /// Initial timestep bound to seed the upper-bound search with; `0`
    /// means auto (seed at `1`, or at an initial circuit's own gate count
    /// / depth when one is supplied).
    pub initial_timestep_limit: u64,
    pub use_max_sat: bool,
    /// When not using MaxSAT: linear search (increment by one) instead of
    /// binary search between the last-UNSAT and first-SAT bounds.
    pub linear_search: bool,
    pub use_symmetry_breaking: bool,
    pub cardinality_encoding: CardinalityEncoding,
    /// Parallel sub-circuit workers for [`CliffordSynthesizer::synthesize_heuristic`].
    pub n_threads: u32,
    pub split_size: u32,
    pub minimize_gates_after_depth_optimization: bool,
    pub try_higher_gate_limit_for_two_qubit_gate_optimization: bool,
    pub gate_limit_factor: f32,
    pub minimize_gates_after_two_qubit_gate_optimization: bool,
    pub timeout: Duration,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            target: ObjectiveTarget::Gates,
            initial_timestep_limit: 0,
            use_max_sat: false,
            linear_search: false,
            use_symmetry_breaking: true,
            cardinality_encoding: CardinalityEncoding::Naive,
            n_threads: 4,
            split_size: 5,
            minimize_gates_after_depth_optimization: false,
            try_higher_gate_limit_for_two_qubit_gate_optimization: false,
            gate_limit_factor: 1.1,
            minimize_gates_after_two_qubit_gate_optimization: false,
            timeout: Duration::from_secs(60),
        }
    }
}

/// A decoded solver model: the gate sequence it describes plus the
/// metrics the caller ultimately reports.
#[derive(Debug, Clone)]
struct ExtractedSolution {
    circuit: Vec<CliffordOp>,
    gates: u64,
    two_qubit_gates: u64,
    depth: u64,
}

fn timestep_encoding_for(target: ObjectiveTarget) -> TimestepEncoding {
    match target {
        ObjectiveTarget::Depth => TimestepEncoding::MultiGatePerStep,
        ObjectiveTarget::Gates | ObjectiveTarget::TwoQubitGates | ObjectiveTarget::Fidelity => {
            TimestepEncoding::SingleGatePerStep
        }
    }
}

fn eval_bool<'ctx>(model: &Model<'ctx>, var: &Bool<'ctx>) -> bool {
    model.eval(var, true).and_then(|b| b.as_bool()).unwrap_or(false)
}

fn single_gate_to_op(gate: SingleGate, qubit: usize) -> Option<CliffordOp> {
    match gate {
        SingleGate::NoOp => None,
        SingleGate::H => Some(CliffordOp::H(qubit)),
        SingleGate::S => Some(CliffordOp::S(qubit)),
        SingleGate::Sdg => Some(CliffordOp::Sdg(qubit)),
        SingleGate::X => Some(CliffordOp::X(qubit)),
        SingleGate::Y => Some(CliffordOp::Y(qubit)),
        SingleGate::Z => Some(CliffordOp::Z(qubit)),
    }
}

/// Decodes which gate fired at each timestep from a satisfying model, in
/// application order. Within a timestep, two-qubit gates are read out
/// before single-qubit ones (only one or the other fires under
/// `SingleGatePerStep`; under `MultiGatePerStep` this is just a
/// deterministic tie-break, sorted by qubit pair / index for
/// reproducibility).
fn extract_solution<'ctx>(
    model: &Model<'ctx>,
    gates: &GateVars<'ctx>,
    num_qubits: usize,
    timesteps: usize,
    mode: TimestepEncoding,
) -> ExtractedSolution {
    let mut circuit = Vec::new();
    let mut gate_count = 0u64;
    let mut two_count = 0u64;
    let mut active_steps = 0u64;

    for t in 1..=timesteps {
        let mut step_has_gate = false;

        let mut pairs: Vec<(usize, usize)> = gates.two[t].keys().copied().collect();
        pairs.sort_unstable();
        for pair in pairs {
            if eval_bool(model, &gates.two[t][&pair]) {
                circuit.push(CliffordOp::Cx(pair.0, pair.1));
                gate_count += 1;
                two_count += 1;
                step_has_gate = true;
            }
        }

        for q in 0..num_qubits {
            for g in SingleGate::ALL {
                if !g.is_real_gate() {
                    continue;
                }
                if eval_bool(model, &gates.single[t][q][&g]) {
                    if let Some(op) = single_gate_to_op(g, q) {
                        circuit.push(op);
                        gate_count += 1;
                        step_has_gate = true;
                    }
                }
            }
        }

        if step_has_gate {
            active_steps += 1;
        }
    }

    let depth = match mode {
        TimestepEncoding::MultiGatePerStep => active_steps,
        TimestepEncoding::SingleGatePerStep => gate_count,
    };

    ExtractedSolution {
        circuit,
        gates: gate_count,
        two_qubit_gates: two_count,
        depth,
    }
}

/// Forces idle timesteps to be a prefix (once a timestep has a real gate,
/// every later timestep must too), so a model can't scatter its real
/// gates arbitrarily among `T` slots. Used under `use_symmetry_breaking`
/// for the `Depth` objective, where unlike `SingleGatePerStep` a timestep
/// may legitimately be idle.
fn assert_idle_prefix<'ctx>(ctx: &'ctx Context, solver: &Solver<'ctx>, gates: &GateVars<'ctx>, timesteps: usize) {
    for t in 1..timesteps {
        let active_t = gates.timestep_active(ctx, t);
        let active_next = gates.timestep_active(ctx, t + 1);
        solver.assert(&active_t.implies(&active_next));
    }
}

/// SAT-based Clifford circuit synthesizer: incrementally encodes a
/// bounded-timestep gate sequence and delegates feasibility to z3,
/// driving the bound via the configured search strategy.
#[derive(Debug, Clone)]
pub struct CliffordSynthesizer {
    num_qubits: usize,
    /// Directed `(control, target)` pairs a `CX` is allowed on; the
    /// reduced coupling map of whichever physical qubits this synthesis
    /// run is scoped to.
    coupling: Vec<(usize, usize)>,
    config: SynthesisConfig,
}

impl CliffordSynthesizer {
    #[must_use]
    pub fn new(num_qubits: usize, coupling: Vec<(usize, usize)>, config: SynthesisConfig) -> Self {
        Self { num_qubits, coupling, config }
    }

    #[must_use]
    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Replays `source` from `initial` to compute its resulting target
    /// tableau, for the "synthesize an equivalent circuit to this one"
    /// entry point.
    pub fn target_tableau_from_circuit(initial: &Tableau, source: &[CliffordOp]) -> SynthResult<Tableau> {
        let mut t = initial.clone();
        for &op in source {
            t.apply_gate(op)?;
        }
        Ok(t)
    }

    /// Synthesizes a circuit transforming `initial` into `target`,
    /// optimal under `self.config.target`.
    #[instrument(skip(self, initial, target))]
    pub fn synthesize(&self, initial: &Tableau, target: &Tableau) -> SynthResult<SynthesisResults> {
        self.validate_tableaux(initial, target)?;

        if self.config.target == ObjectiveTarget::Fidelity && !self.config.use_max_sat {
            return Err(SynthError::UnsupportedOperation(
                "the Fidelity objective has no integer bound to binary/linear search; it requires use_max_sat".into(),
            ));
        }

        let mode = timestep_encoding_for(self.config.target);
        let cfg = Z3Config::new();
        let ctx = Context::new(&cfg);
        let mut results = SynthesisResults::unsat(self.config.target);

        let Some((seed_upper, seed_solution)) = self.search_reachable_timesteps(&ctx, initial, target, mode, &mut results)?
        else {
            return Ok(results);
        };

        let best = if self.config.use_max_sat {
            self.run_maxsat(&ctx, initial, target, mode, seed_upper, &mut results)?.unwrap_or(seed_solution)
        } else {
            match self.config.target {
                ObjectiveTarget::Gates => self.refine_timesteps(&ctx, initial, target, mode, seed_upper, seed_solution, &mut results)?,
                _ => self.refine_bound(&ctx, initial, target, mode, seed_upper, seed_solution, &mut results)?,
            }
        };

        let best = self.run_post_passes(&ctx, initial, target, mode, best, &mut results)?;

        self.finalize(best, initial, &mut results)?;
        Ok(results)
    }

    fn validate_tableaux(&self, initial: &Tableau, target: &Tableau) -> SynthResult<()> {
        if initial.num_qubits() != self.num_qubits || target.num_qubits() != self.num_qubits {
            return Err(SynthError::TableauMismatch(format!(
                "synthesizer configured for {} qubits, got initial={}, target={}",
                self.num_qubits,
                initial.num_qubits(),
                target.num_qubits()
            )));
        }
        if initial.includes_destabilizers() != target.includes_destabilizers() {
            return Err(SynthError::TableauMismatch(
                "initial and target tableaux disagree on destabilizer tracking".into(),
            ));
        }
        Ok(())
    }

    fn seed_timesteps(&self) -> u64 {
        if self.config.initial_timestep_limit > 0 {
            self.config.initial_timestep_limit
        } else {
            1
        }
    }

    /// One bounded-timestep SAT attempt: builds fresh variables for
    /// `timesteps` steps, asserts structure/transition/boundary
    /// constraints (plus `bound` on the target metric, if given), and
    /// checks under the configured timeout.
    fn attempt<'ctx>(
        &self,
        ctx: &'ctx Context,
        initial: &Tableau,
        target: &Tableau,
        mode: TimestepEncoding,
        timesteps: u64,
        bound: Option<u64>,
        results: &mut SynthesisResults,
    ) -> SynthResult<Option<ExtractedSolution>> {
        let ts = timesteps as usize;
        let solver = Solver::new(ctx);
        let gates = GateVars::new(ctx, self.num_qubits, ts, &self.coupling);
        gates.assert_structure(ctx, &solver, self.config.cardinality_encoding, mode);

        let tvars = TableauVars::new(ctx, initial.num_rows(), self.num_qubits, ts);
        tvars.assert_initial(ctx, &solver, initial);
        tvars.assert_target(ctx, &solver, target);
        for t in 1..=ts {
            tvars.assert_transition(ctx, &solver, t, &gates);
        }

        if self.config.use_symmetry_breaking && mode == TimestepEncoding::MultiGatePerStep {
            assert_idle_prefix(ctx, &solver, &gates, ts);
        }

        if let Some(bound) = bound {
            objective_encoder::assert_bound(ctx, &solver, &gates, ts, self.config.target, bound);
        }

        let start = Instant::now();
        match solver::check_with_timeout(ctx, &solver, self.config.timeout) {
            Ok(SolveOutcome::Sat) => {
                let model = solver.get_model().ok_or_else(|| {
                    SynthError::UnsupportedOperation("solver reported SAT without a model".into())
                })?;
                let solution = extract_solution(&model, &gates, self.num_qubits, ts, mode);
                results.record_probe(timesteps, true, start.elapsed());
                Ok(Some(solution))
            }
            Ok(SolveOutcome::Unsat) => {
                results.record_probe(timesteps, false, start.elapsed());
                Ok(None)
            }
            Err(SynthError::SolverTimeout { elapsed_ms }) => {
                warn!(timesteps, elapsed_ms, "solver call timed out");
                results.timeout = true;
                results.record_probe(timesteps, false, Duration::from_millis(elapsed_ms));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Geometrically doubling search for *any* satisfying bound (no
    /// metric bound asserted), establishing a generous timestep ceiling
    /// every later search stage can assume reachability within. Returns
    /// `None` (not an error) if the search gave up on a timeout before
    /// finding one, matching the "best-so-far" timeout policy.
    fn search_reachable_timesteps<'ctx>(
        &self,
        ctx: &'ctx Context,
        initial: &Tableau,
        target: &Tableau,
        mode: TimestepEncoding,
        results: &mut SynthesisResults,
    ) -> SynthResult<Option<(u64, ExtractedSolution)>> {
        let mut timesteps = self.seed_timesteps();
        loop {
            if let Some(solution) = self.attempt(ctx, initial, target, mode, timesteps, None, results)? {
                info!(timesteps, "found a satisfying timestep bound");
                return Ok(Some((timesteps, solution)));
            }
            if results.timeout {
                return Ok(None);
            }
            if timesteps >= MAX_TIMESTEP_CEILING {
                return Err(SynthError::UpperBoundExceeded { max_timesteps: timesteps });
            }
            timesteps = (timesteps * 2).max(timesteps + 1);
        }
    }

    /// Gate-optimal search: since `SingleGatePerStep` forces exactly one
    /// real gate per timestep, `T` *is* gate count, so minimizing gate
    /// count means minimizing the smallest SAT `T`.
    fn refine_timesteps<'ctx>(
        &self,
        ctx: &'ctx Context,
        initial: &Tableau,
        target: &Tableau,
        mode: TimestepEncoding,
        upper: u64,
        upper_solution: ExtractedSolution,
        results: &mut SynthesisResults,
    ) -> SynthResult<ExtractedSolution> {
        let mut lower = upper / 2;
        let mut best = upper_solution;
        let mut best_t = upper;

        if self.config.linear_search {
            let mut t = lower.max(1);
            while t < best_t {
                match self.attempt(ctx, initial, target, mode, t, None, results)? {
                    Some(solution) => {
                        best = solution;
                        best_t = t;
                        break;
                    }
                    None => {
                        if results.timeout {
                            return Ok(best);
                        }
                        t += 1;
                    }
                }
            }
            return Ok(best);
        }

        let mut upper = upper;
        while lower < upper {
            let mid = lower + (upper - lower) / 2;
            if mid == 0 {
                break;
            }
            match self.attempt(ctx, initial, target, mode, mid, None, results)? {
                Some(solution) => {
                    best = solution;
                    upper = mid;
                }
                None => {
                    if results.timeout {
                        return Ok(best);
                    }
                    lower = mid + 1;
                }
            }
        }
        Ok(best)
    }

    /// Binary/linear search over the metric's *bound* (not `T`, which is
    /// fixed generous at `t_fixed`): used for `TwoQubitGates` and `Depth`,
    /// where a smaller metric value doesn't necessarily mean a smaller
    /// total gate count.
    fn refine_bound<'ctx>(
        &self,
        ctx: &'ctx Context,
        initial: &Tableau,
        target: &Tableau,
        mode: TimestepEncoding,
        t_fixed: u64,
        seed_solution: ExtractedSolution,
        results: &mut SynthesisResults,
    ) -> SynthResult<ExtractedSolution> {
        let mut upper_bound = metric_value(&seed_solution, self.config.target);
        let mut best = seed_solution;

        if upper_bound == 0 {
            return Ok(best);
        }

        if self.config.linear_search {
            for bound in 0..upper_bound {
                match self.attempt(ctx, initial, target, mode, t_fixed, Some(bound), results)? {
                    Some(solution) => {
                        best = solution;
                        break;
                    }
                    None => {
                        if results.timeout {
                            break;
                        }
                    }
                }
            }
            return Ok(best);
        }

        let mut lower = 0u64;
        while lower < upper_bound {
            let mid = lower + (upper_bound - lower) / 2;
            match self.attempt(ctx, initial, target, mode, t_fixed, Some(mid), results)? {
                Some(solution) => {
                    best = solution;
                    upper_bound = mid;
                }
                None => {
                    if results.timeout {
                        break;
                    }
                    lower = mid + 1;
                }
            }
        }
        Ok(best)
    }

    /// Re-probes the two-qubit-gate objective with more timesteps than the
    /// solution already in hand needed, then re-minimizes within that
    /// larger budget. Under [`TimestepEncoding::SingleGatePerStep`] every
    /// timestep carries exactly one gate, so widening the gate budget means
    /// widening `timesteps` itself before `refine_bound` can search for a
    /// lower count again. Returns `None` if even the relaxed budget is
    /// unreachable (a timeout, or a genuinely infeasible tableau pair,
    /// which should not happen once `best` already witnesses feasibility at
    /// a smaller budget, but is handled defensively all the same).
    fn retry_with_relaxed_gate_limit<'ctx>(
        &self,
        ctx: &'ctx Context,
        initial: &Tableau,
        target: &Tableau,
        mode: TimestepEncoding,
        relaxed_timesteps: u64,
        results: &mut SynthesisResults,
    ) -> SynthResult<Option<ExtractedSolution>> {
        match self.attempt(ctx, initial, target, mode, relaxed_timesteps, None, results)? {
            Some(seed) => {
                let refined = self.refine_bound(ctx, initial, target, mode, relaxed_timesteps, seed, results)?;
                Ok(Some(refined))
            }
            None => Ok(None),
        }
    }

    /// One-shot MaxSAT search: builds the same constraint system over an
    /// `Optimize` handle and registers the target as a soft objective.
    fn run_maxsat<'ctx>(
        &self,
        ctx: &'ctx Context,
        initial: &Tableau,
        target: &Tableau,
        mode: TimestepEncoding,
        timesteps: u64,
        results: &mut SynthesisResults,
    ) -> SynthResult<Option<ExtractedSolution>> {
        let ts = timesteps as usize;
        let optimize = Optimize::new(ctx);
        let gates = GateVars::new(ctx, self.num_qubits, ts, &self.coupling);
        gates.assert_structure(ctx, &optimize, self.config.cardinality_encoding, mode);

        let tvars = TableauVars::new(ctx, initial.num_rows(), self.num_qubits, ts);
        tvars.assert_initial(ctx, &optimize, initial);
        tvars.assert_target(ctx, &optimize, target);
        for t in 1..=ts {
            tvars.assert_transition(ctx, &optimize, t, &gates);
        }

        objective_encoder::minimize(ctx, &optimize, &gates, ts, self.config.target, initial_properties(self));

        let start = Instant::now();
        match solver::optimize_with_timeout(ctx, &optimize, self.config.timeout) {
            Ok(SolveOutcome::Sat) => {
                let model = optimize.get_model().ok_or_else(|| {
                    SynthError::UnsupportedOperation("optimizer reported SAT without a model".into())
                })?;
                results.record_probe(timesteps, true, start.elapsed());
                Ok(Some(extract_solution(&model, &gates, self.num_qubits, ts, mode)))
            }
            Ok(SolveOutcome::Unsat) => {
                results.record_probe(timesteps, false, start.elapsed());
                Ok(None)
            }
            Err(SynthError::SolverTimeout { elapsed_ms }) => {
                results.timeout = true;
                results.record_probe(timesteps, false, Duration::from_millis(elapsed_ms));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn run_post_passes<'ctx>(
        &self,
        ctx: &'ctx Context,
        initial: &Tableau,
        target: &Tableau,
        mode: TimestepEncoding,
        best: ExtractedSolution,
        results: &mut SynthesisResults,
    ) -> SynthResult<ExtractedSolution> {
        let mut best = best;

        if self.config.target == ObjectiveTarget::Depth && self.config.minimize_gates_after_depth_optimization {
            let fixed_depth_timesteps = best.depth.max(1);
            let gate_cfg = SynthesisConfig {
                target: ObjectiveTarget::Gates,
                use_max_sat: self.config.use_max_sat,
                ..self.config.clone()
            };
            let gate_pass = CliffordSynthesizer::new(self.num_qubits, self.coupling.clone(), gate_cfg);
            if let Some((seed_upper, seed_solution)) =
                gate_pass.search_reachable_timesteps(ctx, initial, target, TimestepEncoding::MultiGatePerStep, results)?
            {
                let refined = gate_pass.refine_bound(ctx, initial, target, TimestepEncoding::MultiGatePerStep, seed_upper, seed_solution, results)?;
                if refined.depth <= fixed_depth_timesteps && refined.gates < best.gates {
                    best = refined;
                }
            }
        }

        if self.config.target == ObjectiveTarget::TwoQubitGates {
            if self.config.try_higher_gate_limit_for_two_qubit_gate_optimization {
                let relaxed_limit =
                    (((best.gates as f32) * self.config.gate_limit_factor).ceil() as u64).max(best.gates + 1);
                debug!(relaxed_limit, "retrying two-qubit-gate minimization with a relaxed total gate budget");
                if let Some(refined) =
                    self.retry_with_relaxed_gate_limit(ctx, initial, target, mode, relaxed_limit, results)?
                {
                    if refined.two_qubit_gates < best.two_qubit_gates
                        || (refined.two_qubit_gates == best.two_qubit_gates && refined.gates < best.gates)
                    {
                        best = refined;
                    }
                }
            }
            if self.config.minimize_gates_after_two_qubit_gate_optimization {
                let fixed_two_qubit_budget = best.two_qubit_gates;
                let gate_cfg = SynthesisConfig {
                    target: ObjectiveTarget::Gates,
                    use_max_sat: self.config.use_max_sat,
                    ..self.config.clone()
                };
                let gate_pass = CliffordSynthesizer::new(self.num_qubits, self.coupling.clone(), gate_cfg);
                if let Some((seed_upper, seed_solution)) =
                    gate_pass.search_reachable_timesteps(ctx, initial, target, mode, results)?
                {
                    let refined = gate_pass.refine_timesteps(ctx, initial, target, mode, seed_upper, seed_solution, results)?;
                    if refined.two_qubit_gates <= fixed_two_qubit_budget && refined.gates < best.gates {
                        best = refined;
                    }
                }
            }
        }

        Ok(best)
    }

    /// Parallel split synthesis: cuts `layers` into consecutive segments of
    /// `self.config.split_size` layers, synthesizes each segment
    /// independently (and concurrently, across `self.config.n_threads`
    /// workers), then concatenates the results in original segment order.
    ///
    /// Each segment's initial tableau is the previous segment's target
    /// tableau (the first segment's initial tableau is `initial`); a
    /// segment's own target tableau is obtained by replaying that
    /// segment's original gates, so every segment asks "find an
    /// equally-good-or-better replacement for these gates" rather than
    /// assuming a mid-circuit target is known in advance.
    ///
    /// If any segment comes back UNSAT or times out, `split_size` grows by
    /// `max(split_size * 1.2, split_size + 1)` and the whole split is
    /// retried from scratch. Once `split_size` reaches the total layer
    /// count, this degrades to one non-parallel [`Self::synthesize`] call
    /// over the flattened circuit, which is returned as-is (including its
    /// own `timeout` flag) without further escalation.
    #[instrument(skip(self, initial, layers))]
    pub fn synthesize_heuristic(&self, initial: &Tableau, layers: &[Vec<CliffordOp>]) -> SynthResult<SynthesisResults> {
        let total_layers = layers.len() as u32;
        let mut split_size = self.config.split_size.max(1);

        loop {
            if split_size >= total_layers.max(1) {
                let flat: Vec<CliffordOp> = layers.iter().flatten().copied().collect();
                let target = Self::target_tableau_from_circuit(initial, &flat)?;
                return self.synthesize(initial, &target);
            }

            let mut segments = Vec::new();
            let mut seg_initial = initial.clone();
            for chunk in layers.chunks(split_size as usize) {
                let flat: Vec<CliffordOp> = chunk.iter().flatten().copied().collect();
                let seg_target = Self::target_tableau_from_circuit(&seg_initial, &flat)?;
                segments.push((seg_initial.clone(), seg_target.clone()));
                seg_initial = seg_target;
            }

            let results = self.run_segments_once(&segments)?;

            if results.iter().any(|r| !r.sat || r.timeout) {
                let grown = ((f64::from(split_size) * 1.2).ceil() as u32).max(split_size + 1);
                info!(split_size, grown, "segment synthesis escalating split size after UNSAT/timeout");
                split_size = grown;
                continue;
            }

            return Ok(concatenate_segment_results(results));
        }
    }

    /// Dispatches one segment per (initial, target) pair to a bounded
    /// `spawn_blocking` pool, backed by a private current-thread runtime
    /// (the rest of this crate is synchronous; this is the one place
    /// concurrency is genuinely load-bearing). Awaits every task in
    /// original order — a join-all barrier at the segment-list boundary —
    /// so the result order is deterministic regardless of which segment's
    /// solver finishes first.
    fn run_segments_once(&self, segments: &[(Tableau, Tableau)]) -> SynthResult<Vec<SynthesisResults>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .max_blocking_threads(self.config.n_threads.max(1) as usize)
            .enable_time()
            .build()
            .map_err(|e| SynthError::UnsupportedOperation(format!("failed to start synthesis runtime: {e}")))?;

        runtime.block_on(async {
            let mut handles = Vec::with_capacity(segments.len());
            for (seg_initial, seg_target) in segments.iter().cloned() {
                let synth = self.clone();
                handles.push(tokio::task::spawn_blocking(move || synth.synthesize(&seg_initial, &seg_target)));
            }

            let mut results = Vec::with_capacity(handles.len());
            for handle in handles {
                let outcome = handle.await.map_err(|e| {
                    SynthError::UnsupportedOperation(format!("segment synthesis task panicked: {e}"))
                })?;
                results.push(outcome?);
            }
            Ok(results)
        })
    }

    fn finalize(&self, solution: ExtractedSolution, initial: &Tableau, results: &mut SynthesisResults) -> SynthResult<()> {
        results.timesteps = solution.gates;
        results.circuit = solution.circuit;
        results.gates = solution.gates;
        results.two_qubit_gates = solution.two_qubit_gates;
        results.depth = solution.depth;
        results.sat = true;
        self.remove_redundant_gates(initial, results)
    }

    /// Replays the synthesized circuit from `initial`, dropping any gate
    /// that leaves the tableau unchanged. Only valid when destabilizers
    /// aren't tracked: with only the `n` stabilizer rows, a gate that acts
    /// as the identity on every stabilizer may still act nontrivially on
    /// the (untracked) destabilizers, but that's an undetectable global
    /// phase/basis change the synthesizer's target never specified.
    fn remove_redundant_gates(&self, initial: &Tableau, results: &mut SynthesisResults) -> SynthResult<()> {
        if initial.includes_destabilizers() {
            return Ok(());
        }

        let mut state = initial.clone();
        let mut kept = Vec::with_capacity(results.circuit.len());
        for &op in &results.circuit {
            let mut candidate = state.clone();
            candidate.apply_gate(op)?;
            if candidate == state {
                results.redundant_gates_removed += 1;
                continue;
            }
            state = candidate;
            kept.push(op);
        }

        if kept.len() != results.circuit.len() {
            results.two_qubit_gates = kept.iter().filter(|op| matches!(op, CliffordOp::Cx(_, _))).count() as u64;
            results.gates = kept.len() as u64;
            results.depth = results.depth.min(results.gates);
            results.circuit = kept;
        }
        Ok(())
    }
}

/// Concatenates per-segment synthesis results in order: circuits append,
/// scalar metrics sum (a sequential composition of circuits adds gate
/// counts and depths directly), and the bound-search trace is the
/// concatenation of every segment's own trace.
fn concatenate_segment_results(results: Vec<SynthesisResults>) -> SynthesisResults {
    let target = results.first().and_then(|r| r.target);
    let mut combined = SynthesisResults {
        target,
        sat: true,
        ..SynthesisResults::default()
    };
    for r in results {
        combined.circuit.extend(r.circuit);
        combined.gates += r.gates;
        combined.two_qubit_gates += r.two_qubit_gates;
        combined.depth += r.depth;
        combined.timesteps += r.timesteps;
        combined.redundant_gates_removed += r.redundant_gates_removed;
        combined.total_solve_time_ms += r.total_solve_time_ms;
        combined.bound_trace.extend(r.bound_trace);
    }
    combined
}

fn metric_value(solution: &ExtractedSolution, target: ObjectiveTarget) -> u64 {
    match target {
        ObjectiveTarget::Gates => solution.gates,
        ObjectiveTarget::TwoQubitGates => solution.two_qubit_gates,
        ObjectiveTarget::Depth => solution.depth,
        ObjectiveTarget::Fidelity => solution.gates,
    }
}

/// `ObjectiveEncoder::minimize`'s fidelity path needs calibration data;
/// the core's `Architecture`/`Properties` types live one crate away and
/// this synthesizer only carries a reduced coupling map, so fidelity
/// weighting is left to a caller that constructs its own `Optimize` call
/// with `arvak_arch::Properties` in hand. Plain gate-count weighting
/// (`None`) is used here.
fn initial_properties(_synth: &CliffordSynthesizer) -> Option<&arvak_arch::Properties> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use arvak_tableau::CliffordOp as Op;

    fn line_coupling(n: usize) -> Vec<(usize, usize)> {
        let mut edges = Vec::new();
        for q in 0..n - 1 {
            edges.push((q, q + 1));
            edges.push((q + 1, q));
        }
        edges
    }

    #[test]
    fn single_qubit_h_then_s_synthesizes_in_two_gates() {
        let initial = Tableau::new(1, false);
        let mut target = initial.clone();
        target.apply_gate(Op::H(0)).unwrap();
        target.apply_gate(Op::S(0)).unwrap();

        let config = SynthesisConfig {
            target: ObjectiveTarget::Gates,
            timeout: Duration::from_secs(10),
            ..SynthesisConfig::default()
        };
        let synth = CliffordSynthesizer::new(1, Vec::new(), config);
        let results = synth.synthesize(&initial, &target).unwrap();

        assert!(results.sat);
        assert_eq!(results.gates, 2);
        assert_eq!(results.depth, 2);

        let mut replay = initial.clone();
        for &op in &results.circuit {
            replay.apply_gate(op).unwrap();
        }
        assert_eq!(replay, target);
    }

    #[test]
    fn five_hadamards_collapse_to_depth_one() {
        let initial = Tableau::new(1, false);
        let mut target = initial.clone();
        for _ in 0..5 {
            target.apply_gate(Op::H(0)).unwrap();
        }

        let config = SynthesisConfig {
            target: ObjectiveTarget::Depth,
            timeout: Duration::from_secs(10),
            ..SynthesisConfig::default()
        };
        let synth = CliffordSynthesizer::new(1, Vec::new(), config);
        let results = synth.synthesize(&initial, &target).unwrap();

        assert!(results.sat);
        assert_eq!(results.depth, 1);
        assert_eq!(results.gates, 1);

        let mut replay = initial.clone();
        for &op in &results.circuit {
            replay.apply_gate(op).unwrap();
        }
        assert_eq!(replay, target);
    }

    #[test]
    fn cx_on_two_qubits_over_single_edge_needs_one_two_qubit_gate() {
        let initial = Tableau::new(2, false);
        let mut target = initial.clone();
        target.apply_gate(Op::Cx(0, 1)).unwrap();

        let config = SynthesisConfig {
            target: ObjectiveTarget::TwoQubitGates,
            timeout: Duration::from_secs(10),
            ..SynthesisConfig::default()
        };
        let synth = CliffordSynthesizer::new(2, vec![(0, 1)], config);
        let results = synth.synthesize(&initial, &target).unwrap();

        assert!(results.sat);
        assert_eq!(results.two_qubit_gates, 1);
        assert_eq!(results.gates, 1);
    }

    #[test]
    fn mismatched_qubit_counts_are_rejected() {
        let initial = Tableau::new(1, false);
        let target = Tableau::new(2, false);
        let synth = CliffordSynthesizer::new(1, Vec::new(), SynthesisConfig::default());
        assert!(matches!(synth.synthesize(&initial, &target), Err(SynthError::TableauMismatch(_))));
    }

    #[test]
    fn fidelity_target_without_max_sat_is_rejected() {
        let initial = Tableau::new(1, false);
        let target = initial.clone();
        let config = SynthesisConfig {
            target: ObjectiveTarget::Fidelity,
            use_max_sat: false,
            ..SynthesisConfig::default()
        };
        let synth = CliffordSynthesizer::new(1, Vec::new(), config);
        assert!(matches!(synth.synthesize(&initial, &target), Err(SynthError::UnsupportedOperation(_))));
    }

    #[test]
    fn redundant_self_cancelling_gates_are_dropped() {
        // H;H is the identity, so even if the solver were to emit it the
        // redundant-gate pass must collapse it away; here we test the
        // pass directly against a hand-built "solution" rather than
        // relying on the solver choosing a suboptimal model.
        let initial = Tableau::new(1, false);
        let config = SynthesisConfig::default();
        let synth = CliffordSynthesizer::new(1, Vec::new(), config);

        let mut results = SynthesisResults::unsat(ObjectiveTarget::Gates);
        results.circuit = vec![Op::H(0), Op::H(0), Op::S(0)];
        results.gates = 3;
        results.depth = 3;
        results.sat = true;

        synth.remove_redundant_gates(&initial, &mut results).unwrap();
        assert_eq!(results.circuit, vec![Op::S(0)]);
        assert_eq!(results.gates, 1);
        assert_eq!(results.redundant_gates_removed, 2);
    }

    #[test]
    fn heuristic_synthesis_matches_single_shot_on_one_qubit() {
        let initial = Tableau::new(1, false);
        let layers = vec![vec![Op::H(0)], vec![Op::S(0)], vec![Op::H(0)]];

        let config = SynthesisConfig {
            target: ObjectiveTarget::Gates,
            split_size: 1,
            n_threads: 2,
            timeout: Duration::from_secs(10),
            ..SynthesisConfig::default()
        };
        let synth = CliffordSynthesizer::new(1, Vec::new(), config);
        let results = synth.synthesize_heuristic(&initial, &layers).unwrap();

        assert!(results.sat);
        assert!(!results.timeout);

        let mut replay = initial.clone();
        for &op in &results.circuit {
            replay.apply_gate(op).unwrap();
        }
        let mut expected = initial.clone();
        for layer in &layers {
            for &op in layer {
                expected.apply_gate(op).unwrap();
            }
        }
        assert_eq!(replay, expected);
    }

    #[test]
    fn heuristic_synthesis_with_single_segment_degrades_to_plain_synthesize() {
        let initial = Tableau::new(1, false);
        let layers = vec![vec![Op::H(0)], vec![Op::H(0)]];

        let config = SynthesisConfig {
            target: ObjectiveTarget::Gates,
            split_size: 10,
            timeout: Duration::from_secs(10),
            ..SynthesisConfig::default()
        };
        let synth = CliffordSynthesizer::new(1, Vec::new(), config);
        let results = synth.synthesize_heuristic(&initial, &layers).unwrap();

        // H;H is the identity: the single-shot path should collapse it to
        // zero gates via the redundant-gate pass.
        assert!(results.sat);
        assert_eq!(results.gates, 0);
    }

    #[test]
    fn heuristic_synthesis_is_independent_of_thread_count() {
        let initial = Tableau::new(2, false);
        let layers = vec![
            vec![Op::H(0)],
            vec![Op::Cx(0, 1)],
            vec![Op::S(1)],
            vec![Op::H(0)],
        ];

        let run_with = |n_threads: u32| {
            let config = SynthesisConfig {
                target: ObjectiveTarget::Gates,
                split_size: 2,
                n_threads,
                timeout: Duration::from_secs(10),
                ..SynthesisConfig::default()
            };
            let synth = CliffordSynthesizer::new(2, vec![(0, 1), (1, 0)], config);
            synth.synthesize_heuristic(&initial, &layers).unwrap()
        };

        let single_threaded = run_with(1);
        let multi_threaded = run_with(4);

        assert!(single_threaded.sat);
        assert!(multi_threaded.sat);
        assert_eq!(single_threaded.circuit, multi_threaded.circuit);
    }

    #[test]
    fn heuristic_synthesis_on_empty_layer_list_is_trivially_satisfied() {
        let initial = Tableau::new(2, false);
        let synth = CliffordSynthesizer::new(2, Vec::new(), SynthesisConfig::default());
        let results = synth.synthesize_heuristic(&initial, &[]).unwrap();
        assert!(results.sat);
        assert_eq!(results.gates, 0);
    }

    #[test]
    fn concatenate_segment_results_sums_metrics_in_order() {
        let mut a = SynthesisResults::unsat(ObjectiveTarget::Gates);
        a.sat = true;
        a.gates = 2;
        a.circuit = vec![Op::H(0)];
        let mut b = SynthesisResults::unsat(ObjectiveTarget::Gates);
        b.sat = true;
        b.gates = 1;
        b.circuit = vec![Op::S(0)];

        let combined = concatenate_segment_results(vec![a, b]);
        assert_eq!(combined.gates, 3);
        assert_eq!(combined.circuit, vec![Op::H(0), Op::S(0)]);
        assert!(combined.sat);
    }

    #[test]
    fn line_coupling_helper_is_bidirectional() {
        assert_eq!(line_coupling(3).len(), 4);
    }
}
