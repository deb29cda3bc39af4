//! Pass manager for orchestrating compilation.

use tracing::{debug, info, instrument};

use arvak_arch::Architecture;
use arvak_ir::CircuitDag;

use crate::error::CompileResult;
use crate::mapping::HeuristicMappingPass;
use crate::pass::Pass;
use crate::passes::MeasurementBarrierVerification;
use crate::property::PropertySet;

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given DAG.
    #[instrument(skip(self, dag, properties))]
    pub fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            dag.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(dag, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(dag, properties)?;
                // Avoid calling dag.depth() here — it performs a full topological
                // sort (O(V+E)) on every pass and is only used for debug logging.
                debug!("Pass {} completed, ops: {}", pass.name(), dag.num_ops());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, final depth: {}, ops: {}",
            dag.depth(),
            dag.num_ops()
        );

        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating pass managers wired around the heuristic qubit
/// mapper.
///
/// Assembles, in order: caller-supplied pre-mapping passes (gated by
/// `pre_mapping_optimizations`), [`HeuristicMappingPass`] (only if a
/// target architecture was supplied), caller-supplied post-mapping passes
/// (gated by `post_mapping_optimizations`), and a final measurement-barrier
/// verification pass (gated by `verify`).
///
/// This builder carries no built-in optimization *policy*: peephole
/// optimization is out of core scope. The two `*_optimizations` flags and
/// `with_pre_mapping_pass`/`with_post_mapping_pass` are hook slots: a caller
/// supplies its own [`Pass`] impls, or leaves the hooks empty and gets
/// mapping-only compilation.
pub struct PassManagerBuilder {
    pre_mapping_optimizations: bool,
    post_mapping_optimizations: bool,
    verify: bool,
    pre_mapping_passes: Vec<Box<dyn Pass>>,
    post_mapping_passes: Vec<Box<dyn Pass>>,
    mapping_config: crate::mapping::HeuristicMappingPass,
    /// Target properties.
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings: no optimization hooks
    /// populated, verification on, mapping pass added once a target is set.
    pub fn new() -> Self {
        Self {
            pre_mapping_optimizations: false,
            post_mapping_optimizations: false,
            verify: true,
            pre_mapping_passes: Vec::new(),
            post_mapping_passes: Vec::new(),
            mapping_config: HeuristicMappingPass::default(),
            properties: PropertySet::new(),
        }
    }

    /// Toggle whether pre-mapping hook passes (see
    /// [`Self::with_pre_mapping_pass`]) run at all. No-op if none were
    /// registered.
    #[must_use]
    pub fn pre_mapping_optimizations(mut self, enabled: bool) -> Self {
        self.pre_mapping_optimizations = enabled;
        self
    }

    /// Toggle whether post-mapping hook passes (see
    /// [`Self::with_post_mapping_pass`]) run at all. No-op if none were
    /// registered.
    #[must_use]
    pub fn post_mapping_optimizations(mut self, enabled: bool) -> Self {
        self.post_mapping_optimizations = enabled;
        self
    }

    /// Toggle the final [`MeasurementBarrierVerification`] analysis pass.
    #[must_use]
    pub fn verify(mut self, enabled: bool) -> Self {
        self.verify = enabled;
        self
    }

    /// Register a pass to run before mapping, if
    /// [`Self::pre_mapping_optimizations`] is enabled. The core ships no
    /// built-in pre-mapping pass; this is purely a hook.
    #[must_use]
    pub fn with_pre_mapping_pass(mut self, pass: impl Pass + 'static) -> Self {
        self.pre_mapping_passes.push(Box::new(pass));
        self
    }

    /// Register a pass to run after mapping, if
    /// [`Self::post_mapping_optimizations`] is enabled. The core ships no
    /// built-in post-mapping pass; this is purely a hook.
    #[must_use]
    pub fn with_post_mapping_pass(mut self, pass: impl Pass + 'static) -> Self {
        self.post_mapping_passes.push(Box::new(pass));
        self
    }

    /// Set the target properties.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// Set the target architecture to map onto.
    #[must_use]
    pub fn with_target(mut self, architecture: Architecture) -> Self {
        self.properties.architecture = Some(architecture);
        self
    }

    /// Configure the heuristic mapping pass itself (router config, layerer).
    #[must_use]
    pub fn with_mapping_pass(mut self, pass: crate::mapping::HeuristicMappingPass) -> Self {
        self.mapping_config = pass;
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();

        if self.pre_mapping_optimizations {
            for pass in self.pre_mapping_passes {
                pm.add_boxed_pass(pass);
            }
        }

        if self.properties.architecture.is_some() {
            pm.add_pass(self.mapping_config);
        }

        if self.post_mapping_optimizations {
            for pass in self.post_mapping_passes {
                pm.add_boxed_pass(pass);
            }
        }

        if self.verify {
            pm.add_pass(MeasurementBarrierVerification);
        }

        (pm, self.properties)
    }
}

impl PassManager {
    fn add_boxed_pass(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
