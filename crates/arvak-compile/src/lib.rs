//! Arvak Compilation Glue
//!
//! This crate wires the Heuristic Qubit Mapper (`arvak-map`) onto a circuit
//! IR (`arvak-ir`) via a small pass-based framework, similar in spirit to
//! LLVM's `PassManager` but deliberately thin: it owns exactly one built-in
//! transformation (mapping) and one built-in analysis (measurement-boundary
//! verification). Everything else — peephole optimization, basis
//! translation — is a hook a caller fills in, not a policy this crate
//! ships.
//!
//! # Overview
//!
//! The compilation process threads a circuit through a sequence of passes
//! that share state via a [`PropertySet`]:
//! 1. **Pre-mapping hooks** (optional, caller-supplied): any DAG-level
//!    rewrite that should happen before physical qubits are assigned.
//! 2. **Mapping**: [`mapping::HeuristicMappingPass`] assigns physical
//!    qubits and inserts SWAPs to satisfy the target's connectivity.
//! 3. **Post-mapping hooks** (optional, caller-supplied): any DAG-level
//!    rewrite that should happen after physical qubits are fixed.
//! 4. **Verification**: [`passes::MeasurementBarrierVerification`] checks
//!    that measurement ordering was preserved through the above.
//!
//! # Architecture
//!
//! ```text
//! Input Circuit (logical qubits)
//!       │
//!       ▼
//! ┌─────────────┐
//! │ PassManager │ ◄── PropertySet (architecture, layout, routing_result)
//! └─────────────┘
//!       │
//!       ├── pre-mapping hooks (caller-supplied, off by default)
//!       ├── HeuristicMappingPass (A* routing onto the target architecture)
//!       ├── post-mapping hooks (caller-supplied, off by default)
//!       └── MeasurementBarrierVerification
//!       │
//!       ▼
//! Output Circuit (physical qubits)
//! ```
//!
//! # Example: Basic Compilation
//!
//! ```rust
//! use arvak_compile::PassManagerBuilder;
//! use arvak_arch::Architecture;
//! use arvak_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell", 2, 0);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! let (pm, mut props) = PassManagerBuilder::new()
//!     .with_target(Architecture::new(2, vec![(0, 1), (1, 0)]))
//!     .build();
//!
//! let mut dag = circuit.into_dag();
//! pm.run(&mut dag, &mut props).unwrap();
//!
//! assert!(props.routing_result.is_some());
//! ```
//!
//! # Built-in Passes
//!
//! - [`mapping::HeuristicMappingPass`]: routes a logical circuit onto a
//!   target [`arvak_arch::Architecture`] using `arvak-map`'s A* mapper.
//! - [`passes::MeasurementBarrierVerification`]: analysis pass confirming
//!   measurement ordering survived prior passes.
//!
//! Peephole optimization (gate cancellation, 1-qubit gate merging, basis
//! translation) ships no built-in pass here; see
//! [`manager::PassManagerBuilder::with_pre_mapping_pass`] and
//! [`manager::PassManagerBuilder::with_post_mapping_pass`].
//!
//! # Custom Passes
//!
//! Implement the [`Pass`] trait to create custom compilation passes:
//!
//! ```rust
//! use arvak_compile::{Pass, PassKind, CompileResult, PropertySet};
//! use arvak_ir::CircuitDag;
//!
//! struct MyCustomPass;
//!
//! impl Pass for MyCustomPass {
//!     fn name(&self) -> &str { "my_custom_pass" }
//!     fn kind(&self) -> PassKind { PassKind::Transformation }
//!
//!     fn run(&self, dag: &mut CircuitDag, props: &mut PropertySet) -> CompileResult<()> {
//!         // Your pass logic here
//!         let _ = (dag, props);
//!         Ok(())
//!     }
//! }
//! ```

pub mod error;
pub mod manager;
pub mod mapping;
pub mod pass;
pub mod property;

// Built-in passes
pub mod passes;

pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use mapping::HeuristicMappingPass;
pub use pass::{AnalysisPass, Pass, PassKind, TransformationPass};
pub use passes::{MeasurementBarrierVerification, VerificationResult};
pub use property::{Layout, PropertySet};
