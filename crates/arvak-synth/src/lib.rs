//! SAT-based Clifford circuit synthesizer: encodes "is there a Clifford
//! circuit of at most `T` timesteps taking tableau `A` to tableau `B`" as a
//! bounded Boolean satisfiability problem and drives z3 to find the
//! smallest (or cheapest, under a fidelity weighting) such `T`.
//!
//! ```
//! use arvak_synth::{CliffordSynthesizer, SynthesisConfig};
//! use arvak_tableau::{CliffordOp, Tableau};
//!
//! let initial = Tableau::new(1, false);
//! let mut target = initial.clone();
//! target.apply_gate(CliffordOp::H(0)).unwrap();
//!
//! let synth = CliffordSynthesizer::new(1, Vec::new(), SynthesisConfig::default());
//! let results = synth.synthesize(&initial, &target).unwrap();
//! assert!(results.sat);
//! assert_eq!(results.gates, 1);
//! ```

pub mod cardinality;
pub mod clifford_gate;
pub mod error;
pub mod gate_encoder;
pub mod objective_encoder;
pub mod results;
pub mod solver;
pub mod synthesizer;
pub mod tableau_encoder;

pub use cardinality::{CardinalityEncoding, CommanderGrouping};
pub use clifford_gate::SingleGate;
pub use error::{SynthError, SynthResult};
pub use gate_encoder::{GateVars, TimestepEncoding};
pub use objective_encoder::ObjectiveTarget;
pub use results::{BoundProbe, SynthesisResults};
pub use solver::SolveOutcome;
pub use synthesizer::{CliffordSynthesizer, SynthesisConfig};
pub use tableau_encoder::TableauVars;
