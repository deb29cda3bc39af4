//! Hardware architecture model: coupling graph, distance tables, and
//! fidelity-aware cost model shared by the qubit mapper and the Clifford
//! synthesizer.
//!
//! ```
//! use arvak_arch::Architecture;
//!
//! let arch = Architecture::new(3, vec![(0, 1), (1, 2)]);
//! assert_eq!(arch.distance(0, 2), Some(2));
//! assert_eq!(arch.shortest_path(0, 2), Some(vec![0, 1, 2]));
//! ```

pub mod architecture;
pub mod error;
pub mod properties;

pub use architecture::{
    Architecture, COST_BIDIRECTIONAL_SWAP, COST_CNOT_GATE, COST_DIRECTION_REVERSE,
    COST_SINGLE_QUBIT_GATE, COST_UNIDIRECTIONAL_SWAP,
};
pub use error::{ArchError, ArchResult};
pub use properties::{EdgeCalibration, Properties, QubitCalibration};
