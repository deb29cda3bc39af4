//! Heuristic Qubit Mapper: turns a stream of logical two-qubit interactions
//! into a physical layout and a sequence of SWAPs that make each layer's
//! gates executable on a given [`arvak_arch::Architecture`], via a
//! layer-by-layer A\* best-first search.
//!
//! ```
//! use arvak_arch::Architecture;
//! use arvak_map::layer::{LayerOp, LayeringPolicy, Layerer};
//! use arvak_map::router::{AStarRouter, RouterConfig};
//!
//! let arch = Architecture::new(3, vec![(0, 1), (1, 0), (1, 2), (2, 1)]);
//! let layerer = Layerer::new(LayeringPolicy::DisjointQubits, None);
//! let router = AStarRouter::new(RouterConfig::default(), layerer);
//! let result = router.route(&arch, 3, &[LayerOp::Two(0, 2)]).unwrap();
//! assert!(arch.is_connected(result.final_locations[0], result.final_locations[2]));
//! ```

pub mod early_termination;
pub mod error;
pub mod frontier;
pub mod heuristic;
pub mod initial_layout;
pub mod layer;
pub mod lookahead;
pub mod node;
pub mod results;
pub mod router;

pub use early_termination::{EarlyTermination, SearchProgress};
pub use error::{MapError, MapResult};
pub use frontier::PriorityFrontier;
pub use heuristic::Heuristic;
pub use initial_layout::InitialLayoutPolicy;
pub use layer::{GateRef, Layer, LayerOp, LayeringPolicy, Layerer};
pub use lookahead::LookaheadConfig;
pub use node::SearchNode;
pub use results::{LayerReport, Report, RoutingResult};
pub use router::{AStarRouter, RouterConfig};
