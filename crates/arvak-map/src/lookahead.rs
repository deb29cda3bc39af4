//! Lookahead penalty: a depreciated estimate of how much a candidate layout
//! will cost the *next* few layers, not just the one currently being routed.
//!
//! Without lookahead the router can walk into a layout that is locally
//! optimal for the current layer but expensive to recover from for the one
//! right after it. The penalty is folded into [`crate::node::SearchNode::total_cost`]
//! so the frontier ranks nodes by a cost that looks slightly ahead of the
//! immediate goal.

use arvak_arch::Architecture;

use crate::heuristic::Heuristic;
use crate::layer::Layer;

/// How many future layers to examine, and how their heuristic cost is
/// discounted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookaheadConfig {
    /// Number of layers after the one currently being routed to examine.
    pub depth: usize,
    /// Per-layer depreciation factor applied multiplicatively per step of
    /// distance into the future; `0.5` halves each subsequent layer's
    /// contribution.
    pub depreciation: f64,
}

impl LookaheadConfig {
    #[must_use]
    pub fn new(depth: usize, depreciation: f64) -> Self {
        Self { depth, depreciation }
    }

    /// No lookahead: only the current layer matters.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            depth: 0,
            depreciation: 1.0,
        }
    }
}

/// Computes the depreciated sum of `heuristic`'s estimate on each of the
/// next `config.depth` layers following the one currently being routed,
/// evaluated against the same candidate `layout` (future layers don't get
/// their own SWAPs in this estimate, only a projection of present cost).
#[must_use]
pub fn penalty(
    config: LookaheadConfig,
    heuristic: Heuristic,
    arch: &Architecture,
    layout: &[u32],
    future_layers: &[Layer],
) -> f64 {
    let mut total = 0.0;
    let mut weight = config.depreciation;
    for layer in future_layers.iter().take(config.depth) {
        total += weight * heuristic.estimate(arch, layout, layer);
        weight *= config.depreciation;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(n: u32) -> Architecture {
        Architecture::new(n, (0..n - 1).map(|i| (i, i + 1)).collect())
    }

    #[test]
    fn disabled_config_contributes_nothing() {
        let arch = linear(4);
        let layout = vec![0, 1, 2, 3];
        let layers = vec![Layer::from_gates(vec![(0, 3)])];
        let p = penalty(
            LookaheadConfig::disabled(),
            Heuristic::GateCountMaxDistance,
            &arch,
            &layout,
            &layers,
        );
        assert_eq!(p, 0.0);
    }

    #[test]
    fn later_layers_contribute_less() {
        let arch = linear(5);
        let layout = vec![0, 1, 2, 3, 4];
        let far = Layer::from_gates(vec![(0, 4)]);
        let near_only = penalty(
            LookaheadConfig::new(1, 0.5),
            Heuristic::GateCountMaxDistance,
            &arch,
            &layout,
            std::slice::from_ref(&far),
        );
        let two_deep = penalty(
            LookaheadConfig::new(2, 0.5),
            Heuristic::GateCountMaxDistance,
            &arch,
            &layout,
            &[Layer::from_gates(vec![]), far],
        );
        assert!(two_deep < near_only);
    }

    #[test]
    fn depth_limits_how_many_future_layers_are_examined() {
        let arch = linear(5);
        let layout = vec![0, 1, 2, 3, 4];
        let layers = vec![
            Layer::from_gates(vec![(0, 4)]),
            Layer::from_gates(vec![(0, 4)]),
            Layer::from_gates(vec![(0, 4)]),
        ];
        let shallow = penalty(
            LookaheadConfig::new(1, 1.0),
            Heuristic::GateCountMaxDistance,
            &arch,
            &layout,
            &layers,
        );
        let deep = penalty(
            LookaheadConfig::new(3, 1.0),
            Heuristic::GateCountMaxDistance,
            &arch,
            &layout,
            &layers,
        );
        assert!(deep > shallow);
    }
}
