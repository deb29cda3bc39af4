//! Early-termination criteria that bound A\* search effort below full
//! exhaustion, trading optimality guarantees for bounded runtime on large
//! or poorly-connected layers.

use serde::{Deserialize, Serialize};

/// A selectable early-termination rule. Each variant counts a different
/// event and stops the search once the configured limit is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EarlyTermination {
    /// Stop after expanding `n` nodes total, regardless of whether a
    /// solution has been found.
    ExpandedNodes(usize),
    /// Stop after expanding `n` nodes counted from the first valid mapping
    /// found (whether or not it was improved upon since).
    ExpandedNodesAfterFirstSolution(usize),
    /// Stop after expanding `n` nodes counted from the most recent
    /// improvement to the best valid mapping found so far.
    ExpandedNodesAfterCurrentOptimalSolution(usize),
    /// Stop after finding `n` valid-mapping (goal) nodes in total.
    SolutionNodes(usize),
    /// Stop after finding `n` valid-mapping nodes counted from the most
    /// recent improvement to the best one found so far.
    SolutionNodesAfterCurrentOptimalSolution(usize),
}

/// Running counters the router updates as it pops/expands nodes, used to
/// evaluate an [`EarlyTermination`] criterion.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchProgress {
    pub expanded: usize,
    pub solutions_found: usize,
    expanded_at_first_solution: Option<usize>,
    expanded_at_best_solution: Option<usize>,
    solutions_at_best_solution: usize,
    best_cost: Option<f64>,
}

impl SearchProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_expansion(&mut self) {
        self.expanded += 1;
    }

    /// Records a freshly popped valid-mapping node with the given total
    /// cost, updating the "first solution" and "current optimal" markers.
    pub fn record_solution(&mut self, cost: f64) {
        self.solutions_found += 1;
        if self.expanded_at_first_solution.is_none() {
            self.expanded_at_first_solution = Some(self.expanded);
        }
        if self.best_cost.is_none_or(|best| cost < best) {
            self.best_cost = Some(cost);
            self.expanded_at_best_solution = Some(self.expanded);
            self.solutions_at_best_solution = self.solutions_found;
        }
    }

    /// Whether `criterion` says the search should stop now.
    #[must_use]
    pub fn should_stop(&self, criterion: EarlyTermination) -> bool {
        match criterion {
            EarlyTermination::ExpandedNodes(n) => self.expanded >= n,
            EarlyTermination::ExpandedNodesAfterFirstSolution(n) => self
                .expanded_at_first_solution
                .is_some_and(|at| self.expanded - at >= n),
            EarlyTermination::ExpandedNodesAfterCurrentOptimalSolution(n) => self
                .expanded_at_best_solution
                .is_some_and(|at| self.expanded - at >= n),
            EarlyTermination::SolutionNodes(n) => self.solutions_found >= n,
            EarlyTermination::SolutionNodesAfterCurrentOptimalSolution(n) => {
                self.solutions_found - self.solutions_at_best_solution >= n
                    && self.expanded_at_best_solution.is_some()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expanded_nodes_stops_at_limit() {
        let mut progress = SearchProgress::new();
        for _ in 0..5 {
            progress.record_expansion();
        }
        assert!(progress.should_stop(EarlyTermination::ExpandedNodes(5)));
        assert!(!progress.should_stop(EarlyTermination::ExpandedNodes(6)));
    }

    #[test]
    fn expanded_after_first_solution_counts_from_first_find() {
        let mut progress = SearchProgress::new();
        for _ in 0..3 {
            progress.record_expansion();
        }
        progress.record_solution(10.0);
        for _ in 0..2 {
            progress.record_expansion();
        }
        assert!(!progress.should_stop(EarlyTermination::ExpandedNodesAfterFirstSolution(3)));
        progress.record_expansion();
        assert!(progress.should_stop(EarlyTermination::ExpandedNodesAfterFirstSolution(3)));
    }

    #[test]
    fn solution_nodes_stops_after_n_solutions() {
        let mut progress = SearchProgress::new();
        progress.record_solution(5.0);
        progress.record_solution(4.0);
        assert!(progress.should_stop(EarlyTermination::SolutionNodes(2)));
        assert!(!progress.should_stop(EarlyTermination::SolutionNodes(3)));
    }

    #[test]
    fn after_current_optimal_resets_on_improvement() {
        let mut progress = SearchProgress::new();
        progress.record_solution(10.0);
        progress.record_expansion();
        progress.record_expansion();
        progress.record_solution(5.0); // improves best; resets counter
        assert!(!progress.should_stop(EarlyTermination::ExpandedNodesAfterCurrentOptimalSolution(1)));
        progress.record_expansion();
        assert!(progress.should_stop(EarlyTermination::ExpandedNodesAfterCurrentOptimalSolution(1)));
    }
}
