//! Critical-path estimation.

use crate::graph::StepGraph;
use recovery_core::StepId;
use serde::Serialize;
use std::collections::HashMap;

const COST_TOLERANCE: f64 = 1e-9;

/// The maximum-cost chain of dependent steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CriticalPath {
    /// Steps from first to last
    pub steps: Vec<StepId>,
    /// Sum of `duration_seconds + criticality` along the path
    pub cost: f64,
}

impl CriticalPath {
    /// Whether no path could be computed.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl StepGraph {
    /// Longest cumulative cost ending at each step, or `None` when the graph
    /// cannot be fully ordered.
    pub fn longest_costs(&self) -> Option<HashMap<StepId, f64>> {
        let order = self.topological_order();
        if order.len() < self.len() {
            return None;
        }

        let mut longest: HashMap<StepId, f64> = HashMap::with_capacity(order.len());
        for id in &order {
            let upstream = self
                .dependencies(id)
                .iter()
                .filter_map(|d| longest.get(d).copied())
                .fold(0.0, f64::max);
            longest.insert(id.clone(), self.cost(id) + upstream);
        }
        Some(longest)
    }

    /// Compute the critical path. Empty for cyclic or empty graphs.
    ///
    /// The path is rebuilt backwards from the first step holding the global
    /// maximum, each time following the dependency whose longest cost plus the
    /// current step's own cost accounts for the current longest cost.
    pub fn critical_path(&self) -> CriticalPath {
        let Some(longest) = self.longest_costs() else {
            return CriticalPath::default();
        };

        let mut end: Option<(&StepId, f64)> = None;
        for id in self.ids() {
            let value = longest.get(id).copied().unwrap_or(0.0);
            if end.map_or(true, |(_, best)| value > best) {
                end = Some((id, value));
            }
        }
        let Some((mut current, total)) = end else {
            return CriticalPath::default();
        };

        let mut steps = vec![current.clone()];
        loop {
            let remaining = longest.get(current).copied().unwrap_or(0.0) - self.cost(current);
            let previous = self.dependencies(current).iter().find(|d| {
                let value = longest.get(*d).copied().unwrap_or(0.0);
                (value - remaining).abs() <= COST_TOLERANCE * remaining.abs().max(1.0)
            });
            match previous {
                Some(dependency) => {
                    steps.push(dependency.clone());
                    current = dependency;
                }
                None => break,
            }
        }
        steps.reverse();

        CriticalPath { steps, cost: total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recovery_core::CoordinationStep;

    fn id(s: &str) -> StepId {
        StepId::new(s).unwrap()
    }

    fn step(name: &str, duration: u64, requires: &[&str]) -> CoordinationStep {
        requires
            .iter()
            .fold(CoordinationStep::new(id(name), name, duration), |s, dep| s.requiring(id(dep)))
    }

    #[test]
    fn test_diamond_critical_path() {
        let graph = StepGraph::build(&[
            step("A", 5, &[]),
            step("B", 10, &["A"]),
            step("C", 8, &["A"]),
            step("D", 3, &["B", "C"]),
        ]);
        let path = graph.critical_path();
        assert_eq!(path.steps, vec![id("A"), id("B"), id("D")]);
        assert_eq!(path.cost, 18.0);
    }

    #[test]
    fn test_follows_actual_edge_cost() {
        // Non-unit costs where a unit-decrement walk would pick the wrong branch
        let graph = StepGraph::build(&[
            step("A", 100, &[]),
            step("B", 1, &[]),
            step("C", 7, &["B", "A"]),
        ]);
        let path = graph.critical_path();
        assert_eq!(path.steps, vec![id("A"), id("C")]);
        assert_eq!(path.cost, 107.0);
    }

    #[test]
    fn test_criticality_adds_to_cost() {
        let graph = StepGraph::build(&[
            step("A", 5, &[]),
            step("B", 10, &["A"]),
            step("C", 8, &["A"]).with_criticality(4.0),
            step("D", 3, &["B", "C"]),
        ]);
        let path = graph.critical_path();
        assert_eq!(path.steps, vec![id("A"), id("C"), id("D")]);
        assert_eq!(path.cost, 20.0);
    }

    #[test]
    fn test_cycle_yields_empty_path() {
        let graph = StepGraph::build(&[step("X", 1, &["Y"]), step("Y", 1, &["X"])]);
        assert!(graph.critical_path().is_empty());
        assert!(graph.longest_costs().is_none());
    }

    #[test]
    fn test_independent_steps_pick_most_expensive() {
        let graph = StepGraph::build(&[step("A", 5, &[]), step("B", 9, &[]), step("C", 9, &[])]);
        let path = graph.critical_path();
        assert_eq!(path.steps, vec![id("B")]);
        assert_eq!(path.cost, 9.0);
    }
}
