//! Longest-path layering into execution waves.

use crate::graph::StepGraph;
use recovery_core::StepId;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Layer assigned to a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerAssignment {
    /// Step
    pub step_id: StepId,
    /// Zero-based wave index
    pub layer: usize,
}

impl StepGraph {
    /// Assign every step `1 + max(layer of its dependencies)`, or 0 without dependencies.
    ///
    /// A dependency that is still being visited counts as layer 0. That only
    /// keeps the walk finite on cyclic graphs; layers of steps on a cycle
    /// carry no meaning.
    pub fn execution_layers(&self) -> Vec<LayerAssignment> {
        let mut memo: HashMap<&StepId, usize> = HashMap::new();
        let mut visiting: HashSet<&StepId> = HashSet::new();

        for root in self.ids() {
            if memo.contains_key(root) {
                continue;
            }

            visiting.insert(root);
            let mut frames: Vec<(&StepId, usize)> = vec![(root, 0)];

            while let Some(&(node, next)) = frames.last() {
                let dependencies = self.dependencies(node);

                if let Some(dependency) = dependencies.get(next) {
                    if let Some(top) = frames.last_mut() {
                        top.1 += 1;
                    }
                    if !memo.contains_key(dependency) && visiting.insert(dependency) {
                        frames.push((dependency, 0));
                    }
                    continue;
                }

                let layer = dependencies
                    .iter()
                    .map(|d| memo.get(d).copied().unwrap_or(0) + 1)
                    .max()
                    .unwrap_or(0);
                memo.insert(node, layer);
                visiting.remove(node);
                frames.pop();
            }
        }

        self.ids()
            .iter()
            .map(|id| LayerAssignment {
                step_id: id.clone(),
                layer: memo.get(id).copied().unwrap_or(0),
            })
            .collect()
    }

    /// Group step ids by layer, each wave in input order.
    pub fn execution_waves(&self) -> Vec<Vec<StepId>> {
        waves_from_layers(&self.execution_layers())
    }
}

/// Group layer assignments into waves indexed by layer.
pub fn waves_from_layers(layers: &[LayerAssignment]) -> Vec<Vec<StepId>> {
    let depth = layers.iter().map(|l| l.layer + 1).max().unwrap_or(0);
    let mut waves = vec![Vec::new(); depth];
    for assignment in layers {
        waves[assignment.layer].push(assignment.step_id.clone());
    }
    waves
}

#[cfg(test)]
mod tests {
    use super::*;
    use recovery_core::CoordinationStep;

    fn id(s: &str) -> StepId {
        StepId::new(s).unwrap()
    }

    fn step(name: &str, requires: &[&str]) -> CoordinationStep {
        requires
            .iter()
            .fold(CoordinationStep::new(id(name), name, 10), |s, dep| s.requiring(id(dep)))
    }

    fn layer_of(layers: &[LayerAssignment], name: &str) -> usize {
        layers.iter().find(|l| l.step_id == id(name)).map(|l| l.layer).unwrap()
    }

    #[test]
    fn test_diamond_layers() {
        let graph = StepGraph::build(&[
            step("A", &[]),
            step("B", &["A"]),
            step("C", &["A"]),
            step("D", &["B", "C"]),
        ]);
        let layers = graph.execution_layers();
        assert_eq!(layer_of(&layers, "A"), 0);
        assert_eq!(layer_of(&layers, "B"), 1);
        assert_eq!(layer_of(&layers, "C"), 1);
        assert_eq!(layer_of(&layers, "D"), 2);

        let waves = graph.execution_waves();
        assert_eq!(waves, vec![vec![id("A")], vec![id("B"), id("C")], vec![id("D")]]);
    }

    #[test]
    fn test_longest_path_wins() {
        // D depends on A directly and through B -> C
        let graph = StepGraph::build(&[
            step("D", &["A", "C"]),
            step("C", &["B"]),
            step("B", &["A"]),
            step("A", &[]),
        ]);
        let layers = graph.execution_layers();
        assert_eq!(layer_of(&layers, "D"), 3);
        assert_eq!(layers[0].step_id, id("D"));
    }

    #[test]
    fn test_cycle_terminates() {
        let graph = StepGraph::build(&[step("X", &["Y"]), step("Y", &["X"])]);
        let layers = graph.execution_layers();
        assert_eq!(layers.len(), 2);
    }

    #[test]
    fn test_empty_graph_has_no_waves() {
        assert!(StepGraph::build(&[]).execution_waves().is_empty());
    }
}
