//! Step dependency graph.

use recovery_core::{CoordinationStep, StepId};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::warn;

/// Dependency links of a single step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepNode {
    /// Resolvable steps this one requires
    pub dependencies: Vec<StepId>,
    /// Steps that require this one
    pub dependents: Vec<StepId>,
}

/// A resolved `dependency -> step` edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TopologyEdge {
    /// Step that must finish first
    pub from: StepId,
    /// Step that waits on `from`
    pub to: StepId,
}

impl std::fmt::Display for TopologyEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

/// A dependency id that names no step in the program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingDependency {
    /// Step declaring the dependency
    pub step: StepId,
    /// Unknown dependency id
    pub missing: StepId,
}

/// Directed graph built from step dependencies.
///
/// Dangling dependency ids are kept out of the graph; they never block
/// ordering and are only reported through [`StepGraph::dangling_dependencies`].
#[derive(Debug, Clone, Default)]
pub struct StepGraph {
    /// Step ids in input order
    order: Vec<StepId>,
    /// step -> links
    nodes: HashMap<StepId, StepNode>,
    /// step -> duration + criticality
    costs: HashMap<StepId, f64>,
    /// Resolved edges in declaration order
    edges: Vec<TopologyEdge>,
    /// Unresolvable dependencies
    dangling: Vec<DanglingDependency>,
}

impl StepGraph {
    /// Build the graph. Later steps reusing an id are ignored.
    pub fn build(steps: &[CoordinationStep]) -> Self {
        let mut graph = StepGraph::default();

        for step in steps {
            if graph.nodes.contains_key(&step.id) {
                warn!(step = %step.id, "duplicate step id ignored");
                continue;
            }
            graph.order.push(step.id.clone());
            graph.nodes.insert(step.id.clone(), StepNode::default());
            graph.costs.insert(step.id.clone(), step.cost());
        }

        // Only the first occurrence of an id contributes edges
        let mut linked: HashSet<&StepId> = HashSet::new();
        for step in steps {
            if !linked.insert(&step.id) {
                continue;
            }
            for dependency in &step.requires {
                if !graph.nodes.contains_key(dependency) {
                    graph.dangling.push(DanglingDependency {
                        step: step.id.clone(),
                        missing: dependency.clone(),
                    });
                    continue;
                }
                let already_linked = graph
                    .nodes
                    .get(&step.id)
                    .is_some_and(|n| n.dependencies.contains(dependency));
                if already_linked {
                    continue;
                }
                if let Some(node) = graph.nodes.get_mut(&step.id) {
                    node.dependencies.push(dependency.clone());
                }
                if let Some(node) = graph.nodes.get_mut(dependency) {
                    node.dependents.push(step.id.clone());
                }
                graph.edges.push(TopologyEdge {
                    from: dependency.clone(),
                    to: step.id.clone(),
                });
            }
        }

        graph
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the graph has no steps.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Step ids in input order.
    pub fn ids(&self) -> &[StepId] {
        &self.order
    }

    /// Whether a step id is known.
    pub fn contains(&self, id: &StepId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Links of a step.
    pub fn node(&self, id: &StepId) -> Option<&StepNode> {
        self.nodes.get(id)
    }

    /// Resolvable dependencies of a step.
    pub fn dependencies(&self, id: &StepId) -> &[StepId] {
        self.nodes.get(id).map(|n| n.dependencies.as_slice()).unwrap_or(&[])
    }

    /// Steps requiring this one.
    pub fn dependents(&self, id: &StepId) -> &[StepId] {
        self.nodes.get(id).map(|n| n.dependents.as_slice()).unwrap_or(&[])
    }

    /// Scheduling cost of a step, zero when unknown.
    pub fn cost(&self, id: &StepId) -> f64 {
        self.costs.get(id).copied().unwrap_or(0.0)
    }

    /// Resolved edges.
    pub fn edges(&self) -> &[TopologyEdge] {
        &self.edges
    }

    /// Dependencies that named unknown steps.
    pub fn dangling_dependencies(&self) -> &[DanglingDependency] {
        &self.dangling
    }

    /// Kahn's algorithm over resolvable dependencies.
    ///
    /// Steps are discovered in input order. A result shorter than
    /// [`StepGraph::len`] means the graph holds a cycle and must not be
    /// scheduled.
    pub fn topological_order(&self) -> Vec<StepId> {
        let mut in_degree: HashMap<&StepId, usize> = self
            .order
            .iter()
            .map(|id| (id, self.dependencies(id).len()))
            .collect();

        let mut ready: VecDeque<&StepId> = self
            .order
            .iter()
            .filter(|id| in_degree.get(id).copied() == Some(0))
            .collect();

        let mut sorted = Vec::with_capacity(self.order.len());
        while let Some(id) = ready.pop_front() {
            sorted.push(id.clone());
            for dependent in self.dependents(id) {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        ready.push_back(dependent);
                    }
                }
            }
        }

        sorted
    }
}
