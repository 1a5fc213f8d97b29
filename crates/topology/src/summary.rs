//! Topology summary and validation.

use crate::critical::CriticalPath;
use crate::graph::{DanglingDependency, StepGraph};
use crate::layers::{waves_from_layers, LayerAssignment};
use recovery_core::{CoordinationStep, StepId};
use serde::Serialize;
use tracing::{debug, warn};

/// Errors raised when a topology cannot be scheduled.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TopologyError {
    /// Steps depend on each other in a loop
    #[error("dependency cycle detected: {}", render_path(.0))]
    Cycle(Vec<StepId>),

    /// Steps never became ready during ordering
    #[error("{} step(s) could not be scheduled: {}", .0.len(), render_path(.0))]
    Unscheduled(Vec<StepId>),
}

fn render_path(ids: &[StepId]) -> String {
    ids.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(" -> ")
}

/// Result of analyzing a program's step graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologySummary {
    /// Number of distinct steps
    pub total_nodes: usize,

    /// Topological order; shorter than `total_nodes` when invalid
    pub ordered: Vec<StepId>,

    /// Critical path, empty when cycles exist
    pub critical_path: Vec<StepId>,

    /// Cost of the critical path
    pub critical_cost: f64,

    /// Layer per step, in input order
    pub layers: Vec<LayerAssignment>,

    /// Steps grouped by layer
    pub waves: Vec<Vec<StepId>>,

    /// Size of the widest wave
    pub max_depth: usize,

    /// Detected cycles
    pub cycles: Vec<Vec<StepId>>,

    /// Number of resolved edges
    pub edge_count: usize,

    /// Dependencies naming unknown steps
    pub dangling: Vec<DanglingDependency>,
}

impl TopologySummary {
    /// Whether the graph can be scheduled.
    pub fn is_valid(&self) -> bool {
        self.cycles.is_empty() && self.ordered.len() == self.total_nodes
    }

    /// Steps missing from the topological order.
    pub fn unscheduled(&self) -> Vec<StepId> {
        self.layers
            .iter()
            .map(|l| &l.step_id)
            .filter(|id| !self.ordered.contains(id))
            .cloned()
            .collect()
    }

    /// Layer of a step, if known.
    pub fn layer_of(&self, id: &StepId) -> Option<usize> {
        self.layers.iter().find(|l| &l.step_id == id).map(|l| l.layer)
    }

    /// Turn an invalid topology into a blocking error.
    pub fn ensure_valid(&self) -> Result<(), TopologyError> {
        if let Some(cycle) = self.cycles.first() {
            return Err(TopologyError::Cycle(cycle.clone()));
        }
        let unscheduled = self.unscheduled();
        if !unscheduled.is_empty() {
            return Err(TopologyError::Unscheduled(unscheduled));
        }
        Ok(())
    }
}

/// Analyze a step graph.
pub fn summarize_graph(graph: &StepGraph) -> TopologySummary {
    let ordered = graph.topological_order();
    let cycles = graph.detect_cycles();
    let layers = graph.execution_layers();
    let waves = waves_from_layers(&layers);
    let max_depth = waves.iter().map(Vec::len).max().unwrap_or(0);

    // Cycles take priority over critical-path reporting
    let critical = if cycles.is_empty() {
        graph.critical_path()
    } else {
        warn!(cycles = cycles.len(), "step graph contains dependency cycles");
        CriticalPath::default()
    };

    debug!(
        nodes = graph.len(),
        ordered = ordered.len(),
        waves = waves.len(),
        critical = critical.steps.len(),
        "topology summarized"
    );

    TopologySummary {
        total_nodes: graph.len(),
        ordered,
        critical_path: critical.steps,
        critical_cost: critical.cost,
        layers,
        waves,
        max_depth,
        cycles,
        edge_count: graph.edges().len(),
        dangling: graph.dangling_dependencies().to_vec(),
    }
}

/// Build the step graph and analyze it.
pub fn summarize_topology(steps: &[CoordinationStep]) -> TopologySummary {
    summarize_graph(&StepGraph::build(steps))
}
