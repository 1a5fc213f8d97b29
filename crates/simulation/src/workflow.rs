//! Workflow graph of a simulated run.

use recovery_core::{CoordinationProgram, StepId};
use recovery_quality::mean_constraint_weight;
use recovery_topology::{StepGraph, TopologySummary};
use serde::Serialize;

/// Minutes each layer of a wave adds per step.
pub const MINUTES_PER_LAYER_STEP: u64 = 3;

/// A step placed in the workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowNode {
    /// Step
    pub step_id: StepId,
    /// Index in the program
    pub position: usize,
    /// Execution layer
    pub layer: usize,
    /// Resolvable dependencies
    pub predecessors: Vec<StepId>,
}

/// Steps placed by layer, with timeline and risk estimates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowGraph {
    /// Nodes in program order
    pub nodes: Vec<WorkflowNode>,
    /// `sum(steps in layer * (layer + 1) * 3)`
    pub timeline_minutes: u64,
    /// Mean clamped constraint weight
    pub risk_index: f64,
    /// Program quality
    pub quality_score: f64,
}

impl WorkflowGraph {
    /// Place every program step using its analyzed graph.
    pub fn build(
        program: &CoordinationProgram,
        graph: &StepGraph,
        topology: &TopologySummary,
        quality_score: f64,
    ) -> Self {
        let nodes = program
            .steps
            .iter()
            .enumerate()
            .map(|(position, step)| WorkflowNode {
                step_id: step.id.clone(),
                position,
                layer: topology.layer_of(&step.id).unwrap_or(0),
                predecessors: graph.dependencies(&step.id).to_vec(),
            })
            .collect();

        Self {
            nodes,
            timeline_minutes: timeline_minutes(&topology.waves),
            risk_index: mean_constraint_weight(&program.constraints),
            quality_score,
        }
    }

    /// Node for a step.
    pub fn node(&self, id: &StepId) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| &n.step_id == id)
    }

    /// Whether the workflow has no steps.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Timeline estimate over execution waves.
pub fn timeline_minutes(waves: &[Vec<StepId>]) -> u64 {
    waves
        .iter()
        .enumerate()
        .map(|(layer, wave)| wave.len() as u64 * (layer as u64 + 1) * MINUTES_PER_LAYER_STEP)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use recovery_core::{
        ConstraintId, ConstraintKind, ConstraintScope, CoordinationConstraint, CoordinationStep,
        IncidentId, ProgramId, RunWindow, TenantId,
    };
    use recovery_topology::summarize_graph;

    fn id(s: &str) -> StepId {
        StepId::new(s).unwrap()
    }

    fn step(name: &str, requires: &[&str]) -> CoordinationStep {
        requires
            .iter()
            .fold(CoordinationStep::new(id(name), name, 60), |s, r| s.requiring(id(r)))
    }

    fn program() -> CoordinationProgram {
        let start = Utc.with_ymd_and_hms(2026, 8, 1, 6, 0, 0).unwrap();
        CoordinationProgram::new(
            ProgramId::new("prog").unwrap(),
            TenantId::new("tenant").unwrap(),
            IncidentId::new("inc").unwrap(),
            RunWindow::new(start, start + Duration::hours(1), "UTC"),
            start,
        )
        .with_step(step("a", &[]))
        .with_step(step("b", &["a"]))
        .with_step(step("c", &["a"]))
        .with_step(step("d", &["b", "c", "ghost"]))
        .with_constraint(CoordinationConstraint::new(
            ConstraintId::new("k").unwrap(),
            ConstraintKind::Tenant,
            ConstraintScope::Capacity,
            0.4,
        ))
    }

    #[test]
    fn test_diamond_workflow() {
        let program = program();
        let graph = StepGraph::build(&program.steps);
        let topology = summarize_graph(&graph);
        let workflow = WorkflowGraph::build(&program, &graph, &topology, 0.8);

        assert_eq!(workflow.nodes.len(), 4);
        let d = workflow.node(&id("d")).unwrap();
        assert_eq!(d.position, 3);
        assert_eq!(d.layer, 2);
        assert_eq!(d.predecessors, vec![id("b"), id("c")]);

        // 1*1*3 + 2*2*3 + 1*3*3
        assert_eq!(workflow.timeline_minutes, 24);
        assert_eq!(workflow.risk_index, 0.4);
        assert_eq!(workflow.quality_score, 0.8);
    }

    #[test]
    fn test_empty_timeline() {
        assert_eq!(timeline_minutes(&[]), 0);
    }
}
