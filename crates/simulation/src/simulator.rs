//! The coordination simulator - a synthetic pass over a program.

use crate::config::SimulationConfig;
use crate::diagnostics::{codes, count_severity, Diagnostic, DiagnosticSeverity};
use crate::workflow::WorkflowGraph;
use recovery_core::{
    Clock, CoordinationPlanCandidate, CoordinationProgram, CoordinationSelectionResult,
    PolicyDecision, RunId, SystemClock, TenantId,
};
use recovery_planner::{
    create_policy, enforce_hard_constraints, window_policy_from_constraints, CandidateGenerator,
    SeedContext, WindowPolicy,
};
use recovery_quality::{create_quality_gate, summarize_program_quality, ProgramQualityReport, RiskGrade};
use recovery_topology::{summarize_graph, StepGraph, TopologySummary};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Quality below which a workflow is reported as an error.
pub const QUALITY_FLOOR: f64 = 0.4;

/// Outcome of one simulated run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    /// `tenant:program:millis`
    pub run_id: RunId,
    /// Tenant
    pub tenant: TenantId,
    /// Seeds generated
    pub candidate_count: usize,
    /// Chosen seed, if any was generated
    pub selected: Option<CoordinationPlanCandidate>,
    /// Baseline policy decision
    pub baseline: CoordinationSelectionResult,
    /// Program quality grade
    pub grade: RiskGrade,
    /// One-line summary
    pub summary: String,
    /// Findings, in detection order
    pub diagnostics: Vec<Diagnostic>,
    /// Estimated runtime
    pub projected_minutes: u64,
    /// Placed steps
    pub workflow: WorkflowGraph,
}

impl SimulationResult {
    /// Whether any diagnostic blocks execution.
    pub fn has_blocking_diagnostics(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_blocking)
    }
}

/// Runs simulations with a fixed configuration and clock.
pub struct CoordinationSimulator {
    clock: Arc<dyn Clock>,
    config: SimulationConfig,
    generator: CandidateGenerator,
}

impl CoordinationSimulator {
    /// Create a simulator on the system clock.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            config: SimulationConfig::default(),
            generator: CandidateGenerator::default(),
        }
    }

    /// Set the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the candidate generator.
    pub fn with_generator(mut self, generator: CandidateGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulate a run of `program`.
    pub fn simulate(&self, program: &CoordinationProgram) -> SimulationResult {
        let now = self.clock.now();
        let run_id = RunId::scoped(&program.tenant, &program.id, now.timestamp_millis());
        info!(run_id = %run_id, steps = program.steps.len(), "simulating coordination run");

        // 1. Quality and window policy
        let quality = summarize_program_quality(program);
        let window_policy = window_policy_from_constraints(&program.constraints);

        // 2. Workflow
        let graph = StepGraph::build(&program.steps);
        let topology = summarize_graph(&graph);
        let workflow = WorkflowGraph::build(program, &graph, &topology, quality.overall);

        // 3. Seeds
        let context = SeedContext {
            program,
            topology: &topology,
            quality: &quality,
            run_id: &run_id,
        };
        let seeds = self
            .generator
            .generate_seeds(&context, self.config.seed_limit(program.steps.len()), now);

        // 4. Selection
        let selected = seeds
            .iter()
            .find(|seed| create_quality_gate(seed, &program.constraints).passed)
            .or_else(|| seeds.first())
            .cloned();

        let baseline = enforce_hard_constraints(
            &create_policy(
                program.tenant.as_str(),
                run_id.as_str(),
                &program.constraints,
                self.clock.as_ref(),
            ),
            &self.config.violated_constraints,
        );

        // 5. Diagnostics
        let diagnostics = collect_diagnostics(program, &quality, &window_policy, &topology, &workflow, &baseline);
        for diagnostic in &diagnostics {
            debug!(run_id = %run_id, "{diagnostic}");
        }

        let summary = summarize_run(program, &quality, &workflow, selected.as_ref(), seeds.len(), &baseline, &diagnostics);
        info!(run_id = %run_id, "{summary}");

        SimulationResult {
            run_id,
            tenant: program.tenant.clone(),
            candidate_count: seeds.len(),
            selected,
            baseline,
            grade: quality.grade,
            summary,
            diagnostics,
            projected_minutes: workflow.timeline_minutes,
            workflow,
        }
    }
}

impl Default for CoordinationSimulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulate a run on the system clock.
pub fn simulate_coordination_run(
    program: &CoordinationProgram,
    signal_limit: usize,
    max_candidates: usize,
) -> SimulationResult {
    CoordinationSimulator::new()
        .with_config(
            SimulationConfig::new()
                .with_signal_limit(signal_limit)
                .with_max_candidates(max_candidates),
        )
        .simulate(program)
}

fn join_ids<T: std::fmt::Display>(ids: &[T], separator: &str) -> String {
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(separator)
}

fn collect_diagnostics(
    program: &CoordinationProgram,
    quality: &ProgramQualityReport,
    window_policy: &WindowPolicy,
    topology: &TopologySummary,
    workflow: &WorkflowGraph,
    baseline: &CoordinationSelectionResult,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if program.constraints.is_empty() {
        diagnostics.push(Diagnostic::warn(codes::NO_CONSTRAINTS, "program declares no constraints"));
    }
    if window_policy.windows.is_empty() {
        diagnostics.push(Diagnostic::error(
            codes::NO_POLICY_WINDOWS,
            "no constraint targets a step, policy has no windows",
        ));
    }
    if workflow.quality_score < QUALITY_FLOOR {
        diagnostics.push(Diagnostic::error(
            codes::LOW_QUALITY,
            format!("quality {:.2} below {QUALITY_FLOOR:.2}", workflow.quality_score),
        ));
    }
    if baseline.decision == PolicyDecision::Blocked {
        diagnostics.push(Diagnostic::warn(
            codes::BASELINE_BLOCKED,
            format!("baseline policy blocked: {}", baseline.reasons.join(", ")),
        ));
    }
    if quality.grade == RiskGrade::F {
        diagnostics.push(Diagnostic::error(
            codes::FAILING_GRADE,
            format!("program graded F at quality {:.2}", quality.overall),
        ));
    }
    if !baseline.blocked_constraints.is_empty() {
        diagnostics.push(Diagnostic::warn(
            codes::BLOCKED_CONSTRAINTS,
            format!("blocked constraints: {}", join_ids(&baseline.blocked_constraints, ", ")),
        ));
    }

    for cycle in &topology.cycles {
        diagnostics.push(Diagnostic::error(
            codes::DEPENDENCY_CYCLE,
            format!("dependency cycle: {}", join_ids(cycle, " -> ")),
        ));
    }
    let unscheduled = topology.unscheduled();
    if !unscheduled.is_empty() {
        diagnostics.push(Diagnostic::error(
            codes::UNSCHEDULED_STEPS,
            format!("steps cannot be scheduled: {}", join_ids(&unscheduled, ", ")),
        ));
    }
    for dangling in &topology.dangling {
        diagnostics.push(Diagnostic::warn(
            codes::DANGLING_DEPENDENCY,
            format!("{} requires unknown step {}", dangling.step, dangling.missing),
        ));
    }
    if !topology.critical_path.is_empty() {
        diagnostics.push(Diagnostic::info(
            codes::CRITICAL_PATH,
            format!(
                "critical path {} costs {:.0}",
                join_ids(&topology.critical_path, " -> "),
                topology.critical_cost
            ),
        ));
    }

    diagnostics
}

fn summarize_run(
    program: &CoordinationProgram,
    quality: &ProgramQualityReport,
    workflow: &WorkflowGraph,
    selected: Option<&CoordinationPlanCandidate>,
    candidate_count: usize,
    baseline: &CoordinationSelectionResult,
    diagnostics: &[Diagnostic],
) -> String {
    let selected = selected.map_or_else(|| "none".to_string(), |c| c.id.to_string());
    format!(
        "{}/{}: {candidate_count} candidates, selected {selected}, baseline {}, grade {} ({:.2}), \
         projected {}m, {} errors, {} warnings",
        program.tenant,
        program.id,
        baseline.decision,
        quality.grade,
        quality.overall,
        workflow.timeline_minutes,
        count_severity(diagnostics, DiagnosticSeverity::Error),
        count_severity(diagnostics, DiagnosticSeverity::Warn),
    )
}
