//! Candidate seed generation.

use recovery_core::{CandidateMetadata, CoordinationPlanCandidate, CoordinationProgram, RunId, StepId, Time};
use recovery_quality::ProgramQualityReport;
use recovery_topology::TopologySummary;
use tracing::debug;

/// Author recorded on generated seeds.
pub const SEED_AUTHOR: &str = "coordination-simulator";
/// Parallelism for seeds anchored on a risky step.
pub const RISKY_SEED_PARALLELISM: u32 = 10;
/// Parallelism for every other seed.
pub const DEFAULT_SEED_PARALLELISM: u32 = 4;
/// Completion estimate of the first seed.
pub const BASE_COMPLETION_MINUTES: u32 = 30;
/// Completion added per later seed.
pub const COMPLETION_STEP_MINUTES: u32 = 4;

/// Analysis a generator draws seeds from.
#[derive(Debug, Clone, Copy)]
pub struct SeedContext<'a> {
    /// Program being planned
    pub program: &'a CoordinationProgram,
    /// Its topology
    pub topology: &'a TopologySummary,
    /// Its quality report
    pub quality: &'a ProgramQualityReport,
    /// Run the seeds belong to
    pub run_id: &'a RunId,
}

/// Produces plan candidates from a program analysis.
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    /// Author recorded on each candidate
    created_by: String,
    /// Upper bound on parallelism
    max_parallelism: u32,
}

impl CandidateGenerator {
    /// Create a new generator.
    pub fn new() -> Self {
        Self {
            created_by: SEED_AUTHOR.to_string(),
            max_parallelism: 16,
        }
    }

    /// Set the author recorded on candidates.
    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = created_by.into();
        self
    }

    /// Set the parallelism cap.
    pub fn with_max_parallelism(mut self, max: u32) -> Self {
        self.max_parallelism = max.max(1);
        self
    }

    /// Generate up to `limit` seeds, never more than the program has steps.
    ///
    /// Seed `i` takes its parallelism from step profile `i` and its risk and
    /// resilience from constraint profile `i`, cycling through constraints.
    /// A program without constraints seeds with the program risk index and
    /// the step score. Every seed covers all steps, in topological order when
    /// the topology is valid and in authoring order otherwise.
    pub fn generate_seeds(
        &self,
        context: &SeedContext<'_>,
        limit: usize,
        created_at: Time,
    ) -> Vec<CoordinationPlanCandidate> {
        let SeedContext { program, topology, quality, run_id } = *context;
        let count = limit.min(program.steps.len()).min(quality.steps.len());

        let sequence: Vec<StepId> = if topology.is_valid() {
            topology.ordered.clone()
        } else {
            program.steps.iter().map(|s| s.id.clone()).collect()
        };

        let seeds: Vec<CoordinationPlanCandidate> = (0..count)
            .map(|index| {
                let step = &quality.steps[index];
                let constraint = if quality.constraints.is_empty() {
                    None
                } else {
                    quality.constraints.get(index % quality.constraints.len())
                };

                let parallelism = if step.is_risky() {
                    RISKY_SEED_PARALLELISM
                } else {
                    DEFAULT_SEED_PARALLELISM
                };
                let offset = u32::try_from(index).unwrap_or(u32::MAX);

                let metadata = CandidateMetadata {
                    parallelism: parallelism.clamp(1, self.max_parallelism),
                    expected_completion_minutes: BASE_COMPLETION_MINUTES
                        .saturating_add(offset.saturating_mul(COMPLETION_STEP_MINUTES)),
                    risk_index: constraint.map_or(quality.risk_index, |c| c.weight),
                    resilience_score: constraint.map_or(step.score, |c| c.score),
                };

                CoordinationPlanCandidate::new(
                    run_id.candidate(format_args!("seed-{index}")),
                    program.id.clone(),
                    run_id.clone(),
                    program.tenant.clone(),
                    self.created_by.clone(),
                    created_at,
                )
                .with_steps(program.steps.clone(), sequence.clone())
                .with_metadata(metadata)
            })
            .collect();

        debug!(program = %program.id, seeds = seeds.len(), limit, "candidate seeds generated");
        seeds
    }
}

impl Default for CandidateGenerator {
    fn default() -> Self {
        Self::new()
    }
}
