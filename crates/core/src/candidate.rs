//! Plan candidate model - a concrete, scored execution plan.

use serde::{Deserialize, Serialize};
use crate::id::{CandidateId, ProgramId, RunId, StepId, TenantId};
use crate::step::CoordinationStep;
use crate::Time;

/// A candidate execution plan over a program's steps.
///
/// Candidates are values: scoring and ranking never edit one in place, they
/// build a new candidate through the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinationPlanCandidate {
    /// Unique identifier
    pub id: CandidateId,

    /// Program the plan covers
    pub program_id: ProgramId,

    /// Run the plan was produced for
    pub run_id: RunId,

    /// Owning tenant
    pub tenant: TenantId,

    /// Snapshot of covered steps
    pub steps: Vec<CoordinationStep>,

    /// Execution order
    pub sequence: Vec<StepId>,

    /// Plan estimates
    pub metadata: CandidateMetadata,

    /// Producer of the candidate
    pub created_by: String,

    /// When produced
    pub created_at: Time,
}

impl CoordinationPlanCandidate {
    /// Create a candidate with no steps.
    pub fn new(
        id: CandidateId,
        program_id: ProgramId,
        run_id: RunId,
        tenant: TenantId,
        created_by: impl Into<String>,
        created_at: Time,
    ) -> Self {
        Self {
            id,
            program_id,
            run_id,
            tenant,
            steps: Vec::new(),
            sequence: Vec::new(),
            metadata: CandidateMetadata::default(),
            created_by: created_by.into(),
            created_at,
        }
    }

    /// Replace the step snapshot and its execution order.
    pub fn with_steps(mut self, steps: Vec<CoordinationStep>, sequence: Vec<StepId>) -> Self {
        self.steps = steps;
        self.sequence = sequence;
        self
    }

    /// Replace the metadata. Scores are clamped to `[0, 1]`.
    pub fn with_metadata(mut self, metadata: CandidateMetadata) -> Self {
        self.metadata = metadata.clamped();
        self
    }
}

/// Estimates attached to a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateMetadata {
    /// Steps run concurrently
    pub parallelism: u32,

    /// Expected wall-clock completion
    pub expected_completion_minutes: u32,

    /// Risk in `[0, 1]`
    pub risk_index: f64,

    /// Resilience in `[0, 1]`
    pub resilience_score: f64,
}

impl CandidateMetadata {
    /// Copy with risk and resilience clamped to `[0, 1]`.
    pub fn clamped(self) -> Self {
        Self {
            risk_index: clamp_unit(self.risk_index),
            resilience_score: clamp_unit(self.resilience_score),
            ..self
        }
    }
}

impl Default for CandidateMetadata {
    fn default() -> Self {
        Self {
            parallelism: 1,
            expected_completion_minutes: 0,
            risk_index: 0.0,
            resilience_score: 1.0,
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_with_metadata_clamps_scores() {
        let candidate = CoordinationPlanCandidate::new(
            CandidateId::new("cand-1").unwrap(),
            ProgramId::new("prog").unwrap(),
            RunId::new("run").unwrap(),
            TenantId::new("tenant-2").unwrap(),
            "test",
            Utc::now(),
        )
        .with_metadata(CandidateMetadata {
            parallelism: 2,
            expected_completion_minutes: 30,
            risk_index: 1.4,
            resilience_score: -0.2,
        });

        assert_eq!(candidate.metadata.risk_index, 1.0);
        assert_eq!(candidate.metadata.resilience_score, 0.0);
        assert_eq!(candidate.metadata.parallelism, 2);
    }
}
