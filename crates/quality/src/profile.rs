//! Program quality profiles and risk grading.

use crate::constraint::{
    clamp_unit, compute_risk_index, constraint_score_value, constraint_weight, scope_pressure,
    ScopePressure,
};
use crate::step::step_quality_value;
use recovery_core::{
    ConstraintId, ConstraintScope, CoordinationConstraint, CoordinationProgram, CoordinationStep,
    ProgramId, StepId,
};
use serde::Serialize;
use tracing::debug;

/// Score at or above which a profile is healthy.
pub const HEALTHY_THRESHOLD: f64 = 0.7;
/// Score at or above which a profile is degraded rather than failing.
pub const DEGRADED_THRESHOLD: f64 = 0.45;

/// Health bucket of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstraintStatus {
    Good,
    Warn,
    Bad,
}

impl ConstraintStatus {
    /// Bucket a constraint score.
    pub fn from_score(score: f64) -> Self {
        if score >= HEALTHY_THRESHOLD {
            ConstraintStatus::Good
        } else if score >= DEGRADED_THRESHOLD {
            ConstraintStatus::Warn
        } else {
            ConstraintStatus::Bad
        }
    }
}

/// Health bucket of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    Stable,
    Fragile,
    Critical,
}

impl StepStatus {
    /// Bucket a step score.
    pub fn from_score(score: f64) -> Self {
        if score >= HEALTHY_THRESHOLD {
            StepStatus::Stable
        } else if score >= DEGRADED_THRESHOLD {
            StepStatus::Fragile
        } else {
            StepStatus::Critical
        }
    }
}

/// Letter grade of overall program quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskGrade {
    A,
    B,
    C,
    D,
    F,
}

impl RiskGrade {
    /// Grade an overall score: 0.9 / 0.75 / 0.55 / 0.35 cut-offs.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            RiskGrade::A
        } else if score >= 0.75 {
            RiskGrade::B
        } else if score >= 0.55 {
            RiskGrade::C
        } else if score >= 0.35 {
            RiskGrade::D
        } else {
            RiskGrade::F
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskGrade::A => "A",
            RiskGrade::B => "B",
            RiskGrade::C => "C",
            RiskGrade::D => "D",
            RiskGrade::F => "F",
        }
    }
}

impl std::fmt::Display for RiskGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality profile of one constraint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintProfile {
    /// Constraint
    pub constraint_id: ConstraintId,
    /// Scope of the constraint
    pub scope: ConstraintScope,
    /// Clamped weight in `[0, 1]`
    pub weight: f64,
    /// Weight on the 0-100 scale including headroom
    pub scaled_weight: f64,
    /// Quality contribution
    pub score: f64,
    /// Health bucket
    pub status: ConstraintStatus,
}

/// Quality profile of one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepProfile {
    /// Step
    pub step_id: StepId,
    /// Quality contribution
    pub score: f64,
    /// Health bucket
    pub status: StepStatus,
}

impl StepProfile {
    /// Whether the step is risky enough to need extra parallel capacity.
    pub fn is_risky(&self) -> bool {
        self.status == StepStatus::Critical
    }
}

/// Full quality report for a program.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramQualityReport {
    /// Program
    pub program_id: ProgramId,
    /// Per-constraint profiles, in program order
    pub constraints: Vec<ConstraintProfile>,
    /// Per-step profiles, in program order
    pub steps: Vec<StepProfile>,
    /// Overall quality in `[0, 1]`
    pub overall: f64,
    /// Aggregate constraint risk
    pub risk_index: f64,
    /// Letter grade of `overall`
    pub grade: RiskGrade,
    /// Per-scope pressure
    pub scope_pressure: Vec<ScopePressure>,
}

/// Profile a single constraint.
pub fn profile_constraint(constraint: &CoordinationConstraint) -> ConstraintProfile {
    let score = constraint_score_value(constraint);
    ConstraintProfile {
        constraint_id: constraint.id.clone(),
        scope: constraint.scope,
        weight: constraint.clamped_weight(),
        scaled_weight: constraint_weight(constraint),
        score,
        status: ConstraintStatus::from_score(score),
    }
}

/// Profile a single step.
pub fn profile_step(step: &CoordinationStep) -> StepProfile {
    let score = step_quality_value(step);
    StepProfile {
        step_id: step.id.clone(),
        score,
        status: StepStatus::from_score(score),
    }
}

fn mean_or_perfect(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        1.0
    } else {
        sum / count as f64
    }
}

/// Overall quality of a constraint and step set.
///
/// Mean of the average constraint score and the average step score, each 1
/// when its collection is empty.
pub fn summarize_quality(constraints: &[CoordinationConstraint], steps: &[CoordinationStep]) -> f64 {
    let constraint_quality = mean_or_perfect(constraints.iter().map(constraint_score_value));
    let step_quality = mean_or_perfect(steps.iter().map(step_quality_value));
    clamp_unit((constraint_quality + step_quality) / 2.0)
}

/// Build the quality report of a program.
pub fn summarize_program_quality(program: &CoordinationProgram) -> ProgramQualityReport {
    let overall = summarize_quality(&program.constraints, &program.steps);
    let grade = RiskGrade::from_score(overall);

    debug!(program = %program.id, overall, grade = %grade, "program quality summarized");

    ProgramQualityReport {
        program_id: program.id.clone(),
        constraints: program.constraints.iter().map(profile_constraint).collect(),
        steps: program.steps.iter().map(profile_step).collect(),
        overall,
        risk_index: compute_risk_index(&program.constraints),
        grade,
        scope_pressure: scope_pressure(&program.constraints),
    }
}
