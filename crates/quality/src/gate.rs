//! Quality gate - admission check for plan candidates.

use crate::constraint::heavy_constraint_fraction;
use recovery_core::{CoordinationConstraint, CoordinationPlanCandidate};
use serde::Serialize;

/// Minimum resilience a candidate needs to be admitted.
pub const MIN_GATE_RESILIENCE: f64 = 0.2;
/// Constraints heavier than this shrink the risk ceiling.
pub const HEAVY_CONSTRAINT_WEIGHT: f64 = 0.5;

/// Reason a candidate failed the gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum GateFailure {
    /// Resilience below the minimum
    LowResilience {
        /// Candidate resilience
        actual: f64,
        /// Required minimum
        minimum: f64,
    },
    /// Risk above what the constraint set tolerates
    RiskAboveCeiling {
        /// Candidate risk
        actual: f64,
        /// Allowed maximum
        ceiling: f64,
    },
}

impl std::fmt::Display for GateFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateFailure::LowResilience { actual, minimum } => {
                write!(f, "resilience {actual:.2} below {minimum:.2}")
            }
            GateFailure::RiskAboveCeiling { actual, ceiling } => {
                write!(f, "risk {actual:.2} above ceiling {ceiling:.2}")
            }
        }
    }
}

/// Outcome of running the quality gate on one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateResult {
    /// Whether the candidate is admitted
    pub passed: bool,
    /// Highest risk the constraint set tolerates
    pub risk_ceiling: f64,
    /// Why it was rejected
    pub failures: Vec<GateFailure>,
}

/// Run the quality gate.
///
/// Passes when resilience is at least [`MIN_GATE_RESILIENCE`] and risk does
/// not exceed `1 - fraction of constraints heavier than 0.5`.
pub fn create_quality_gate(
    candidate: &CoordinationPlanCandidate,
    constraints: &[CoordinationConstraint],
) -> GateResult {
    let risk_ceiling = 1.0 - heavy_constraint_fraction(constraints, HEAVY_CONSTRAINT_WEIGHT);
    let metadata = &candidate.metadata;

    let mut failures = Vec::new();
    if metadata.resilience_score < MIN_GATE_RESILIENCE {
        failures.push(GateFailure::LowResilience {
            actual: metadata.resilience_score,
            minimum: MIN_GATE_RESILIENCE,
        });
    }
    if metadata.risk_index > risk_ceiling {
        failures.push(GateFailure::RiskAboveCeiling {
            actual: metadata.risk_index,
            ceiling: risk_ceiling,
        });
    }

    GateResult {
        passed: failures.is_empty(),
        risk_ceiling,
        failures,
    }
}

/// Whether a candidate passes the quality gate.
pub fn passes_quality_gate(
    candidate: &CoordinationPlanCandidate,
    constraints: &[CoordinationConstraint],
) -> bool {
    create_quality_gate(candidate, constraints).passed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use recovery_core::{
        CandidateId, CandidateMetadata, ConstraintId, ConstraintKind, ConstraintScope, ProgramId,
        RunId, TenantId,
    };

    fn candidate(risk: f64, resilience: f64) -> CoordinationPlanCandidate {
        CoordinationPlanCandidate::new(
            CandidateId::new("cand").unwrap(),
            ProgramId::new("prog").unwrap(),
            RunId::new("run").unwrap(),
            TenantId::new("tenant").unwrap(),
            "test",
            Utc::now(),
        )
        .with_metadata(CandidateMetadata {
            parallelism: 1,
            expected_completion_minutes: 10,
            risk_index: risk,
            resilience_score: resilience,
        })
    }

    fn constraint(name: &str, weight: f64) -> CoordinationConstraint {
        CoordinationConstraint::new(
            ConstraintId::new(name).unwrap(),
            ConstraintKind::Tenant,
            ConstraintScope::Capacity,
            weight,
        )
    }

    #[test]
    fn test_empty_constraints_admit_perfect_candidate() {
        let result = create_quality_gate(&candidate(0.0, 1.0), &[]);
        assert!(result.passed);
        assert_eq!(result.risk_ceiling, 1.0);
    }

    #[test]
    fn test_low_resilience_fails() {
        let result = create_quality_gate(&candidate(0.0, 0.1), &[]);
        assert!(!result.passed);
        assert!(matches!(result.failures[0], GateFailure::LowResilience { .. }));
    }

    #[test]
    fn test_heavy_constraints_lower_ceiling() {
        let constraints = [constraint("a", 0.9), constraint("b", 0.2)];
        let result = create_quality_gate(&candidate(0.6, 0.8), &constraints);
        assert_eq!(result.risk_ceiling, 0.5);
        assert!(!result.passed);
        assert_eq!(result.failures[0].to_string(), "risk 0.60 above ceiling 0.50");

        assert!(passes_quality_gate(&candidate(0.5, 0.8), &constraints));
    }

    #[test]
    fn test_all_heavy_constraints_only_admit_zero_risk() {
        let constraints = [constraint("a", 0.9)];
        assert!(passes_quality_gate(&candidate(0.0, 0.5), &constraints));
        assert!(!passes_quality_gate(&candidate(0.01, 0.5), &constraints));
    }
}
