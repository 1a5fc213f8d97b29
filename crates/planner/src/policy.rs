//! Window and selection policies, and the baseline policy decision.

use recovery_core::{
    CandidateMetadata, Clock, ConstraintId, ConstraintScope, CoordinationConstraint,
    CoordinationPlanCandidate, CoordinationSelectionResult, PolicyDecision, ProgramId, RunId,
    StepId, TenantId, Time,
};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Constraints heavier than this block their scope.
pub const BLOCKING_WEIGHT: f64 = 0.75;
/// Constraints at or above this weight forbid deferral.
pub const HARD_WEIGHT: f64 = 0.95;
/// Author recorded on policy-built candidates.
pub const POLICY_AUTHOR: &str = "policy-selector";

/// Reason given when there is not enough information to decide.
pub const REASON_WINDOW_EMPTY: &str = "policy-window-empty";

/// A time window opened by a constraint that targets steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyWindow {
    /// Constraint that opened the window
    pub constraint_id: ConstraintId,
    /// Scope of the constraint
    pub scope: ConstraintScope,
    /// Steps covered
    pub step_ids: Vec<StepId>,
    /// Clamped constraint weight
    pub weight: f64,
}

/// Time-window policy derived from constraints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowPolicy {
    /// One window per step-targeting constraint
    pub windows: Vec<PolicyWindow>,
    /// Longest window allowed
    pub max_window_minutes: u32,
    /// Minimum resilience the policy expects
    pub min_resilience: f64,
    /// Scopes closed by heavy constraints
    pub blocked_scopes: Vec<ConstraintScope>,
}

impl WindowPolicy {
    /// Whether a scope is blocked.
    pub fn is_blocked(&self, scope: ConstraintScope) -> bool {
        self.blocked_scopes.contains(&scope)
    }
}

/// Selection policy derived from constraints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionPolicy {
    /// Confidence a candidate needs to be approved
    pub minimum_confidence: f64,
    /// Scopes that are not blocked
    pub allowed_scopes: Vec<ConstraintScope>,
    /// Whether the run may be deferred
    pub allow_deferred: bool,
}

/// Derive the window policy.
///
/// Only constraints that affect at least one step open a window.
pub fn window_policy_from_constraints(constraints: &[CoordinationConstraint]) -> WindowPolicy {
    let windows: Vec<PolicyWindow> = constraints
        .iter()
        .filter(|c| !c.affected_step_ids.is_empty())
        .map(|c| PolicyWindow {
            constraint_id: c.id.clone(),
            scope: c.scope,
            step_ids: c.affected_step_ids.clone(),
            weight: c.clamped_weight(),
        })
        .collect();

    let blocked_scopes: BTreeSet<ConstraintScope> = constraints
        .iter()
        .filter(|c| c.clamped_weight() > BLOCKING_WEIGHT)
        .map(|c| c.scope)
        .collect();

    let window_count = u32::try_from(windows.len()).unwrap_or(u32::MAX);
    WindowPolicy {
        max_window_minutes: window_count.saturating_mul(10).max(15),
        min_resilience: (1.0 - constraints.len() as f64 / 12.0).max(0.2),
        blocked_scopes: blocked_scopes.into_iter().collect(),
        windows,
    }
}

/// Derive the selection policy.
pub fn selection_policy_from_constraints(constraints: &[CoordinationConstraint]) -> SelectionPolicy {
    let window_policy = window_policy_from_constraints(constraints);
    SelectionPolicy {
        minimum_confidence: (0.6 + 0.03 * constraints.len() as f64).min(1.0),
        allowed_scopes: ConstraintScope::ALL
            .iter()
            .copied()
            .filter(|scope| !window_policy.is_blocked(*scope))
            .collect(),
        allow_deferred: constraints.iter().all(|c| c.clamped_weight() < HARD_WEIGHT),
    }
}

/// Ids of constraints whose scope the window policy blocks.
pub fn blocked_constraint_ids(
    policy: &WindowPolicy,
    constraints: &[CoordinationConstraint],
) -> Vec<ConstraintId> {
    constraints
        .iter()
        .filter(|c| policy.is_blocked(c.scope))
        .map(|c| c.id.clone())
        .collect()
}

pub(crate) fn blocked_scope_reasons(policy: &WindowPolicy) -> impl Iterator<Item = String> + '_ {
    policy.blocked_scopes.iter().map(|scope| format!("blocked-scope:{scope}"))
}

/// Candidate returned when nothing better can be decided.
pub fn fallback_candidate(run_id: &RunId, tenant: &TenantId, created_at: Time) -> CoordinationPlanCandidate {
    CoordinationPlanCandidate::new(
        run_id.candidate("fallback"),
        ProgramId::policy_baseline(),
        run_id.clone(),
        tenant.clone(),
        POLICY_AUTHOR,
        created_at,
    )
    .with_metadata(CandidateMetadata {
        parallelism: 1,
        expected_completion_minutes: 0,
        risk_index: 0.0,
        resilience_score: 1.0,
    })
}

/// Deferred result around the fallback candidate.
pub fn fallback_result(
    run_id: RunId,
    tenant: &TenantId,
    reasons: Vec<String>,
    selected_at: Time,
) -> CoordinationSelectionResult {
    CoordinationSelectionResult {
        selected_candidate: fallback_candidate(&run_id, tenant, selected_at),
        run_id,
        alternatives: Vec::new(),
        decision: PolicyDecision::Deferred,
        blocked_constraints: Vec::new(),
        reasons,
        selected_at,
    }
}

/// Baseline policy decision for a run.
///
/// Defers with [`REASON_WINDOW_EMPTY`] and a fallback candidate when no
/// constraint opens a window or an identifier is invalid. Otherwise decides
/// on a minimal candidate sized from the constraint count: deferred when the
/// selection policy allows it, approved when a hard constraint forbids it.
/// This path never blocks; see [`enforce_hard_constraints`].
pub fn create_policy(
    tenant: &str,
    run_id: &str,
    constraints: &[CoordinationConstraint],
    clock: &dyn Clock,
) -> CoordinationSelectionResult {
    let now = clock.now();
    let window_policy = window_policy_from_constraints(constraints);

    let (tenant, run_id) = match (TenantId::new(tenant), RunId::new(run_id)) {
        (Ok(tenant), Ok(run_id)) => (tenant, run_id),
        (tenant, run_id) => {
            warn!("policy requested with invalid identifiers");
            let mut reasons = vec![REASON_WINDOW_EMPTY.to_string()];
            if tenant.is_err() {
                reasons.push("invalid-identifier:tenant".to_string());
            }
            if run_id.is_err() {
                reasons.push("invalid-identifier:run-id".to_string());
            }
            return fallback_result(
                run_id.unwrap_or_else(|_| RunId::unassigned()),
                &tenant.unwrap_or_else(|_| TenantId::unknown()),
                reasons,
                now,
            );
        }
    };

    if window_policy.windows.is_empty() {
        debug!(run_id = %run_id, "no policy windows, deferring");
        return fallback_result(run_id, &tenant, vec![REASON_WINDOW_EMPTY.to_string()], now);
    }

    let selection_policy = selection_policy_from_constraints(constraints);
    let count = constraints.len() as f64;
    let candidate = CoordinationPlanCandidate::new(
        run_id.candidate("baseline"),
        ProgramId::policy_baseline(),
        run_id.clone(),
        tenant.clone(),
        POLICY_AUTHOR,
        now,
    )
    .with_metadata(CandidateMetadata {
        parallelism: u32::try_from(constraints.len().saturating_add(1)).unwrap_or(u32::MAX).min(4),
        expected_completion_minutes: window_policy.max_window_minutes,
        risk_index: count / 10.0,
        resilience_score: 1.0 - (count / 25.0).min(1.0),
    });

    let (decision, mut reasons) = if constraints.is_empty() || selection_policy.allow_deferred {
        (PolicyDecision::Deferred, vec!["deferral-allowed".to_string()])
    } else {
        (PolicyDecision::Approved, vec!["deferral-disallowed".to_string()])
    };
    reasons.extend(blocked_scope_reasons(&window_policy));

    info!(run_id = %run_id, tenant = %tenant, decision = %decision, "baseline policy decided");

    CoordinationSelectionResult {
        run_id,
        selected_candidate: candidate,
        alternatives: Vec::new(),
        decision,
        blocked_constraints: blocked_constraint_ids(&window_policy, constraints),
        reasons,
        selected_at: now,
    }
}

/// Block a result on explicitly violated hard constraints.
///
/// Returns the result unchanged when nothing is violated. Otherwise the copy
/// is blocked, the violated ids are appended to the blocked constraints and
/// one `hard-constraint-violated:{id}` reason is added per id.
pub fn enforce_hard_constraints(
    result: &CoordinationSelectionResult,
    violated: &[ConstraintId],
) -> CoordinationSelectionResult {
    let mut blocked = result.clone();
    if violated.is_empty() {
        return blocked;
    }

    for id in violated {
        if !blocked.blocked_constraints.contains(id) {
            blocked.blocked_constraints.push(id.clone());
        }
        blocked.reasons.push(format!("hard-constraint-violated:{id}"));
    }
    blocked.decision = PolicyDecision::Blocked;

    warn!(run_id = %blocked.run_id, violated = violated.len(), "run blocked on hard constraints");
    blocked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use recovery_core::{ConstraintKind, FixedClock};

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 4, 2, 9, 30, 0).unwrap())
    }

    fn constraint(id: &str, scope: ConstraintScope, weight: f64, steps: &[&str]) -> CoordinationConstraint {
        steps.iter().fold(
            CoordinationConstraint::new(ConstraintId::new(id).unwrap(), ConstraintKind::Parallelism, scope, weight),
            |c, s| c.affecting(StepId::new(*s).unwrap()),
        )
    }

    #[test]
    fn test_window_policy() {
        let constraints = [
            constraint("a", ConstraintScope::Security, 0.9, &["s1"]),
            constraint("b", ConstraintScope::Capacity, 0.2, &[]),
            constraint("c", ConstraintScope::Incident, 0.8, &["s1", "s2"]),
        ];
        let policy = window_policy_from_constraints(&constraints);
        assert_eq!(policy.windows.len(), 2);
        assert_eq!(policy.max_window_minutes, 20);
        assert!((policy.min_resilience - 0.75).abs() < 1e-9);
        assert_eq!(policy.blocked_scopes, vec![ConstraintScope::Incident, ConstraintScope::Security]);
    }

    #[test]
    fn test_window_policy_floors() {
        let policy = window_policy_from_constraints(&[constraint("a", ConstraintScope::Incident, 0.1, &["s"])]);
        assert_eq!(policy.max_window_minutes, 15);

        let many: Vec<_> = (0..20)
            .map(|i| constraint(&format!("c{i}"), ConstraintScope::Incident, 0.1, &[]))
            .collect();
        assert_eq!(window_policy_from_constraints(&many).min_resilience, 0.2);
    }

    #[test]
    fn test_selection_policy() {
        let constraints = [
            constraint("a", ConstraintScope::Security, 0.96, &["s1"]),
            constraint("b", ConstraintScope::Capacity, 0.1, &["s1"]),
        ];
        let policy = selection_policy_from_constraints(&constraints);
        assert!((policy.minimum_confidence - 0.66).abs() < 1e-9);
        assert!(!policy.allow_deferred);
        assert_eq!(
            policy.allowed_scopes,
            vec![ConstraintScope::Incident, ConstraintScope::Maintenance, ConstraintScope::Capacity]
        );

        let many: Vec<_> = (0..20)
            .map(|i| constraint(&format!("c{i}"), ConstraintScope::Incident, 0.1, &[]))
            .collect();
        let policy = selection_policy_from_constraints(&many);
        assert_eq!(policy.minimum_confidence, 1.0);
        assert!(policy.allow_deferred);
    }

    #[test]
    fn test_empty_constraints_defer() {
        let result = create_policy("tenant-1", "run-1", &[], &clock());
        assert_eq!(result.decision, PolicyDecision::Deferred);
        assert_eq!(result.reasons, vec![REASON_WINDOW_EMPTY.to_string()]);
        assert!(result.selected_candidate.steps.is_empty());
        assert_eq!(result.selected_candidate.metadata.parallelism, 1);
        assert_eq!(result.selected_candidate.metadata.risk_index, 0.0);
        assert_eq!(result.selected_at, clock().0);
    }

    #[test]
    fn test_constraints_without_steps_defer() {
        let constraints = [constraint("a", ConstraintScope::Security, 0.99, &[])];
        let result = create_policy("tenant-1", "run-1", &constraints, &clock());
        assert_eq!(result.decision, PolicyDecision::Deferred);
        assert_eq!(result.reasons[0], REASON_WINDOW_EMPTY);
    }

    #[test]
    fn test_invalid_identifiers_defer() {
        let constraints = [constraint("a", ConstraintScope::Security, 0.5, &["s"])];
        let result = create_policy(" ", "", &constraints, &clock());
        assert_eq!(result.decision, PolicyDecision::Deferred);
        assert_eq!(result.run_id, RunId::unassigned());
        assert_eq!(result.selected_candidate.tenant, TenantId::unknown());
        assert!(result.reasons.contains(&"invalid-identifier:tenant".to_string()));
        assert!(result.reasons.contains(&"invalid-identifier:run-id".to_string()));
    }

    #[test]
    fn test_soft_constraints_defer_with_minimal_candidate() {
        let constraints = [
            constraint("a", ConstraintScope::Security, 0.8, &["s1"]),
            constraint("b", ConstraintScope::Capacity, 0.3, &["s2"]),
        ];
        let result = create_policy("tenant-1", "run-1", &constraints, &clock());
        assert_eq!(result.decision, PolicyDecision::Deferred);

        let metadata = result.selected_candidate.metadata;
        assert_eq!(metadata.parallelism, 3);
        assert!((metadata.risk_index - 0.2).abs() < 1e-9);
        assert!((metadata.resilience_score - 0.92).abs() < 1e-9);
        assert_eq!(result.selected_candidate.id.as_str(), "run-1:baseline");

        assert_eq!(result.blocked_constraints, vec![ConstraintId::new("a").unwrap()]);
        assert!(result.reasons.contains(&"blocked-scope:security".to_string()));
    }

    #[test]
    fn test_hard_constraint_approves() {
        let constraints = [constraint("a", ConstraintScope::Maintenance, 0.95, &["s1"])];
        let result = create_policy("tenant-1", "run-1", &constraints, &clock());
        assert_eq!(result.decision, PolicyDecision::Approved);
        assert!(result.is_approved());
    }

    #[test]
    fn test_enforce_hard_constraints() {
        let constraints = [constraint("a", ConstraintScope::Security, 0.8, &["s1"])];
        let result = create_policy("tenant-1", "run-1", &constraints, &clock());

        let unchanged = enforce_hard_constraints(&result, &[]);
        assert_eq!(unchanged, result);

        let violated = [ConstraintId::new("a").unwrap(), ConstraintId::new("z").unwrap()];
        let blocked = enforce_hard_constraints(&result, &violated);
        assert_eq!(blocked.decision, PolicyDecision::Blocked);
        assert_eq!(blocked.blocked_constraints, violated.to_vec());
        assert!(blocked.reasons.contains(&"hard-constraint-violated:z".to_string()));
        assert_eq!(result.decision, PolicyDecision::Deferred);
    }
}
