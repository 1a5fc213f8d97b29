//! Candidate selection under policy.

use crate::budget::PlanBudget;
use crate::policy::{
    blocked_constraint_ids, blocked_scope_reasons, fallback_result, selection_policy_from_constraints,
    window_policy_from_constraints, REASON_WINDOW_EMPTY,
};
use crate::ranking::{rank_indexed, CandidateScorer, CompositeScorer, SignalMap};
use recovery_core::{
    Clock, CoordinationConstraint, CoordinationPlanCandidate, CoordinationSelectionResult,
    PolicyDecision, RunId, TenantId,
};
use recovery_quality::create_quality_gate;
use tracing::{debug, info};

/// Everything a selection attempt looks at.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRequest<'a> {
    /// Tenant the run belongs to
    pub tenant: &'a TenantId,
    /// Run being decided
    pub run_id: &'a RunId,
    /// Candidates to choose from
    pub candidates: &'a [CoordinationPlanCandidate],
    /// Signals per candidate
    pub signals: &'a SignalMap,
    /// Budget candidates are scored against
    pub budget: &'a PlanBudget,
    /// Constraints the policy is derived from
    pub constraints: &'a [CoordinationConstraint],
}

/// Select a candidate with the [`CompositeScorer`].
pub fn select_candidate(request: &SelectionRequest<'_>, clock: &dyn Clock) -> CoordinationSelectionResult {
    select_candidate_with(&CompositeScorer, request, clock)
}

/// Rank the candidates and decide on one of them.
///
/// The first ranked candidate that passes the quality gate with enough
/// confidence is approved. Failing that, the best gate-passing candidate is
/// deferred, and failing that the top-ranked one is deferred with
/// `quality-gate-failed`. Without policy windows or candidates the fallback
/// candidate is deferred. Selection never blocks.
pub fn select_candidate_with(
    scorer: &dyn CandidateScorer,
    request: &SelectionRequest<'_>,
    clock: &dyn Clock,
) -> CoordinationSelectionResult {
    let now = clock.now();
    let run_id = request.run_id.clone();
    let window_policy = window_policy_from_constraints(request.constraints);

    if window_policy.windows.is_empty() {
        debug!(run_id = %run_id, "no policy windows, deferring");
        return fallback_result(run_id, request.tenant, vec![REASON_WINDOW_EMPTY.to_string()], now);
    }
    if request.candidates.is_empty() {
        debug!(run_id = %run_id, "no candidates, deferring");
        return fallback_result(run_id, request.tenant, vec!["no-candidates".to_string()], now);
    }

    let selection_policy = selection_policy_from_constraints(request.constraints);
    let ranked = rank_indexed(scorer, request.candidates, request.signals, request.budget);
    let gate_passed: Vec<bool> = ranked
        .iter()
        .map(|(index, _)| create_quality_gate(&request.candidates[*index], request.constraints).passed)
        .collect();

    let confident = ranked.iter().zip(&gate_passed).position(|((_, entry), passed)| {
        *passed && entry.confidence() >= selection_policy.minimum_confidence
    });
    let (chosen, decision, reason) = match confident {
        Some(position) => (position, PolicyDecision::Approved, "confidence-met"),
        None => match gate_passed.iter().position(|passed| *passed) {
            Some(position) => (position, PolicyDecision::Deferred, "confidence-below-minimum"),
            None => (0, PolicyDecision::Deferred, "quality-gate-failed"),
        },
    };

    let mut reasons = vec![reason.to_string()];
    reasons.extend(blocked_scope_reasons(&window_policy));

    let (chosen_index, chosen_entry) = &ranked[chosen];
    info!(
        run_id = %run_id,
        candidate = %chosen_entry.candidate_id,
        score = chosen_entry.score,
        decision = %decision,
        "candidate selected"
    );

    CoordinationSelectionResult {
        run_id,
        selected_candidate: request.candidates[*chosen_index].clone(),
        alternatives: ranked
            .iter()
            .enumerate()
            .filter(|(position, _)| *position != chosen)
            .map(|(_, (index, _))| request.candidates[*index].clone())
            .collect(),
        decision,
        blocked_constraints: blocked_constraint_ids(&window_policy, request.constraints),
        reasons,
        selected_at: now,
    }
}
