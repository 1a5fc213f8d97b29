//! Candidate scoring and ranking.

use crate::budget::PlanBudget;
use recovery_core::{CandidateId, CandidateSignal, CoordinationPlanCandidate, TenantId};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Signals keyed by the candidate they describe.
pub type SignalMap = BTreeMap<CandidateId, Vec<CandidateSignal>>;

/// Score breakdown of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    /// Composite score, 0-100
    pub score: u32,
    /// Mean signal value clamped to `[0, 1]`
    pub signal: f64,
    /// Steps relative to the step budget
    pub step_load: f64,
    /// `1 - risk_index`
    pub risk: f64,
    /// Resilience from metadata
    pub resilience: f64,
    /// Parallelism relative to the parallelism budget
    pub baseline: f64,
}

impl CandidateScore {
    /// Score as a `[0, 1]` confidence.
    pub fn confidence(&self) -> f64 {
        f64::from(self.score) / 100.0
    }
}

/// Strategy for scoring a candidate against its signals and budget.
pub trait CandidateScorer: Send + Sync {
    /// Score one candidate.
    fn score(
        &self,
        candidate: &CoordinationPlanCandidate,
        signals: &[CandidateSignal],
        budget: &PlanBudget,
    ) -> CandidateScore;
}

/// Default scorer blending resilience, signals, parallelism and step load.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeScorer;

impl CandidateScorer for CompositeScorer {
    fn score(
        &self,
        candidate: &CoordinationPlanCandidate,
        signals: &[CandidateSignal],
        budget: &PlanBudget,
    ) -> CandidateScore {
        score_candidate(candidate, signals, budget)
    }
}

fn ratio(numerator: f64, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / f64::from(denominator)
    }
}

fn signal_score(signals: &[CandidateSignal]) -> f64 {
    if signals.is_empty() {
        return 0.0;
    }
    let mean = signals.iter().map(CandidateSignal::value).sum::<f64>() / signals.len() as f64;
    if mean.is_nan() {
        0.0
    } else {
        mean.clamp(0.0, 1.0)
    }
}

/// Composite score of a candidate.
///
/// `((resilience + signal + baseline) / 3) * 50 + baseline * 30
/// + step_load * 10 + signal * 10`, clamped to 0-100 and rounded.
pub fn score_candidate(
    candidate: &CoordinationPlanCandidate,
    signals: &[CandidateSignal],
    budget: &PlanBudget,
) -> CandidateScore {
    let signal = signal_score(signals);
    let step_load = ratio(candidate.steps.len() as f64, budget.max_step_count);
    let risk = 1.0 - candidate.metadata.risk_index;
    let resilience = candidate.metadata.resilience_score;
    let baseline = ratio(f64::from(candidate.metadata.parallelism), budget.max_parallelism);

    let composite = ((resilience + signal + baseline) / 3.0) * 50.0
        + baseline * 30.0
        + step_load.max(0.0) * 10.0
        + signal * 10.0;
    let score = if composite.is_nan() {
        0
    } else {
        composite.clamp(0.0, 100.0).round() as u32
    };

    CandidateScore {
        score,
        signal,
        step_load,
        risk,
        resilience,
        baseline,
    }
}

/// Ranked projection of a candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    /// 1-based rank
    pub rank: usize,
    /// Candidate
    pub candidate_id: CandidateId,
    /// Tenant
    pub tenant: TenantId,
    /// Composite score
    pub score: u32,
    /// Number of signals the candidate carries
    pub phase_readiness: usize,
    /// `1 - risk_index`
    pub risk_adjusted: f64,
}

impl RankedCandidate {
    /// Score as a `[0, 1]` confidence.
    pub fn confidence(&self) -> f64 {
        f64::from(self.score) / 100.0
    }
}

/// Rank candidates with the [`CompositeScorer`].
pub fn rank_candidates(
    candidates: &[CoordinationPlanCandidate],
    signals: &SignalMap,
    budget: &PlanBudget,
) -> Vec<RankedCandidate> {
    rank_candidates_with(&CompositeScorer, candidates, signals, budget)
}

/// Rank candidates by score, highest first.
///
/// The sort is stable: equal scores keep input order.
pub fn rank_candidates_with(
    scorer: &dyn CandidateScorer,
    candidates: &[CoordinationPlanCandidate],
    signals: &SignalMap,
    budget: &PlanBudget,
) -> Vec<RankedCandidate> {
    rank_indexed(scorer, candidates, signals, budget)
        .into_iter()
        .map(|(_, ranked)| ranked)
        .collect()
}

/// Ranked projections paired with the index of their input candidate.
pub(crate) fn rank_indexed(
    scorer: &dyn CandidateScorer,
    candidates: &[CoordinationPlanCandidate],
    signals: &SignalMap,
    budget: &PlanBudget,
) -> Vec<(usize, RankedCandidate)> {
    let mut ranked: Vec<(usize, RankedCandidate)> = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            let candidate_signals = signals.get(&candidate.id).map(Vec::as_slice).unwrap_or(&[]);
            let scored = scorer.score(candidate, candidate_signals, budget);
            let projection = RankedCandidate {
                rank: 0,
                candidate_id: candidate.id.clone(),
                tenant: candidate.tenant.clone(),
                score: scored.score,
                phase_readiness: candidate_signals.len(),
                risk_adjusted: scored.risk,
            };
            (index, projection)
        })
        .collect();

    ranked.sort_by(|(_, a), (_, b)| b.score.cmp(&a.score));
    for (position, (_, entry)) in ranked.iter_mut().enumerate() {
        entry.rank = position + 1;
    }

    debug!(candidates = ranked.len(), "candidates ranked");
    ranked
}
