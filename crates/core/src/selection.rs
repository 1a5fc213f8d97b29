//! Selection result model - the terminal outcome of a selection attempt.

use serde::{Deserialize, Serialize};
use crate::candidate::CoordinationPlanCandidate;
use crate::id::{ConstraintId, RunId};
use crate::Time;

/// Terminal policy decision for a coordination run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyDecision {
    Approved,
    Deferred,
    Blocked,
}

impl PolicyDecision {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyDecision::Approved => "approved",
            PolicyDecision::Deferred => "deferred",
            PolicyDecision::Blocked => "blocked",
        }
    }
}

impl std::fmt::Display for PolicyDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot produced once per selection attempt.
///
/// A selected candidate is always present, whatever the decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinationSelectionResult {
    /// Run the selection belongs to
    pub run_id: RunId,

    /// Chosen candidate
    pub selected_candidate: CoordinationPlanCandidate,

    /// Candidates that were considered but not chosen
    pub alternatives: Vec<CoordinationPlanCandidate>,

    /// Decision
    pub decision: PolicyDecision,

    /// Constraints blocking the run
    pub blocked_constraints: Vec<ConstraintId>,

    /// Machine-readable reasons
    pub reasons: Vec<String>,

    /// When decided
    pub selected_at: Time,
}

impl CoordinationSelectionResult {
    /// Whether a downstream executor may proceed.
    pub fn is_approved(&self) -> bool {
        self.decision == PolicyDecision::Approved
    }
}
