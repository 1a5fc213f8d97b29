//! Planning layer - budgets, candidate generation and ranking, and policy
//! based selection.

#![warn(missing_docs)]

pub mod budget;
pub mod ranking;
pub mod generator;
pub mod policy;
pub mod selection;

pub use budget::{PlanBudget, budget_from_window, tenant_pressure};
pub use ranking::{
    CandidateScore, CandidateScorer, CompositeScorer, RankedCandidate, SignalMap, rank_candidates,
    rank_candidates_with, score_candidate,
};
pub use generator::{CandidateGenerator, SeedContext};
pub use policy::{
    PolicyWindow, SelectionPolicy, WindowPolicy, create_policy, enforce_hard_constraints,
    selection_policy_from_constraints, window_policy_from_constraints,
};
pub use selection::{SelectionRequest, select_candidate, select_candidate_with};
