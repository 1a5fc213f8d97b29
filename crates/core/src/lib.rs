//! Recovery coordination core data models.
//!
//! This crate defines the immutable structures every planning component
//! works over: programs, steps, constraints, candidates and selections.

#![warn(missing_docs)]

// Identities
mod id;

// Program authoring
mod step;
mod constraint;
mod program;

// Planning outputs
mod candidate;
mod selection;
mod signal;

// Time
mod clock;

// Re-exports
pub use id::*;

pub use step::{CoordinationStep, StepPriority};
pub use constraint::{CoordinationConstraint, ConstraintKind, ConstraintScope, ConstraintBoundary};
pub use program::{CoordinationProgram, RunWindow, ProgramPhase};

pub use candidate::{CoordinationPlanCandidate, CandidateMetadata};
pub use selection::{CoordinationSelectionResult, PolicyDecision};
pub use signal::{CandidateSignal, SignalSeverity};

pub use clock::{Clock, SystemClock, FixedClock};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
