//! Program model - a tenant's recovery runbook.

use serde::{Deserialize, Serialize};
use crate::constraint::{ConstraintScope, CoordinationConstraint};
use crate::id::{IncidentId, ProgramId, StepId, TenantId};
use crate::step::CoordinationStep;
use crate::Time;

/// A recovery program handed to the engine read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinationProgram {
    /// Unique identifier
    pub id: ProgramId,

    /// Owning tenant
    pub tenant: TenantId,

    /// Incident being remediated
    pub incident_id: IncidentId,

    /// Operational scope
    pub scope: ConstraintScope,

    /// Window the program may run in
    pub run_window: RunWindow,

    /// Lifecycle phase
    pub phase: ProgramPhase,

    /// Recovery steps
    #[serde(default)]
    pub steps: Vec<CoordinationStep>,

    /// Operational constraints
    #[serde(default)]
    pub constraints: Vec<CoordinationConstraint>,

    /// When authored
    pub created_at: Time,
}

impl CoordinationProgram {
    /// Create an empty program in the plan phase.
    pub fn new(
        id: ProgramId,
        tenant: TenantId,
        incident_id: IncidentId,
        run_window: RunWindow,
        created_at: Time,
    ) -> Self {
        Self {
            id,
            tenant,
            incident_id,
            scope: ConstraintScope::Incident,
            run_window: run_window.normalized(),
            phase: ProgramPhase::Plan,
            steps: Vec::new(),
            constraints: Vec::new(),
            created_at,
        }
    }

    /// Set the scope.
    pub fn with_scope(mut self, scope: ConstraintScope) -> Self {
        self.scope = scope;
        self
    }

    /// Set the phase.
    pub fn with_phase(mut self, phase: ProgramPhase) -> Self {
        self.phase = phase;
        self
    }

    /// Append a step.
    pub fn with_step(mut self, step: CoordinationStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Append a constraint.
    pub fn with_constraint(mut self, constraint: CoordinationConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Look up a step by id.
    pub fn step(&self, id: &StepId) -> Option<&CoordinationStep> {
        self.steps.iter().find(|s| &s.id == id)
    }

    /// Total step duration in seconds.
    pub fn total_duration_seconds(&self) -> u64 {
        self.steps.iter().map(|s| s.duration_seconds).sum()
    }
}

/// Time window a program may execute in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunWindow {
    /// Window start
    pub from: Time,

    /// Window end
    pub to: Time,

    /// IANA timezone label, informational only
    pub timezone: String,
}

impl RunWindow {
    /// Create a window.
    pub fn new(from: Time, to: Time, timezone: impl Into<String>) -> Self {
        Self { from, to, timezone: timezone.into() }
    }

    /// Copy of the window with `from <= to`.
    pub fn normalized(&self) -> Self {
        if self.from <= self.to {
            self.clone()
        } else {
            Self {
                from: self.to,
                to: self.from,
                timezone: self.timezone.clone(),
            }
        }
    }

    /// Length of the normalized window in (fractional) minutes.
    pub fn minutes(&self) -> f64 {
        let window = self.normalized();
        let millis = window.to.signed_duration_since(window.from).num_milliseconds();
        millis as f64 / 60_000.0
    }
}

/// Lifecycle phase of a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgramPhase {
    Discover,
    Plan,
    Execute,
    Observe,
    Close,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_normalized_swaps_reversed_window() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let window = RunWindow::new(start + Duration::minutes(45), start, "UTC");
        let normalized = window.normalized();
        assert!(normalized.from <= normalized.to);
        assert_eq!(normalized.from, start);
        assert_eq!(window.minutes(), 45.0);
    }

    #[test]
    fn test_minutes_keeps_fractions() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let window = RunWindow::new(start, start + Duration::seconds(90), "UTC");
        assert_eq!(window.minutes(), 1.5);
    }
}
