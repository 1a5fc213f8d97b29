//! External signals attached to plan candidates.

use serde::{Deserialize, Serialize};
use crate::program::ProgramPhase;

/// A named numeric signal about a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CandidateSignal {
    /// Raw operational metric
    Metric {
        /// Signal name
        name: String,
        /// Observed value
        value: f64,
        /// Unit label
        #[serde(default)]
        unit: Option<String>,
    },
    /// Readiness of the candidate for a program phase
    Readiness {
        /// Signal name
        name: String,
        /// Readiness value
        value: f64,
        /// Phase the readiness refers to
        phase: ProgramPhase,
    },
    /// Incident telemetry
    Incident {
        /// Signal name
        name: String,
        /// Observed value
        value: f64,
        /// Reported severity
        severity: SignalSeverity,
    },
}

impl CandidateSignal {
    /// Create a metric signal.
    pub fn metric(name: impl Into<String>, value: f64) -> Self {
        CandidateSignal::Metric { name: name.into(), value, unit: None }
    }

    /// Signal name.
    pub fn name(&self) -> &str {
        match self {
            CandidateSignal::Metric { name, .. }
            | CandidateSignal::Readiness { name, .. }
            | CandidateSignal::Incident { name, .. } => name,
        }
    }

    /// Signal value.
    pub fn value(&self) -> f64 {
        match self {
            CandidateSignal::Metric { value, .. }
            | CandidateSignal::Readiness { value, .. }
            | CandidateSignal::Incident { value, .. } => *value,
        }
    }
}

/// Severity reported by an incident signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalSeverity {
    Low,
    Medium,
    High,
    Critical,
}
