//! Step model - the atomic recovery action.

use serde::{Deserialize, Serialize};
use crate::id::StepId;

/// A single recovery action inside a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinationStep {
    /// Unique identifier
    pub id: StepId,

    /// Command the executor will eventually run
    pub command: String,

    /// Human readable title
    pub title: String,

    /// Priority tier
    pub priority: StepPriority,

    /// Expected duration in seconds
    pub duration_seconds: u64,

    /// Steps that must finish first
    #[serde(default)]
    pub requires: Vec<StepId>,

    /// Steps that may stand in for this one
    #[serde(default)]
    pub optional_fallback_ids: Vec<StepId>,

    /// Criticality weight (>= 0)
    #[serde(default)]
    pub criticality: f64,

    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CoordinationStep {
    /// Create a step with no dependencies.
    pub fn new(id: StepId, command: impl Into<String>, duration_seconds: u64) -> Self {
        let command = command.into();
        Self {
            id,
            title: command.clone(),
            command,
            priority: StepPriority::Silver,
            duration_seconds,
            requires: Vec::new(),
            optional_fallback_ids: Vec::new(),
            criticality: 0.0,
            tags: Vec::new(),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the priority tier.
    pub fn with_priority(mut self, priority: StepPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Add a dependency. Duplicates are ignored.
    pub fn requiring(mut self, dependency: StepId) -> Self {
        if !self.requires.contains(&dependency) {
            self.requires.push(dependency);
        }
        self
    }

    /// Add a fallback step.
    pub fn with_fallback(mut self, fallback: StepId) -> Self {
        self.optional_fallback_ids.push(fallback);
        self
    }

    /// Set the criticality. Negative values are floored at zero.
    pub fn with_criticality(mut self, criticality: f64) -> Self {
        self.criticality = criticality.max(0.0);
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Scheduling cost used by critical-path estimation.
    pub fn cost(&self) -> f64 {
        self.duration_seconds as f64 + self.criticality.max(0.0)
    }
}

/// Priority tiers, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepPriority {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl StepPriority {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepPriority::Bronze => "bronze",
            StepPriority::Silver => "silver",
            StepPriority::Gold => "gold",
            StepPriority::Platinum => "platinum",
        }
    }
}
