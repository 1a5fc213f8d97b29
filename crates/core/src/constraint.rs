//! Constraint model - weighted operational limits.

use serde::{Deserialize, Serialize};
use crate::id::{ConstraintId, StepId};

/// A weighted operational limit scoped to a set of steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinationConstraint {
    /// Unique identifier
    pub id: ConstraintId,

    /// Kind of limit
    pub kind: ConstraintKind,

    /// Raw weight; always clamped before use
    pub weight: f64,

    /// Operational scope
    pub scope: ConstraintScope,

    /// Steps the constraint applies to
    #[serde(default)]
    pub affected_step_ids: Vec<StepId>,

    /// Free-form details
    #[serde(default)]
    pub details: String,

    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Optional limits
    #[serde(default)]
    pub boundary: Option<ConstraintBoundary>,
}

impl CoordinationConstraint {
    /// Create a constraint without affected steps or boundary.
    pub fn new(id: ConstraintId, kind: ConstraintKind, scope: ConstraintScope, weight: f64) -> Self {
        Self {
            id,
            kind,
            weight,
            scope,
            affected_step_ids: Vec::new(),
            details: String::new(),
            tags: Vec::new(),
            boundary: None,
        }
    }

    /// Add an affected step.
    pub fn affecting(mut self, step: StepId) -> Self {
        self.affected_step_ids.push(step);
        self
    }

    /// Set the details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set the boundary.
    pub fn with_boundary(mut self, boundary: ConstraintBoundary) -> Self {
        self.boundary = Some(boundary);
        self
    }

    /// Weight clamped to `[0, 1]`. NaN counts as zero.
    pub fn clamped_weight(&self) -> f64 {
        if self.weight.is_nan() {
            0.0
        } else {
            self.weight.clamp(0.0, 1.0)
        }
    }
}

/// Kinds of operational constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstraintKind {
    Dependency,
    Parallelism,
    Region,
    Tenant,
    ChangeFreeze,
}

/// Operational scope of a constraint or program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstraintScope {
    Incident,
    Maintenance,
    Security,
    Capacity,
}

impl ConstraintScope {
    /// Every scope, in declaration order.
    pub const ALL: [ConstraintScope; 4] = [
        ConstraintScope::Incident,
        ConstraintScope::Maintenance,
        ConstraintScope::Security,
        ConstraintScope::Capacity,
    ];

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintScope::Incident => "incident",
            ConstraintScope::Maintenance => "maintenance",
            ConstraintScope::Security => "security",
            ConstraintScope::Capacity => "capacity",
        }
    }
}

impl std::fmt::Display for ConstraintScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Soft and hard limits attached to a constraint.
///
/// `hard_limit >= soft_limit` is expected but not checked here; ingestion is
/// responsible for rejecting inverted boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintBoundary {
    /// Lowest acceptable weight
    pub min_weight: f64,

    /// Highest acceptable weight
    pub max_weight: f64,

    /// Limit that triggers warnings
    pub soft_limit: f64,

    /// Limit that must not be crossed
    pub hard_limit: f64,
}

impl ConstraintBoundary {
    /// Gap between hard and soft limit, floored at zero.
    pub fn headroom(&self) -> f64 {
        (self.hard_limit - self.soft_limit).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraint(weight: f64) -> CoordinationConstraint {
        CoordinationConstraint::new(
            ConstraintId::new("c1").unwrap(),
            ConstraintKind::Region,
            ConstraintScope::Incident,
            weight,
        )
    }

    #[test]
    fn test_clamped_weight() {
        assert_eq!(constraint(1.7).clamped_weight(), 1.0);
        assert_eq!(constraint(-0.3).clamped_weight(), 0.0);
        assert_eq!(constraint(f64::NAN).clamped_weight(), 0.0);
        assert_eq!(constraint(0.4).clamped_weight(), 0.4);
    }

    #[test]
    fn test_headroom_floors_inverted_limits() {
        let boundary = ConstraintBoundary {
            min_weight: 0.0,
            max_weight: 1.0,
            soft_limit: 10.0,
            hard_limit: 4.0,
        };
        assert_eq!(boundary.headroom(), 0.0);
    }

    #[test]
    fn test_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&ConstraintKind::ChangeFreeze).unwrap();
        assert_eq!(json, "\"change-freeze\"");
    }
}
