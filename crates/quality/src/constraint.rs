//! Constraint weighting, scoring and pressure.

use recovery_core::{ConstraintScope, CoordinationConstraint};
use serde::Serialize;

/// Tags at which the tag term of a constraint score saturates.
const CONSTRAINT_TAG_SATURATION: f64 = 8.0;

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Weight of a constraint on a 0-100 scale, plus the boundary headroom when a
/// boundary is present.
pub fn constraint_weight(constraint: &CoordinationConstraint) -> f64 {
    let base = constraint.clamped_weight() * 100.0;
    match &constraint.boundary {
        Some(boundary) => base + boundary.headroom(),
        None => base,
    }
}

/// Quality contribution of a constraint in `[0, 1]`.
///
/// Mean of the inverse weight, the tag density and the boundary headroom
/// term. A constraint without a boundary scores the best headroom term.
pub fn constraint_score_value(constraint: &CoordinationConstraint) -> f64 {
    let inverse_weight = 1.0 - constraint.clamped_weight();
    let tags = clamp_unit(constraint.tags.len() as f64 / CONSTRAINT_TAG_SATURATION);
    let headroom = match &constraint.boundary {
        Some(boundary) => clamp_unit(boundary.headroom() / boundary.hard_limit.abs().max(1.0)),
        None => 1.0,
    };
    clamp_unit((inverse_weight + tags + headroom) / 3.0)
}

/// Aggregate risk of a constraint set in `[0, 1]`.
///
/// `sum(weights) / (count * 1.25 + max(weight))`; zero for no constraints.
pub fn compute_risk_index(constraints: &[CoordinationConstraint]) -> f64 {
    if constraints.is_empty() {
        return 0.0;
    }
    let weights: Vec<f64> = constraints.iter().map(|c| c.clamped_weight()).collect();
    let total: f64 = weights.iter().sum();
    let max = weights.iter().copied().fold(0.0, f64::max);
    let denominator = constraints.len() as f64 * 1.25 + max;
    clamp_unit(total / denominator)
}

/// Mean clamped weight of every constraint, zero for none.
pub fn mean_constraint_weight(constraints: &[CoordinationConstraint]) -> f64 {
    if constraints.is_empty() {
        return 0.0;
    }
    constraints.iter().map(|c| c.clamped_weight()).sum::<f64>() / constraints.len() as f64
}

/// Fraction of constraints heavier than `threshold`.
pub fn heavy_constraint_fraction(constraints: &[CoordinationConstraint], threshold: f64) -> f64 {
    if constraints.is_empty() {
        return 0.0;
    }
    let heavy = constraints.iter().filter(|c| c.clamped_weight() > threshold).count();
    heavy as f64 / constraints.len() as f64
}

/// Pressure a scope is under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopePressure {
    /// Scope
    pub scope: ConstraintScope,
    /// Number of constraints in the scope
    pub constraints: usize,
    /// Mean clamped weight of those constraints
    pub pressure: f64,
}

/// Normalize constraint weights into per-scope pressure.
///
/// Only scopes with at least one constraint are returned, in scope
/// declaration order.
pub fn scope_pressure(constraints: &[CoordinationConstraint]) -> Vec<ScopePressure> {
    ConstraintScope::ALL
        .iter()
        .filter_map(|scope| {
            let weights: Vec<f64> = constraints
                .iter()
                .filter(|c| c.scope == *scope)
                .map(|c| c.clamped_weight())
                .collect();
            if weights.is_empty() {
                return None;
            }
            Some(ScopePressure {
                scope: *scope,
                constraints: weights.len(),
                pressure: weights.iter().sum::<f64>() / weights.len() as f64,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use recovery_core::{ConstraintBoundary, ConstraintId, ConstraintKind};

    fn constraint(name: &str, weight: f64, scope: ConstraintScope) -> CoordinationConstraint {
        CoordinationConstraint::new(
            ConstraintId::new(name).unwrap(),
            ConstraintKind::Parallelism,
            scope,
            weight,
        )
    }

    fn boundary(soft: f64, hard: f64) -> ConstraintBoundary {
        ConstraintBoundary {
            min_weight: 0.0,
            max_weight: 1.0,
            soft_limit: soft,
            hard_limit: hard,
        }
    }

    #[test]
    fn test_constraint_weight_without_boundary() {
        assert_eq!(constraint_weight(&constraint("c", 0.25, ConstraintScope::Incident)), 25.0);
        assert_eq!(constraint_weight(&constraint("c", 3.0, ConstraintScope::Incident)), 100.0);
    }

    #[test]
    fn test_constraint_weight_adds_headroom() {
        let c = constraint("c", 0.5, ConstraintScope::Incident).with_boundary(boundary(2.0, 6.0));
        assert_eq!(constraint_weight(&c), 54.0);

        let inverted = constraint("c", 0.5, ConstraintScope::Incident).with_boundary(boundary(6.0, 2.0));
        assert_eq!(constraint_weight(&inverted), 50.0);
    }

    #[test]
    fn test_constraint_score_value() {
        // (1 - 0.4 + 0 + 1) / 3
        let plain = constraint("c", 0.4, ConstraintScope::Incident);
        assert!((constraint_score_value(&plain) - 1.6 / 3.0).abs() < 1e-9);

        // tight boundary: headroom term 0
        let tight = constraint("c", 0.0, ConstraintScope::Incident)
            .with_tag("a")
            .with_tag("b")
            .with_boundary(boundary(5.0, 5.0));
        assert!((constraint_score_value(&tight) - (1.0 + 0.25) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_risk_index() {
        assert_eq!(compute_risk_index(&[]), 0.0);

        let single = [constraint("c", 1.0, ConstraintScope::Incident)];
        assert!((compute_risk_index(&single) - 1.0 / 2.25).abs() < 1e-9);

        let pair = [
            constraint("a", 0.5, ConstraintScope::Incident),
            constraint("b", 0.3, ConstraintScope::Security),
        ];
        assert!((compute_risk_index(&pair) - 0.8 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_scope_pressure_groups_by_scope() {
        let constraints = [
            constraint("a", 0.2, ConstraintScope::Security),
            constraint("b", 0.6, ConstraintScope::Security),
            constraint("c", 0.9, ConstraintScope::Incident),
        ];
        let pressure = scope_pressure(&constraints);
        assert_eq!(pressure.len(), 2);
        assert_eq!(pressure[0].scope, ConstraintScope::Incident);
        assert_eq!(pressure[1].scope, ConstraintScope::Security);
        assert_eq!(pressure[1].constraints, 2);
        assert!((pressure[1].pressure - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_heavy_fraction() {
        let constraints = [
            constraint("a", 0.51, ConstraintScope::Security),
            constraint("b", 0.5, ConstraintScope::Security),
        ];
        assert_eq!(heavy_constraint_fraction(&constraints, 0.5), 0.5);
        assert_eq!(heavy_constraint_fraction(&[], 0.5), 0.0);
    }
}
