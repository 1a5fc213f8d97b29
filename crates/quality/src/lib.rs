//! Constraint & quality scoring
//!
//! Constraint pressure, step and program quality, risk grading and the
//! candidate admission gate.

#![warn(missing_docs)]

pub mod constraint;
pub mod step;
pub mod profile;
pub mod gate;

pub use constraint::{
    constraint_weight, constraint_score_value, compute_risk_index, mean_constraint_weight,
    heavy_constraint_fraction, scope_pressure, ScopePressure,
};
pub use step::step_quality_value;
pub use profile::{
    summarize_quality, summarize_program_quality, profile_constraint, profile_step,
    ProgramQualityReport, ConstraintProfile, StepProfile, ConstraintStatus, StepStatus, RiskGrade,
};
pub use gate::{create_quality_gate, passes_quality_gate, GateResult, GateFailure};

#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use recovery_core::{
        ConstraintBoundary, ConstraintId, ConstraintKind, ConstraintScope, CoordinationConstraint,
        CoordinationProgram, CoordinationStep, IncidentId, ProgramId, RunWindow, StepId, TenantId,
    };

    fn constraint(weight: f64, tags: usize, boundary: Option<(f64, f64)>) -> CoordinationConstraint {
        let mut c = CoordinationConstraint::new(
            ConstraintId::new("c").unwrap(),
            ConstraintKind::Region,
            ConstraintScope::Incident,
            weight,
        );
        for i in 0..tags {
            c = c.with_tag(format!("t{i}"));
        }
        if let Some((soft, hard)) = boundary {
            c = c.with_boundary(ConstraintBoundary {
                min_weight: 0.0,
                max_weight: 1.0,
                soft_limit: soft,
                hard_limit: hard,
            });
        }
        c
    }

    fn program(criticalities: &[f64]) -> CoordinationProgram {
        let start = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        criticalities.iter().enumerate().fold(
            CoordinationProgram::new(
                ProgramId::new("p").unwrap(),
                TenantId::new("t").unwrap(),
                IncidentId::new("i").unwrap(),
                RunWindow::new(start, start + Duration::minutes(30), "UTC"),
                start,
            ),
            |p, (i, c)| {
                p.with_step(
                    CoordinationStep::new(StepId::new(format!("s{i}")).unwrap(), "run", 120)
                        .with_criticality(*c),
                )
            },
        )
    }

    proptest! {
        #[test]
        fn prop_constraint_values_stay_in_bounds(
            weight in 0.0..=1.0f64,
            tags in 0..20usize,
            soft in -50.0..50.0f64,
            hard in -50.0..50.0f64,
        ) {
            let plain = constraint(weight, tags, None);
            let w = constraint_weight(&plain);
            prop_assert!((0.0..=100.0).contains(&w));

            let bounded = constraint(weight, tags, Some((soft, hard)));
            let score = constraint_score_value(&bounded);
            prop_assert!((0.0..=1.0).contains(&score));
            prop_assert!((0.0..=1.0).contains(&constraint_score_value(&plain)));
        }

        #[test]
        fn prop_criticality_never_improves_grade(
            criticalities in proptest::collection::vec(0.0..150.0f64, 1..8),
            which in any::<prop::sample::Index>(),
            bump in 0.0..200.0f64,
        ) {
            let before = summarize_program_quality(&program(&criticalities));

            let mut raised = criticalities.clone();
            let i = which.index(raised.len());
            raised[i] += bump;
            let after = summarize_program_quality(&program(&raised));

            prop_assert!(after.overall <= before.overall);
            prop_assert!(after.grade >= before.grade);
        }
    }
}
