//! Coordination simulation - a synthetic pass over a program that estimates
//! its timeline and surfaces diagnostics before anything executes.

#![warn(missing_docs)]

pub mod config;
pub mod diagnostics;
pub mod workflow;
pub mod simulator;

pub use config::SimulationConfig;
pub use diagnostics::{Diagnostic, DiagnosticSeverity, codes, count_severity};
pub use workflow::{WorkflowGraph, WorkflowNode, timeline_minutes};
pub use simulator::{CoordinationSimulator, SimulationResult, simulate_coordination_run};

#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use recovery_core::{
        CoordinationProgram, CoordinationStep, FixedClock, IncidentId, ProgramId, RunWindow, StepId,
        TenantId,
    };
    use std::sync::Arc;

    fn program(shapes: &[(u64, Vec<usize>)]) -> CoordinationProgram {
        let start = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        let base = CoordinationProgram::new(
            ProgramId::new("p").unwrap(),
            TenantId::new("t-3").unwrap(),
            IncidentId::new("i").unwrap(),
            RunWindow::new(start, start + Duration::minutes(30), "UTC"),
            start,
        );
        shapes.iter().enumerate().fold(base, |p, (i, (duration, deps))| {
            // Arbitrary references, cycles and dangling ids included
            let step = deps.iter().fold(
                CoordinationStep::new(StepId::new(format!("s{i}")).unwrap(), "run", *duration),
                |s, d| s.requiring(StepId::new(format!("s{d}")).unwrap()),
            );
            p.with_step(step)
        })
    }

    proptest! {
        #[test]
        fn prop_simulation_is_deterministic(
            shapes in proptest::collection::vec((1..900u64, proptest::collection::vec(0..10usize, 0..3)), 0..8),
            limit in 0..6usize,
        ) {
            let program = program(&shapes);
            let clock = FixedClock(Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap());
            let simulator = CoordinationSimulator::new()
                .with_clock(Arc::new(clock))
                .with_config(SimulationConfig::new().with_max_candidates(limit));

            let first = simulator.simulate(&program);
            let second = simulator.simulate(&program);
            prop_assert_eq!(&first.diagnostics, &second.diagnostics);
            prop_assert_eq!(&first.selected, &second.selected);
            prop_assert!(first.candidate_count <= limit.min(program.steps.len()));
            prop_assert_eq!(first.projected_minutes, first.workflow.timeline_minutes);
        }
    }
}
