//! Plan budgets derived from the run window and tenant pressure.

use recovery_core::{CoordinationProgram, RunWindow, TenantId};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Pressure assumed when the tenant id carries no numeric suffix.
pub const DEFAULT_TENANT_PRESSURE: u32 = 1;
/// Upper bound for budgeted parallelism.
pub const MAX_BUDGET_PARALLELISM: u32 = 6;
/// Lower bound for the runtime budget.
pub const MIN_RUNTIME_MINUTES: u32 = 10;

/// Limits candidates are scored against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanBudget {
    /// Steps a plan may carry
    pub max_step_count: u32,
    /// Concurrent steps
    pub max_parallelism: u32,
    /// Runtime allowance
    pub max_runtime_minutes: u32,
}

impl Default for PlanBudget {
    fn default() -> Self {
        Self {
            max_step_count: 1,
            max_parallelism: 1,
            max_runtime_minutes: MIN_RUNTIME_MINUTES,
        }
    }
}

impl PlanBudget {
    /// Create a new budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the step allowance.
    pub fn with_max_step_count(mut self, max: u32) -> Self {
        self.max_step_count = max;
        self
    }

    /// Set the parallelism allowance.
    pub fn with_max_parallelism(mut self, max: u32) -> Self {
        self.max_parallelism = max;
        self
    }

    /// Set the runtime allowance.
    pub fn with_max_runtime_minutes(mut self, minutes: u32) -> Self {
        self.max_runtime_minutes = minutes;
        self
    }

    /// Budget for a whole program.
    pub fn for_program(program: &CoordinationProgram) -> Self {
        budget_from_window(&program.tenant, program.steps.len(), &program.run_window)
    }
}

fn suffix_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+)$").ok()).as_ref()
}

/// Pressure encoded as a trailing number in the tenant id.
///
/// `tenant-7` has pressure 7. Ids without a trailing number, or with one
/// too large to parse, fall back to [`DEFAULT_TENANT_PRESSURE`].
pub fn tenant_pressure(tenant: &TenantId) -> u32 {
    suffix_pattern()
        .and_then(|pattern| pattern.captures(tenant.as_str()))
        .and_then(|captures| captures.get(1))
        .and_then(|suffix| suffix.as_str().parse::<u32>().ok())
        .unwrap_or(DEFAULT_TENANT_PRESSURE)
}

/// Derive a plan budget from step count, run window and tenant pressure.
pub fn budget_from_window(tenant: &TenantId, step_count: usize, window: &RunWindow) -> PlanBudget {
    let pressure = tenant_pressure(tenant);
    let steps = u32::try_from(step_count).unwrap_or(u32::MAX);
    // float -> int casts saturate
    let window_minutes = window.minutes().ceil() as u32;

    PlanBudget {
        max_step_count: steps.saturating_add(pressure),
        max_parallelism: (steps / 2).clamp(1, MAX_BUDGET_PARALLELISM),
        max_runtime_minutes: window_minutes
            .saturating_add(pressure.saturating_mul(5))
            .max(MIN_RUNTIME_MINUTES),
    }
}
