//! Simulation configuration.

use recovery_core::ConstraintId;

/// Configuration for the coordination simulator.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Most signals, and so candidate seeds, considered per run
    pub signal_limit: usize,
    /// Most candidates generated per run
    pub max_candidates: usize,
    /// Constraints known to be violated; any entry blocks the baseline decision
    pub violated_constraints: Vec<ConstraintId>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            signal_limit: 8,
            max_candidates: 5,
            violated_constraints: Vec::new(),
        }
    }
}

impl SimulationConfig {
    /// Create a new configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the signal limit.
    pub fn with_signal_limit(mut self, limit: usize) -> Self {
        self.signal_limit = limit;
        self
    }

    /// Set the candidate limit.
    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = max;
        self
    }

    /// Mark a constraint as violated.
    pub fn with_violated_constraint(mut self, id: ConstraintId) -> Self {
        if !self.violated_constraints.contains(&id) {
            self.violated_constraints.push(id);
        }
        self
    }

    /// Number of seeds to generate for a program with `step_count` steps.
    pub fn seed_limit(&self, step_count: usize) -> usize {
        self.signal_limit.min(step_count).min(self.max_candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_limit_takes_smallest_bound() {
        let config = SimulationConfig::new().with_signal_limit(3).with_max_candidates(10);
        assert_eq!(config.seed_limit(7), 3);
        assert_eq!(config.seed_limit(2), 2);
        assert_eq!(config.with_max_candidates(1).seed_limit(7), 1);
    }

    #[test]
    fn test_violated_constraints_are_unique() {
        let id = ConstraintId::new("freeze").unwrap();
        let config = SimulationConfig::new()
            .with_violated_constraint(id.clone())
            .with_violated_constraint(id);
        assert_eq!(config.violated_constraints.len(), 1);
    }
}
