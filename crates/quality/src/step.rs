//! Step quality scoring.

use crate::constraint::clamp_unit;
use recovery_core::CoordinationStep;

const DURATION_CEILING_SECONDS: f64 = 600.0;
const CRITICALITY_CEILING: f64 = 100.0;
const TAG_CEILING: f64 = 10.0;

/// Quality of a single step in `[0, 1]`.
///
/// 50% duration, 30% criticality, 20% tag density. Longer, more critical and
/// more heavily tagged steps score lower.
pub fn step_quality_value(step: &CoordinationStep) -> f64 {
    let duration = clamp_unit(1.0 - step.duration_seconds as f64 / DURATION_CEILING_SECONDS);
    let criticality = clamp_unit(1.0 - step.criticality / CRITICALITY_CEILING);
    let tags = clamp_unit(1.0 - step.tags.len() as f64 / TAG_CEILING);
    clamp_unit(duration * 0.5 + criticality * 0.3 + tags * 0.2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recovery_core::StepId;

    fn step(duration: u64) -> CoordinationStep {
        CoordinationStep::new(StepId::new("s").unwrap(), "restart", duration)
    }

    #[test]
    fn test_short_plain_step_scores_high() {
        // 0.5 * (1 - 60/600) + 0.3 + 0.2
        assert!((step_quality_value(&step(60)) - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_long_step_floors_duration_term() {
        assert!((step_quality_value(&step(1200)) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_criticality_and_tags_lower_score() {
        let s = step(0).with_criticality(50.0).with_tag("db").with_tag("primary");
        // 0.5 + 0.3 * 0.5 + 0.2 * 0.8
        assert!((step_quality_value(&s) - 0.81).abs() < 1e-9);
    }
}
