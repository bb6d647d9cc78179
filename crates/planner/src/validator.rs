//! Plan validation.
//!
//! Findings are advisory: an invalid plan is still a plan, and nothing here
//! fails.

use sessionplan_core::{ModelTier, QuotaSnapshot, SessionPlan, ValidationResult};
use tracing::debug;
use crate::dependency::find_cycles;
use crate::quota::QUOTA_EPSILON_HOURS;
use crate::PlannerConfig;

/// Re-checks a plan against quota usage and structural rules.
pub struct PlanValidator<'a> {
    config: &'a PlannerConfig,
}

impl<'a> PlanValidator<'a> {
    /// Create a validator.
    pub fn new(config: &'a PlannerConfig) -> Self {
        Self { config }
    }

    /// Run every check.
    pub fn validate(&self, plan: &SessionPlan, quotas: &QuotaSnapshot) -> ValidationResult {
        let mut result = ValidationResult::new();

        for tier in ModelTier::ALL {
            self.check_tier(plan, quotas, tier, &mut result);
        }
        self.check_cycles(plan, &mut result);
        self.check_length(plan, &mut result);
        self.check_confidence(plan, &mut result);

        debug!(
            "Validated plan {}: {} errors, {} warnings",
            plan.id,
            result.errors.len(),
            result.warnings.len()
        );
        result
    }

    fn check_tier(&self, plan: &SessionPlan, quotas: &QuotaSnapshot, tier: ModelTier, result: &mut ValidationResult) {
        let usage = quotas.get(tier);
        let limit = if usage.limit_hours > 0.0 {
            usage.limit_hours
        } else {
            self.config.weekly_limits.get(tier)
        };
        let projected = usage.used_hours + plan.tier_hours(tier);
        let share = projected / limit * 100.0;

        if projected > limit * self.config.safety_threshold + QUOTA_EPSILON_HOURS {
            result.error(format!(
                "{} tier projected at {:.1}h of {:.0}h ({:.0}%), above the {:.0}% safety threshold",
                tier,
                projected,
                limit,
                share,
                self.config.safety_threshold * 100.0
            ));
            result.suggest(format!("Move work off the {} tier or defer sessions to next week", tier));
        } else if projected > limit * self.config.warning_threshold + QUOTA_EPSILON_HOURS {
            result.warning(format!(
                "{} tier projected at {:.1}h of {:.0}h ({:.0}%)",
                tier, projected, limit, share
            ));
        }
    }

    fn check_cycles(&self, plan: &SessionPlan, result: &mut ValidationResult) {
        for cycle in find_cycles(&plan.session_sequence) {
            result.error(format!("Circular dependency: {}", cycle.join(" -> ")));
        }
    }

    fn check_length(&self, plan: &SessionPlan, result: &mut ValidationResult) {
        if plan.total_estimated_minutes > self.config.max_plan_minutes {
            result.warning(format!(
                "Plan takes {:.1} hours, longer than the {:.1}-hour maximum",
                plan.total_hours(),
                self.config.max_plan_minutes as f64 / 60.0
            ));
            result.suggest("Split the plan into phases");
        }
    }

    fn check_confidence(&self, plan: &SessionPlan, result: &mut ValidationResult) {
        if plan.confidence < self.config.min_confidence {
            result.warning(format!("Low plan confidence ({}%)", plan.confidence));
            result.suggest("Run more analysis or reduce scope to raise confidence");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::assemble;
    use sessionplan_core::{PlannedSession, TierHours};

    fn session(name: &str, tier: ModelTier, minutes: u32, deps: &[&str]) -> PlannedSession {
        PlannedSession::new(name, tier, minutes, 1_000, 5)
            .with_dependencies(deps.iter().map(|d| d.to_string()).collect())
    }

    fn plan(sessions: Vec<PlannedSession>, confidence: u8) -> SessionPlan {
        let mut plan = assemble(sessions, Vec::new(), 0.2);
        plan.confidence = confidence;
        plan
    }

    fn snapshot(fast: f64, deep: f64) -> QuotaSnapshot {
        QuotaSnapshot::new(TierHours::new(fast, deep), TierHours::new(480.0, 40.0))
    }

    #[test]
    fn test_clean_plan_is_valid() {
        let config = PlannerConfig::default();
        let plan = plan(vec![session("A", ModelTier::Fast, 60, &[])], 80);

        let result = PlanValidator::new(&config).validate(&plan, &snapshot(0.0, 0.0));
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_cycle_reported_with_path() {
        let config = PlannerConfig::default();
        let plan = plan(
            vec![
                session("A", ModelTier::Fast, 30, &["B"]),
                session("B", ModelTier::Fast, 30, &["C"]),
                session("C", ModelTier::Fast, 30, &["A"]),
            ],
            80,
        );

        let result = PlanValidator::new(&config).validate(&plan, &snapshot(0.0, 0.0));
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["Circular dependency: A -> B -> C -> A".to_string()]);
    }

    #[test]
    fn test_quota_error_and_warning() {
        let config = PlannerConfig::default();
        let plan = plan(vec![session("A", ModelTier::Deep, 120, &[])], 80);
        let validator = PlanValidator::new(&config);

        // 35 + 2 = 37h > 36h
        let result = validator.validate(&plan, &snapshot(0.0, 35.0));
        assert!(!result.is_valid);
        assert!(result.errors[0].starts_with("deep tier"));

        // 31 + 2 = 33h: above 32h warning, below 36h
        let result = validator.validate(&plan, &snapshot(0.0, 31.0));
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_overlong_plan_warns() {
        let config = PlannerConfig::default();
        let plan = plan(vec![session("A", ModelTier::Fast, 700, &[])], 80);

        let result = PlanValidator::new(&config).validate(&plan, &snapshot(0.0, 0.0));
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.suggestions, vec!["Split the plan into phases".to_string()]);
    }

    #[test]
    fn test_low_confidence_warns() {
        let config = PlannerConfig::default();
        let plan = plan(vec![session("A", ModelTier::Fast, 60, &[])], 40);

        let result = PlanValidator::new(&config).validate(&plan, &snapshot(0.0, 0.0));
        assert!(result.is_valid);
        assert!(result.warnings[0].contains("40%"));
        assert_eq!(result.suggestions.len(), 1);
    }
}
