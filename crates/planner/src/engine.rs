//! The planning engine - runs the full pipeline.

use sessionplan_core::{
    AllocationConstraints, ComplexityMetrics, QuotaSnapshot, RiskAssessment, SessionPlan, ValidationResult,
};
use tracing::{debug, info};
use crate::builder::PlanBuilder;
use crate::confidence::ConfidenceScorer;
use crate::dependency::{ensure_known_dependencies, ensure_unique_names};
use crate::optimizer::Optimizer;
use crate::quota::QuotaGuard;
use crate::validator::PlanValidator;
use crate::{PlannerConfig, Result, TaskCatalog, TaskSelector};

/// The session planner.
///
/// Runs the pipeline:
/// ```text
/// Select Tasks → Build → Optimize → Quota Guard → Score Confidence
/// ```
/// Every operation is a synchronous transformation over its inputs; the
/// planner holds no per-plan state.
#[derive(Debug, Clone, Default)]
pub struct SessionPlanner {
    catalog: TaskCatalog,
    config: PlannerConfig,
}

impl SessionPlanner {
    /// Create a planner with the standard catalog and default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different task catalog.
    pub fn with_catalog(mut self, catalog: TaskCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Use a different configuration.
    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// The task catalog.
    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    /// The configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Build a complete plan for a project.
    ///
    /// The quota guard measures against the current usage carried by the
    /// risk assessment.
    pub fn plan_sessions(&self, complexity: &ComplexityMetrics, risk: &RiskAssessment) -> Result<SessionPlan> {
        self.config.validate()?;
        info!(
            "Planning sessions (complexity {:.1}, risk {:.0}%)",
            complexity.overall, risk.overall
        );

        let tasks = TaskSelector::new(&self.catalog).select(complexity)?;
        info!("Selected {} tasks", tasks.len());

        let plan = PlanBuilder::new(complexity, risk, self.config.token_buffer).build(&tasks);
        ensure_known_dependencies(&plan.session_sequence, &self.catalog)?;
        debug!("Built plan {} with {} minutes", plan.id, plan.total_estimated_minutes);

        let plan = Optimizer::new(self.config.token_buffer).optimize(plan, complexity, risk);
        let plan = QuotaGuard::new(&self.config).enforce(plan, &risk.quota.current_usage);

        let confidence = ConfidenceScorer.score(complexity, risk, plan.recommendations.len());
        info!(
            "Plan {} ready: {} sessions, {} minutes, confidence {}",
            plan.id,
            plan.session_sequence.len(),
            plan.total_estimated_minutes,
            confidence
        );

        Ok(SessionPlan { confidence, ..plan })
    }

    /// Re-shape a plan to explicit ceilings or a preferred tier.
    ///
    /// Confidence is carried over unchanged.
    pub fn optimize_allocation(&self, plan: SessionPlan, constraints: &AllocationConstraints) -> Result<SessionPlan> {
        self.check_plan(&plan)?;
        if constraints.is_empty() {
            debug!("No allocation constraints for plan {}", plan.id);
            return Ok(plan);
        }

        let previous = plan.total_estimated_minutes;
        let plan = QuotaGuard::new(&self.config).constrain(plan, constraints);
        info!(
            "Re-optimized plan {}: {} -> {} minutes",
            plan.id, previous, plan.total_estimated_minutes
        );
        Ok(plan)
    }

    /// Check a plan against current quota usage.
    pub fn validate_plan(&self, plan: &SessionPlan, quotas: &QuotaSnapshot) -> Result<ValidationResult> {
        self.check_plan(plan)?;
        Ok(PlanValidator::new(&self.config).validate(plan, quotas))
    }

    fn check_plan(&self, plan: &SessionPlan) -> Result<()> {
        self.config.validate()?;
        ensure_unique_names(&plan.session_sequence)?;
        ensure_known_dependencies(&plan.session_sequence, &self.catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::assemble;
    use crate::dependency::is_dependency_order;
    use crate::PlanError;
    use sessionplan_core::{ModelTier, PlannedSession, TaskCategory, TierHours};

    fn struggling_project() -> ComplexityMetrics {
        let mut complexity = ComplexityMetrics::uniform(8.0);
        complexity.testing.coverage_percentage = 30.0;
        complexity.architecture.technical_debt_hours = 150.0;
        complexity
    }

    fn check_invariants(plan: &SessionPlan) {
        // Dependencies outside the plan force picks that may violate order
        let closed = plan
            .session_sequence
            .iter()
            .all(|s| s.dependencies.iter().all(|d| plan.session(d).is_some()));
        if closed {
            assert!(is_dependency_order(&plan.session_sequence));
        }
        let sum: u32 = plan.session_sequence.iter().map(|s| s.estimated_minutes).sum();
        assert_eq!(sum, plan.total_estimated_minutes);

        let percentages = plan.model_allocation.fast.percentage as u32 + plan.model_allocation.deep.percentage as u32;
        if plan.session_sequence.is_empty() {
            assert_eq!(percentages, 0);
        } else {
            assert_eq!(percentages, 100);
        }
        assert!((30..=95).contains(&plan.confidence));
        assert!(plan.session_sequence.iter().all(|s| (1..=10).contains(&s.priority)));
    }

    #[test]
    fn test_pipeline_invariants_across_inputs() {
        let planner = SessionPlanner::new();

        for overall in [1.0, 3.5, 5.0, 6.5, 8.0, 10.0] {
            for coverage in [10.0, 60.0, 90.0] {
                for risk_level in [10.0, 75.0, 95.0] {
                    let mut complexity = ComplexityMetrics::uniform(overall);
                    complexity.testing.coverage_percentage = coverage;
                    complexity.documentation.completeness_percentage = 100.0 - coverage;
                    complexity.architecture.technical_debt_hours = overall * 20.0;
                    let risk = RiskAssessment::flat(risk_level);

                    let plan = planner.plan_sessions(&complexity, &risk).unwrap();
                    check_invariants(&plan);
                }
            }
        }
    }

    #[test]
    fn test_struggling_project_boosts_testing_and_refactoring() {
        let planner = SessionPlanner::new();
        let plan = planner.plan_sessions(&struggling_project(), &RiskAssessment::flat(30.0)).unwrap();
        assert!(is_dependency_order(&plan.session_sequence));

        let categories: Vec<_> = plan.token_budget.by_category.iter().map(|c| c.category).collect();
        assert!(categories.contains(&TaskCategory::Testing));
        assert!(categories.contains(&TaskCategory::Refactoring));

        // 5 base + 2 at build time + 2 from the coverage rule
        assert_eq!(plan.session("Unit Test Suite").unwrap().priority, 9);
        // 6 base + 2 at build time + 2 from the debt rule
        assert_eq!(plan.session("Technical Debt Refactoring").unwrap().priority, 10);

        assert_eq!(plan.recommendations.len(), 2);
        assert!(plan.recommendations[0].contains("testing"));
        assert!(plan.recommendations[1].contains("refactoring"));

        // 80 - 15 (complexity) - 15 (debt) + 4 (two recommendations)
        assert_eq!(plan.confidence, 54);
        check_invariants(&plan);
    }

    #[test]
    fn test_deep_quota_overrun_is_corrected() {
        let planner = SessionPlanner::new();
        let mut risk = RiskAssessment::flat(30.0);
        risk.quota.current_usage = TierHours::new(0.0, 38.0);

        let plan = planner.plan_sessions(&struggling_project(), &risk).unwrap();

        assert_eq!(plan.sessions_on(ModelTier::Deep).count(), 0);
        assert!(plan.recommendations.iter().any(|r| r.starts_with("Reduced deep tier")));
        check_invariants(&plan);
    }

    #[test]
    fn test_guard_idempotent_on_pipeline_output() {
        let planner = SessionPlanner::new();
        let mut risk = RiskAssessment::flat(30.0);
        risk.quota.current_usage = TierHours::new(0.0, 33.0);

        let plan = planner.plan_sessions(&struggling_project(), &risk).unwrap();
        let again = QuotaGuard::new(planner.config()).enforce(plan.clone(), &risk.quota.current_usage);
        assert_eq!(again, plan);
    }

    #[test]
    fn test_high_quota_risk_keeps_everything_fast() {
        let planner = SessionPlanner::new();
        let plan = planner
            .plan_sessions(&ComplexityMetrics::uniform(9.0), &RiskAssessment::flat(90.0))
            .unwrap();
        assert_eq!(plan.model_allocation.deep.percentage, 0);
        assert_eq!(plan.model_allocation.fast.percentage, 100);
    }

    #[test]
    fn test_empty_catalog_gives_empty_plan() {
        let planner = SessionPlanner::new().with_catalog(TaskCatalog::new(Vec::new()).unwrap());
        let plan = planner
            .plan_sessions(&ComplexityMetrics::uniform(5.0), &RiskAssessment::flat(10.0))
            .unwrap();
        assert!(plan.session_sequence.is_empty());
        check_invariants(&plan);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PlannerConfig::new().with_safety_threshold(0.0);
        let planner = SessionPlanner::new().with_config(config);
        let err = planner
            .plan_sessions(&ComplexityMetrics::uniform(5.0), &RiskAssessment::flat(10.0))
            .unwrap_err();
        assert!(matches!(err, PlanError::InvalidConfig(_)));
    }

    #[test]
    fn test_cycle_is_placed_and_reported() {
        let sessions = vec![
            PlannedSession::new("A", ModelTier::Fast, 30, 1_000, 5).with_dependencies(vec!["B".to_string()]),
            PlannedSession::new("B", ModelTier::Fast, 30, 1_000, 5).with_dependencies(vec!["C".to_string()]),
            PlannedSession::new("C", ModelTier::Fast, 30, 1_000, 5).with_dependencies(vec!["A".to_string()]),
        ];
        let plan = assemble(crate::dependency::order_sessions(sessions), Vec::new(), 0.2);
        assert_eq!(plan.session_sequence.len(), 3);

        let quotas = QuotaSnapshot::new(TierHours::default(), TierHours::new(480.0, 40.0));
        let result = SessionPlanner::new().validate_plan(&plan, &quotas).unwrap();
        assert!(!result.is_valid);
        let error = &result.errors[0];
        assert!(error.contains('A') && error.contains('B') && error.contains('C'));
    }

    #[test]
    fn test_optimize_allocation_with_preference() {
        let planner = SessionPlanner::new();
        let plan = planner
            .plan_sessions(&struggling_project(), &RiskAssessment::flat(30.0))
            .unwrap();
        let deep_before = plan.model_allocation.deep.estimated_minutes;

        let constraints = AllocationConstraints {
            preferred_tier: Some(ModelTier::Deep),
            ..Default::default()
        };
        let optimized = planner.optimize_allocation(plan.clone(), &constraints).unwrap();

        assert_eq!(optimized.id, plan.id);
        assert_eq!(optimized.confidence, plan.confidence);
        assert_eq!(optimized.model_allocation.deep.estimated_minutes, deep_before);
        assert_eq!(
            optimized.model_allocation.fast.estimated_minutes,
            plan.model_allocation.fast.estimated_minutes - 600
        );
        assert_eq!(optimized.recommendations.len(), plan.recommendations.len() + 1);
        check_invariants(&optimized);
    }

    #[test]
    fn test_optimize_allocation_without_constraints_is_identity() {
        let planner = SessionPlanner::new();
        let plan = planner
            .plan_sessions(&ComplexityMetrics::uniform(5.0), &RiskAssessment::flat(10.0))
            .unwrap();
        let optimized = planner.optimize_allocation(plan.clone(), &AllocationConstraints::default()).unwrap();
        assert_eq!(optimized, plan);
    }

    #[test]
    fn test_unknown_dependency_is_a_configuration_error() {
        let sessions = vec![
            PlannedSession::new("Custom Work", ModelTier::Fast, 30, 1_000, 5)
                .with_dependencies(vec!["Missing Step".to_string()]),
        ];
        let plan = assemble(sessions, Vec::new(), 0.2);

        let err = SessionPlanner::new()
            .optimize_allocation(plan, &AllocationConstraints::default())
            .unwrap_err();
        assert_eq!(
            err,
            PlanError::UnknownDependency {
                session: "Custom Work".to_string(),
                dependency: "Missing Step".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_sessions_rejected() {
        let sessions = vec![
            PlannedSession::new("A", ModelTier::Fast, 30, 1_000, 5),
            PlannedSession::new("A", ModelTier::Deep, 30, 1_000, 5),
        ];
        let plan = assemble(sessions, Vec::new(), 0.2);
        let quotas = QuotaSnapshot::new(TierHours::default(), TierHours::new(480.0, 40.0));

        let err = SessionPlanner::new().validate_plan(&plan, &quotas).unwrap_err();
        assert_eq!(err, PlanError::DuplicateTask("A".to_string()));
    }
}
