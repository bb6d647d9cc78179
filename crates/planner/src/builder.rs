//! Plan builder - turns selected tasks into an ordered, aggregated plan.

use sessionplan_core::{
    CategoryBudget, ComplexityMetrics, ModelAllocation, ModelTier, PlanId, PlannedSession,
    RiskAssessment, SessionPlan, TaskCategory, TierAllocation, TierTokens, TokenBudget,
};
use tracing::debug;
use crate::dependency::order_sessions;
use crate::selector::SelectedTask;

/// Quota risk above which everything runs on the fast tier.
const QUOTA_RISK_FORCE_FAST: f64 = 70.0;

/// Builds planned sessions from selected tasks.
pub struct PlanBuilder<'a> {
    complexity: &'a ComplexityMetrics,
    risk: &'a RiskAssessment,
    token_buffer: f64,
}

impl<'a> PlanBuilder<'a> {
    /// Create a builder for one set of inputs.
    pub fn new(complexity: &'a ComplexityMetrics, risk: &'a RiskAssessment, token_buffer: f64) -> Self {
        Self {
            complexity,
            risk,
            token_buffer,
        }
    }

    /// Tier for a task. The first matching rule wins.
    pub fn select_tier(&self, task: &SelectedTask) -> ModelTier {
        let complexity = task.template.base_complexity;
        let category = task.category();

        if self.risk.quota.probability > QUOTA_RISK_FORCE_FAST {
            return ModelTier::Fast;
        }
        if complexity >= 8 && task.template.preferred_tier.resolve() == ModelTier::Deep {
            return ModelTier::Deep;
        }
        if matches!(category, TaskCategory::Analysis | TaskCategory::Implementation) && complexity >= 7 {
            return ModelTier::Deep;
        }
        if matches!(category, TaskCategory::Testing | TaskCategory::Documentation) || complexity <= 5 {
            return ModelTier::Fast;
        }
        task.template.preferred_tier.resolve()
    }

    /// Priority for a task, in [1, 10].
    pub fn priority(&self, task: &SelectedTask) -> u8 {
        let mut priority = task.template.base_complexity as i32;

        match task.category() {
            TaskCategory::Analysis if self.complexity.overall > 7.0 => priority += 3,
            TaskCategory::Testing if self.complexity.testing.coverage_percentage < 50.0 => priority += 2,
            TaskCategory::Refactoring if self.complexity.architecture.technical_debt_hours > 100.0 => priority += 2,
            _ => {}
        }
        if self.risk.overall > 70.0 && task.template.dependencies.is_empty() {
            priority += 1;
        }

        priority.clamp(1, 10) as u8
    }

    /// Turn one task into a session.
    pub fn session(&self, task: &SelectedTask) -> PlannedSession {
        let tier = self.select_tier(task);
        let priority = self.priority(task);
        debug!("Task '{}' -> {} tier, priority {}", task.name(), tier, priority);

        PlannedSession::new(task.name(), tier, task.estimated_minutes, task.estimated_tokens, priority)
            .with_dependencies(task.template.dependencies.clone())
    }

    /// Build the ordered plan. Confidence is filled in later by the pipeline.
    pub fn build(&self, tasks: &[SelectedTask]) -> SessionPlan {
        let sessions: Vec<PlannedSession> = tasks.iter().map(|t| self.session(t)).collect();
        assemble(order_sessions(sessions), Vec::new(), self.token_buffer)
    }
}

/// Create a fresh plan around an already-ordered session sequence.
pub fn assemble(sessions: Vec<PlannedSession>, recommendations: Vec<String>, token_buffer: f64) -> SessionPlan {
    SessionPlan {
        id: PlanId::new(),
        created_at: chrono::Utc::now(),
        total_estimated_minutes: total_minutes(&sessions),
        model_allocation: allocate(&sessions),
        token_budget: budget(&sessions, token_buffer),
        session_sequence: sessions,
        recommendations,
        confidence: 0,
    }
}

/// Replace a plan's sessions wholesale and recompute every aggregate.
///
/// Identity, recommendations and confidence carry over.
pub fn with_sessions(plan: SessionPlan, sessions: Vec<PlannedSession>, token_buffer: f64) -> SessionPlan {
    SessionPlan {
        total_estimated_minutes: total_minutes(&sessions),
        model_allocation: allocate(&sessions),
        token_budget: budget(&sessions, token_buffer),
        session_sequence: sessions,
        ..plan
    }
}

/// Sum of session durations.
pub fn total_minutes(sessions: &[PlannedSession]) -> u32 {
    sessions.iter().map(|s| s.estimated_minutes).sum()
}

/// Per-tier minutes and integer percentages that sum to exactly 100 (or 0).
pub fn allocate(sessions: &[PlannedSession]) -> ModelAllocation {
    let aggregate = |tier: ModelTier| TierAllocation {
        estimated_minutes: sessions.iter().filter(|s| s.tier == tier).map(|s| s.estimated_minutes).sum(),
        percentage: 0,
        sessions: sessions.iter().filter(|s| s.tier == tier).map(|s| s.name.clone()).collect(),
    };

    let mut fast = aggregate(ModelTier::Fast);
    let mut deep = aggregate(ModelTier::Deep);
    let total = fast.estimated_minutes + deep.estimated_minutes;

    if total > 0 {
        fast.percentage = (fast.estimated_minutes as f64 * 100.0 / total as f64).round() as u8;
        deep.percentage = 100 - fast.percentage;
    }

    ModelAllocation { fast, deep }
}

/// Token totals with the uncertainty buffer, per tier and per category.
pub fn budget(sessions: &[PlannedSession], token_buffer: f64) -> TokenBudget {
    let by_tier = TierTokens {
        fast: sessions.iter().filter(|s| s.tier == ModelTier::Fast).map(|s| s.estimated_tokens).sum(),
        deep: sessions.iter().filter(|s| s.tier == ModelTier::Deep).map(|s| s.estimated_tokens).sum(),
    };

    let by_category = TaskCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let matching: Vec<_> = sessions.iter().filter(|s| s.category() == Some(category)).collect();
            if matching.is_empty() {
                return None;
            }
            Some(CategoryBudget {
                category,
                tokens: matching.iter().map(|s| s.estimated_tokens).sum(),
                confidence: category.budget_confidence(),
            })
        })
        .collect();

    TokenBudget {
        total_tokens: (by_tier.total() as f64 * (1.0 + token_buffer)).round() as u64,
        by_tier,
        by_category,
    }
}
