//! Plan optimizer - an ordered list of conditional rules.
//!
//! Conditions look at the original complexity and risk inputs, never at the
//! evolving plan. Every qualifying rule runs, in priority order, on the plan
//! the previous rule produced.

use std::cmp::Reverse;
use std::collections::HashSet;
use sessionplan_core::{ComplexityMetrics, ModelTier, PlannedSession, RiskAssessment, SessionPlan, TaskCategory};
use tracing::{debug, info};
use crate::builder::with_sessions;
use crate::dependency::order_sessions;

/// Name of the session injected when documentation is badly lacking.
pub const DEFAULT_DOCUMENTATION_SESSION: &str = "Project Documentation";

/// Inputs the rule conditions are evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Complexity signals
    pub complexity: &'a ComplexityMetrics,
    /// Risk signals
    pub risk: &'a RiskAssessment,
}

/// What a rule did: the replacement sequence and a recommendation.
type RuleOutput = Option<(Vec<PlannedSession>, String)>;

/// A (condition, transform) pair.
pub struct OptimizationRule {
    /// Rule name, for logs
    pub name: &'static str,
    /// Higher runs first
    pub priority: u8,
    /// Whether the sequence must be re-ordered after the transform
    pub reorders: bool,
    condition: fn(&RuleContext) -> bool,
    transform: fn(&[PlannedSession], &RuleContext) -> RuleOutput,
}

impl OptimizationRule {
    /// Whether the rule applies to these inputs.
    pub fn applies(&self, ctx: &RuleContext) -> bool {
        (self.condition)(ctx)
    }
}

/// Applies optimization rules to a plan.
pub struct Optimizer {
    rules: Vec<OptimizationRule>,
    token_buffer: f64,
}

impl Optimizer {
    /// Create an optimizer with the standard rule set.
    pub fn new(token_buffer: f64) -> Self {
        let mut rules = standard_rules();
        rules.sort_by_key(|r| Reverse(r.priority));
        Self { rules, token_buffer }
    }

    /// Rules in the order they run.
    pub fn rules(&self) -> &[OptimizationRule] {
        &self.rules
    }

    /// Names of the rules whose conditions hold.
    pub fn applicable(&self, ctx: &RuleContext) -> Vec<&'static str> {
        self.rules.iter().filter(|r| r.applies(ctx)).map(|r| r.name).collect()
    }

    /// Run every qualifying rule in order.
    pub fn optimize(&self, plan: SessionPlan, complexity: &ComplexityMetrics, risk: &RiskAssessment) -> SessionPlan {
        let ctx = RuleContext { complexity, risk };
        let mut plan = plan;

        for rule in self.rules.iter().filter(|r| r.applies(&ctx)) {
            let Some((sessions, recommendation)) = (rule.transform)(&plan.session_sequence, &ctx) else {
                debug!("Rule '{}' applies but changes nothing", rule.name);
                continue;
            };

            let sessions = if rule.reorders { order_sessions(sessions) } else { sessions };
            info!("Applied optimization rule '{}'", rule.name);

            plan = with_sessions(plan, sessions, self.token_buffer);
            plan.recommendations.push(recommendation);
        }

        plan
    }
}

fn standard_rules() -> Vec<OptimizationRule> {
    vec![
        OptimizationRule {
            name: "shift-deep-to-fast",
            priority: 100,
            reorders: false,
            condition: |ctx| ctx.risk.quota.probability > 70.0,
            transform: shift_deep_to_fast,
        },
        OptimizationRule {
            name: "parallelize",
            priority: 90,
            reorders: false,
            condition: |ctx| ctx.risk.time.probability > 80.0,
            transform: parallelize,
        },
        OptimizationRule {
            name: "boost-testing",
            priority: 80,
            reorders: true,
            condition: |ctx| ctx.complexity.testing.coverage_percentage < 50.0,
            transform: boost_testing,
        },
        OptimizationRule {
            name: "boost-refactoring",
            priority: 70,
            reorders: true,
            condition: |ctx| ctx.complexity.architecture.technical_debt_hours > 100.0,
            transform: boost_refactoring,
        },
        OptimizationRule {
            name: "add-documentation",
            priority: 60,
            reorders: true,
            condition: |ctx| ctx.complexity.documentation.completeness_percentage < 40.0,
            transform: add_documentation,
        },
    ]
}

/// Indices of the sessions on a tier, lowest priority first.
///
/// Ties put the session later in the sequence first.
pub(crate) fn lowest_priority(sessions: &[PlannedSession], tier: ModelTier) -> Vec<usize> {
    let mut candidates: Vec<usize> = (0..sessions.len()).filter(|&i| sessions[i].tier == tier).collect();
    candidates.sort_by_key(|&i| (sessions[i].priority, Reverse(i)));
    candidates
}

fn shift_deep_to_fast(sessions: &[PlannedSession], _ctx: &RuleContext) -> RuleOutput {
    let deep = lowest_priority(sessions, ModelTier::Deep);
    let count = (deep.len() as f64 * 0.7).ceil() as usize;
    if count == 0 {
        return None;
    }
    let moved: HashSet<usize> = deep.into_iter().take(count).collect();

    let sessions = sessions
        .iter()
        .enumerate()
        .map(|(i, s)| if moved.contains(&i) { s.reassigned(ModelTier::Fast, 0.8, 1.2) } else { s.clone() })
        .collect();

    Some((
        sessions,
        format!("Moved {} deep-tier sessions to the fast tier to reduce quota pressure", count),
    ))
}

fn parallelize(sessions: &[PlannedSession], _ctx: &RuleContext) -> RuleOutput {
    let qualifies = |s: &PlannedSession| {
        s.dependencies.is_empty() || s.name.contains("Test") || s.name.contains("Documentation")
    };

    let total: u32 = sessions.iter().map(|s| s.estimated_minutes).sum();
    let qualifying: Vec<&PlannedSession> = sessions.iter().filter(|s| qualifies(s)).collect();
    let qualifying_minutes: u32 = qualifying.iter().map(|s| s.estimated_minutes).sum();
    if qualifying_minutes == 0 {
        return None;
    }

    // Savings scale with the share of parallelizable sessions, capped at 30%
    let share = qualifying.len() as f64 / sessions.len() as f64;
    let target = (total as f64 * 0.3 * share).min(qualifying_minutes as f64 * 0.3);
    let factor = 1.0 - target / qualifying_minutes as f64;

    let reduced: Vec<PlannedSession> = sessions
        .iter()
        .map(|s| {
            if !qualifies(s) {
                return s.clone();
            }
            // tokens are not saved by running in parallel
            PlannedSession {
                estimated_minutes: (s.estimated_minutes as f64 * factor).round() as u32,
                ..s.clone()
            }
        })
        .collect();

    let saved = total - reduced.iter().map(|s| s.estimated_minutes).sum::<u32>();
    if saved == 0 {
        return None;
    }

    Some((
        reduced,
        format!(
            "Run {} independent sessions in parallel to save about {:.1} hours",
            qualifying.len(),
            saved as f64 / 60.0
        ),
    ))
}

fn boost_category(sessions: &[PlannedSession], category: TaskCategory) -> Option<(Vec<PlannedSession>, usize)> {
    let boosted = sessions.iter().filter(|s| s.category() == Some(category)).count();
    if boosted == 0 {
        return None;
    }
    let sessions = sessions
        .iter()
        .map(|s| {
            if s.category() == Some(category) {
                s.with_priority(s.priority.saturating_add(2))
            } else {
                s.clone()
            }
        })
        .collect();
    Some((sessions, boosted))
}

fn boost_testing(sessions: &[PlannedSession], ctx: &RuleContext) -> RuleOutput {
    let (sessions, count) = boost_category(sessions, TaskCategory::Testing)?;
    Some((
        sessions,
        format!(
            "Prioritized {} testing sessions because coverage is only {:.0}%",
            count, ctx.complexity.testing.coverage_percentage
        ),
    ))
}

fn boost_refactoring(sessions: &[PlannedSession], ctx: &RuleContext) -> RuleOutput {
    let (sessions, count) = boost_category(sessions, TaskCategory::Refactoring)?;
    Some((
        sessions,
        format!(
            "Prioritized {} refactoring sessions to pay down {:.0} hours of technical debt",
            count, ctx.complexity.architecture.technical_debt_hours
        ),
    ))
}

fn add_documentation(sessions: &[PlannedSession], ctx: &RuleContext) -> RuleOutput {
    if sessions.iter().any(|s| s.category() == Some(TaskCategory::Documentation)) {
        return None;
    }
    let mut sessions = sessions.to_vec();
    sessions.push(PlannedSession::new(DEFAULT_DOCUMENTATION_SESSION, ModelTier::Fast, 60, 3_000, 5));
    Some((
        sessions,
        format!(
            "Added a documentation session because documentation is only {:.0}% complete",
            ctx.complexity.documentation.completeness_percentage
        ),
    ))
}
