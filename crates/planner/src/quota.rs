//! Quota guard - keeps projected tier usage under the safe limit.

use std::collections::{HashMap, HashSet};
use sessionplan_core::{AllocationConstraints, ModelTier, PlannedSession, SessionPlan, TierHours};
use tracing::{debug, warn};
use crate::builder::with_sessions;
use crate::optimizer::lowest_priority;
use crate::PlannerConfig;

/// Tolerance for quota comparisons, in hours.
pub const QUOTA_EPSILON_HOURS: f64 = 1e-9;

/// Shrinks or drops sessions on tiers whose projected usage is unsafe.
#[derive(Debug, Clone)]
pub struct QuotaGuard {
    limits: TierHours,
    safety_threshold: f64,
    preference_shift_hours: f64,
    token_buffer: f64,
}

impl QuotaGuard {
    /// Create a guard from planner configuration.
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            limits: config.weekly_limits,
            safety_threshold: config.safety_threshold,
            preference_shift_hours: config.preference_shift_hours,
            token_buffer: config.token_buffer,
        }
    }

    /// Safe hours for a tier.
    pub fn safe_limit(&self, tier: ModelTier) -> f64 {
        self.limits.get(tier) * self.safety_threshold
    }

    /// Current usage plus the plan's hours on a tier.
    pub fn projected(&self, plan: &SessionPlan, tier: ModelTier, current: &TierHours) -> f64 {
        current.get(tier) + plan.tier_hours(tier)
    }

    /// Minutes that must come off a tier to make it safe.
    pub fn excess_minutes(&self, plan: &SessionPlan, tier: ModelTier, current: &TierHours) -> u32 {
        let excess = self.projected(plan, tier, current) - self.safe_limit(tier);
        if excess <= QUOTA_EPSILON_HOURS {
            return 0;
        }
        (excess * 60.0 - QUOTA_EPSILON_HOURS).ceil().max(1.0) as u32
    }

    /// Reduce every unsafe tier.
    ///
    /// Running the guard on a plan it already made safe changes nothing.
    /// When current usage alone is over the limit, every session on that
    /// tier is removed.
    pub fn enforce(&self, plan: SessionPlan, current: &TierHours) -> SessionPlan {
        let mut plan = plan;

        for tier in ModelTier::ALL {
            let excess = self.excess_minutes(&plan, tier, current);
            if excess == 0 {
                debug!("{} tier within safe limit", tier);
                continue;
            }

            warn!(
                "{} tier projected at {:.1}h exceeds safe limit {:.1}h; reducing by {} minutes",
                tier,
                self.projected(&plan, tier, current),
                self.safe_limit(tier),
                excess
            );
            let (reduced, removed) = reduce_tier(plan, tier, excess, self.token_buffer);
            plan = reduced;
            if removed > 0 {
                plan.recommendations.push(format!(
                    "Reduced {} tier by {:.1} hours to stay within {:.0}% of the weekly limit",
                    tier,
                    removed as f64 / 60.0,
                    self.safety_threshold * 100.0
                ));
            }
        }

        plan
    }

    /// Apply explicit ceilings and a tier preference.
    ///
    /// A ceiling reduces its tier by the excess over it. A preference
    /// reduces the other tier by a fixed shift.
    pub fn constrain(&self, plan: SessionPlan, constraints: &AllocationConstraints) -> SessionPlan {
        let mut plan = plan;

        for tier in ModelTier::ALL {
            let Some(max) = constraints.max_minutes(tier) else {
                continue;
            };
            let planned = plan.model_allocation.get(tier).estimated_minutes;
            if planned <= max {
                continue;
            }
            let (reduced, removed) = reduce_tier(plan, tier, planned - max, self.token_buffer);
            plan = reduced;
            plan.recommendations.push(format!(
                "Reduced {} tier by {:.1} hours to respect the {}-minute ceiling",
                tier,
                removed as f64 / 60.0,
                max
            ));
        }

        if let Some(preferred) = constraints.preferred_tier {
            let other = preferred.other();
            let shift = (self.preference_shift_hours * 60.0).round() as u32;
            let (reduced, removed) = reduce_tier(plan, other, shift, self.token_buffer);
            plan = reduced;
            if removed > 0 {
                plan.recommendations.push(format!(
                    "Shifted {:.1} hours off the {} tier in favor of the {} tier",
                    removed as f64 / 60.0,
                    other,
                    preferred
                ));
            }
        }

        plan
    }
}

/// Take up to `minutes` off one tier, lowest-priority sessions first.
///
/// A session that fits entirely in the remaining reduction is removed;
/// the first one that doesn't is shrunk and the walk stops. Returns the
/// new plan and the minutes actually removed.
pub fn reduce_tier(plan: SessionPlan, tier: ModelTier, minutes: u32, token_buffer: f64) -> (SessionPlan, u32) {
    let mut remaining = minutes;
    let mut dropped: HashSet<usize> = HashSet::new();
    let mut shrunk: HashMap<usize, PlannedSession> = HashMap::new();

    for index in lowest_priority(&plan.session_sequence, tier) {
        if remaining == 0 {
            break;
        }
        let session = &plan.session_sequence[index];
        if session.estimated_minutes <= remaining {
            debug!("Removing session '{}' ({} minutes)", session.name, session.estimated_minutes);
            remaining -= session.estimated_minutes;
            dropped.insert(index);
        } else {
            let target = session.estimated_minutes - remaining;
            debug!("Shrinking session '{}' to {} minutes", session.name, target);
            shrunk.insert(index, session.shrunk_to(target));
            remaining = 0;
        }
    }

    let removed = minutes - remaining;
    if removed == 0 {
        return (plan, 0);
    }

    let sessions = plan
        .session_sequence
        .iter()
        .enumerate()
        .filter(|(i, _)| !dropped.contains(i))
        .map(|(i, s)| shrunk.remove(&i).unwrap_or_else(|| s.clone()))
        .collect();

    (with_sessions(plan, sessions, token_buffer), removed)
}
