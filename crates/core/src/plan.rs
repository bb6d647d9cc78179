//! Session plans and their aggregates.

use serde::{Deserialize, Serialize};
use crate::id::PlanId;
use crate::session::PlannedSession;
use crate::task::TaskCategory;
use crate::tier::{ModelTier, TierTokens};
use crate::Time;

/// An ordered, dependency-respecting execution plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPlan {
    /// Unique identifier
    pub id: PlanId,

    /// When the plan was produced
    pub created_at: Time,

    /// Sum of all session durations
    pub total_estimated_minutes: u32,

    /// Per-tier aggregate
    pub model_allocation: ModelAllocation,

    /// Sessions in execution order
    pub session_sequence: Vec<PlannedSession>,

    /// Token estimate
    pub token_budget: TokenBudget,

    /// Free-text recommendations, in the order they were added
    pub recommendations: Vec<String>,

    /// Confidence (30-95)
    pub confidence: u8,
}

impl SessionPlan {
    /// Look up a session by name.
    pub fn session(&self, name: &str) -> Option<&PlannedSession> {
        self.session_sequence.iter().find(|s| s.name == name)
    }

    /// Position of a session in the sequence.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.session_sequence.iter().position(|s| s.name == name)
    }

    /// Sessions assigned to a tier, in sequence order.
    pub fn sessions_on(&self, tier: ModelTier) -> impl Iterator<Item = &PlannedSession> {
        self.session_sequence.iter().filter(move |s| s.tier == tier)
    }

    /// Planned hours on a tier.
    pub fn tier_hours(&self, tier: ModelTier) -> f64 {
        self.model_allocation.get(tier).estimated_minutes as f64 / 60.0
    }

    /// Total planned hours.
    pub fn total_hours(&self) -> f64 {
        self.total_estimated_minutes as f64 / 60.0
    }
}

/// Aggregate for one tier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TierAllocation {
    /// Minutes planned on this tier
    pub estimated_minutes: u32,
    /// Share of total minutes (0-100)
    pub percentage: u8,
    /// Session names on this tier, in sequence order
    pub sessions: Vec<String>,
}

/// Per-tier aggregate of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelAllocation {
    /// Fast tier
    pub fast: TierAllocation,
    /// Deep tier
    pub deep: TierAllocation,
}

impl ModelAllocation {
    /// Aggregate for one tier.
    pub fn get(&self, tier: ModelTier) -> &TierAllocation {
        match tier {
            ModelTier::Fast => &self.fast,
            ModelTier::Deep => &self.deep,
        }
    }
}

/// Token estimate for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBudget {
    /// Category
    pub category: TaskCategory,
    /// Raw tokens of the sessions in this category
    pub tokens: u64,
    /// Fixed confidence for this category's estimate
    pub confidence: u8,
}

/// Token estimate for a plan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenBudget {
    /// Raw total plus the uncertainty buffer
    pub total_tokens: u64,
    /// Raw per-tier totals
    pub by_tier: TierTokens,
    /// Non-empty categories only
    pub by_category: Vec<CategoryBudget>,
}

impl TokenBudget {
    /// Budget entry for a category, if it has any sessions.
    pub fn category(&self, category: TaskCategory) -> Option<&CategoryBudget> {
        self.by_category.iter().find(|c| c.category == category)
    }
}

/// Explicit limits for re-optimizing an existing plan.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AllocationConstraints {
    /// Ceiling on fast tier minutes
    pub max_fast_minutes: Option<u32>,
    /// Ceiling on deep tier minutes
    pub max_deep_minutes: Option<u32>,
    /// Tier to favor; the other one gets shifted down
    pub preferred_tier: Option<ModelTier>,
}

impl AllocationConstraints {
    /// Ceiling for one tier.
    pub fn max_minutes(&self, tier: ModelTier) -> Option<u32> {
        match tier {
            ModelTier::Fast => self.max_fast_minutes,
            ModelTier::Deep => self.max_deep_minutes,
        }
    }

    /// Whether any constraint is set.
    pub fn is_empty(&self) -> bool {
        self.max_fast_minutes.is_none() && self.max_deep_minutes.is_none() && self.preferred_tier.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraints_empty() {
        assert!(AllocationConstraints::default().is_empty());
        let constraints = AllocationConstraints {
            max_deep_minutes: Some(120),
            ..Default::default()
        };
        assert!(!constraints.is_empty());
        assert_eq!(constraints.max_minutes(ModelTier::Deep), Some(120));
        assert_eq!(constraints.max_minutes(ModelTier::Fast), None);
    }
}
