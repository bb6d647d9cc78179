//! Current quota usage, as reported by the usage collaborator.

use serde::{Deserialize, Serialize};
use crate::tier::{ModelTier, TierHours};
use crate::Time;

/// Weekly usage of one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuotaUsage {
    /// Hours used so far this week
    pub used_hours: f64,
    /// Weekly limit in hours
    pub limit_hours: f64,
    /// Used share of the limit, percent
    pub percentage: f64,
}

impl QuotaUsage {
    /// Create from used and limit hours.
    pub fn new(used_hours: f64, limit_hours: f64) -> Self {
        let percentage = if limit_hours > 0.0 {
            (used_hours / limit_hours * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self {
            used_hours,
            limit_hours,
            percentage,
        }
    }
}

/// Usage of both tiers at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuotaSnapshot {
    /// Fast tier usage
    pub fast: QuotaUsage,
    /// Deep tier usage
    pub deep: QuotaUsage,
    /// When the usage was captured
    pub captured_at: Time,
}

impl QuotaSnapshot {
    /// Build a snapshot from used hours and weekly limits.
    pub fn new(used: TierHours, limits: TierHours) -> Self {
        Self {
            fast: QuotaUsage::new(used.fast, limits.fast),
            deep: QuotaUsage::new(used.deep, limits.deep),
            captured_at: chrono::Utc::now(),
        }
    }

    /// Usage for one tier.
    pub fn get(&self, tier: ModelTier) -> &QuotaUsage {
        match tier {
            ModelTier::Fast => &self.fast,
            ModelTier::Deep => &self.deep,
        }
    }

    /// Used hours of both tiers.
    pub fn used(&self) -> TierHours {
        TierHours::new(self.fast.used_hours, self.deep.used_hours)
    }
}
