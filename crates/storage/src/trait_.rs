//! Storage trait abstraction.

use async_trait::async_trait;
use sessionplan_core::{PlanId, QuotaSnapshot, SessionPlan, Time};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Half-open time window `[from, to)` for history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Inclusive start
    pub from: Time,
    /// Exclusive end
    pub to: Time,
}

impl TimeRange {
    /// Create a range.
    pub fn new(from: Time, to: Time) -> Self {
        Self { from, to }
    }

    /// The last `days` days up to now.
    pub fn last_days(days: i64) -> Self {
        let to = chrono::Utc::now();
        Self {
            from: to - chrono::Duration::days(days),
            to,
        }
    }

    /// Whether a timestamp falls inside the range.
    pub fn contains(&self, at: Time) -> bool {
        at >= self.from && at < self.to
    }
}

/// Storage abstraction for plans and quota usage.
///
/// The planning engine never calls this; only the service boundary does.
#[async_trait]
pub trait Storage: Send + Sync {
    // === Plan operations ===

    /// Save a plan (create or update).
    async fn save_plan(&mut self, plan: &SessionPlan) -> Result<()>;

    /// Load a plan by ID.
    async fn load_plan(&self, id: PlanId) -> Result<Option<SessionPlan>>;

    /// Plans created inside the range, oldest first.
    async fn list_plans(&self, range: &TimeRange) -> Result<Vec<SessionPlan>>;

    /// Delete a plan.
    async fn delete_plan(&mut self, id: PlanId) -> Result<()>;

    // === Quota operations ===

    /// Record the latest usage snapshot.
    async fn save_quota_snapshot(&mut self, snapshot: &QuotaSnapshot) -> Result<()>;

    /// Latest usage snapshot, if any was recorded.
    async fn load_quota_snapshot(&self) -> Result<Option<QuotaSnapshot>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_time_range_is_half_open() {
        let now = Utc::now();
        let range = TimeRange::new(now - Duration::hours(1), now);
        assert!(range.contains(now - Duration::hours(1)));
        assert!(range.contains(now - Duration::minutes(1)));
        assert!(!range.contains(now));
    }
}
