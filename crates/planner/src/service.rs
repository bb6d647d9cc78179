//! Service boundary - persists plans and broadcasts plan events.
//!
//! This is the only part of the planner that touches storage or the event
//! sink; the engine itself stays synchronous.

use sessionplan_core::{
    AllocationConstraints, ComplexityMetrics, PlanEvent, PlanEventKind, PlanId, QuotaSnapshot, RiskAssessment,
    SessionPlan, TierHours, ValidationResult,
};
use sessionplan_storage::{Storage, StorageError, TimeRange};
use tokio::sync::broadcast;
use tracing::{debug, info};
use crate::{PlanError, SessionPlanner};

/// Buffered events per subscriber before the oldest are dropped.
const EVENT_CAPACITY: usize = 256;

/// Result type for service operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Errors from the service boundary.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Planning failed
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// Storage failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// No plan with this ID
    #[error("Plan not found: {0}")]
    PlanNotFound(PlanId),
}

/// Plans, stores and announces session plans.
pub struct PlanService<S: Storage> {
    planner: SessionPlanner,
    storage: S,
    events: broadcast::Sender<PlanEvent>,
}

impl<S: Storage> PlanService<S> {
    /// Create a service over a storage backend.
    pub fn new(planner: SessionPlanner, storage: S) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            planner,
            storage,
            events,
        }
    }

    /// The planner.
    pub fn planner(&self) -> &SessionPlanner {
        &self.planner
    }

    /// The storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<PlanEvent> {
        self.events.subscribe()
    }

    /// Plan a project and store the result.
    ///
    /// The quota guard sees the higher of the caller's current usage and the
    /// recorded usage, per tier.
    pub async fn create_plan(&mut self, complexity: &ComplexityMetrics, risk: &RiskAssessment) -> ServiceResult<SessionPlan> {
        let recorded = self.current_usage().await?.used();
        let mut risk = risk.clone();
        risk.quota.current_usage = risk.quota.current_usage.max(recorded);

        let plan = self.planner.plan_sessions(complexity, &risk)?;
        self.storage.save_plan(&plan).await?;

        self.publish(PlanEventKind::PlanCreated {
            plan_id: plan.id,
            sessions: plan.session_sequence.len(),
            total_minutes: plan.total_estimated_minutes,
            confidence: plan.confidence,
        });
        Ok(plan)
    }

    /// Re-shape a stored plan and store the result under the same ID.
    pub async fn reoptimize(&mut self, id: PlanId, constraints: &AllocationConstraints) -> ServiceResult<SessionPlan> {
        let plan = self.load(id).await?;
        let previous_minutes = plan.total_estimated_minutes;

        let plan = self.planner.optimize_allocation(plan, constraints)?;
        self.storage.save_plan(&plan).await?;

        self.publish(PlanEventKind::PlanOptimized {
            plan_id: plan.id,
            previous_minutes,
            total_minutes: plan.total_estimated_minutes,
        });
        Ok(plan)
    }

    /// Validate a stored plan against the recorded quota usage.
    pub async fn validate(&self, id: PlanId) -> ServiceResult<ValidationResult> {
        let plan = self.load(id).await?;
        let quotas = self.current_usage().await?;

        let result = self.planner.validate_plan(&plan, &quotas)?;
        self.publish(PlanEventKind::PlanValidated {
            plan_id: plan.id,
            is_valid: result.is_valid,
            errors: result.errors.len(),
            warnings: result.warnings.len(),
        });
        Ok(result)
    }

    /// Plans created inside a time range, oldest first.
    pub async fn history(&self, range: &TimeRange) -> ServiceResult<Vec<SessionPlan>> {
        Ok(self.storage.list_plans(range).await?)
    }

    /// Record current usage against the configured limits.
    pub async fn record_usage(&mut self, used: TierHours) -> ServiceResult<QuotaSnapshot> {
        let snapshot = QuotaSnapshot::new(used, self.planner.config().weekly_limits);
        self.storage.save_quota_snapshot(&snapshot).await?;
        info!(
            "Recorded usage: fast {:.1}h ({:.0}%), deep {:.1}h ({:.0}%)",
            snapshot.fast.used_hours, snapshot.fast.percentage, snapshot.deep.used_hours, snapshot.deep.percentage
        );
        Ok(snapshot)
    }

    /// Latest recorded usage, or zero usage at the configured limits.
    pub async fn current_usage(&self) -> ServiceResult<QuotaSnapshot> {
        match self.storage.load_quota_snapshot().await? {
            Some(snapshot) => Ok(snapshot),
            None => {
                debug!("No usage recorded, assuming none");
                Ok(QuotaSnapshot::new(TierHours::default(), self.planner.config().weekly_limits))
            }
        }
    }

    async fn load(&self, id: PlanId) -> ServiceResult<SessionPlan> {
        self.storage
            .load_plan(id)
            .await?
            .ok_or(ServiceError::PlanNotFound(id))
    }

    fn publish(&self, kind: PlanEventKind) {
        let event = PlanEvent::new(kind);
        // No subscribers is fine
        let receivers = self.events.send(event).unwrap_or(0);
        debug!("Published plan event to {} subscribers", receivers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sessionplan_core::ModelTier;
    use sessionplan_storage::Result as StorageResult;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryStorage {
        plans: HashMap<PlanId, SessionPlan>,
        quota: Option<QuotaSnapshot>,
    }

    #[async_trait]
    impl Storage for MemoryStorage {
        async fn save_plan(&mut self, plan: &SessionPlan) -> StorageResult<()> {
            self.plans.insert(plan.id, plan.clone());
            Ok(())
        }

        async fn load_plan(&self, id: PlanId) -> StorageResult<Option<SessionPlan>> {
            Ok(self.plans.get(&id).cloned())
        }

        async fn list_plans(&self, range: &TimeRange) -> StorageResult<Vec<SessionPlan>> {
            let mut plans: Vec<_> = self.plans.values().filter(|p| range.contains(p.created_at)).cloned().collect();
            plans.sort_by_key(|p| p.created_at);
            Ok(plans)
        }

        async fn delete_plan(&mut self, id: PlanId) -> StorageResult<()> {
            self.plans.remove(&id);
            Ok(())
        }

        async fn save_quota_snapshot(&mut self, snapshot: &QuotaSnapshot) -> StorageResult<()> {
            self.quota = Some(*snapshot);
            Ok(())
        }

        async fn load_quota_snapshot(&self) -> StorageResult<Option<QuotaSnapshot>> {
            Ok(self.quota)
        }
    }

    fn service() -> PlanService<MemoryStorage> {
        PlanService::new(SessionPlanner::new(), MemoryStorage::default())
    }

    #[tokio::test]
    async fn test_create_plan_stores_and_announces() {
        let mut service = service();
        let mut events = service.subscribe();

        let plan = service
            .create_plan(&ComplexityMetrics::uniform(6.0), &RiskAssessment::flat(30.0))
            .await
            .unwrap();

        assert_eq!(service.storage().plans.get(&plan.id), Some(&plan));
        let event = events.recv().await.unwrap();
        assert_eq!(event.plan_id(), plan.id);
        assert!(matches!(
            event.kind,
            PlanEventKind::PlanCreated { sessions, .. } if sessions == plan.session_sequence.len()
        ));
    }

    #[tokio::test]
    async fn test_reoptimize_overwrites_stored_plan() {
        let mut service = service();
        let plan = service
            .create_plan(&ComplexityMetrics::uniform(8.0), &RiskAssessment::flat(30.0))
            .await
            .unwrap();
        let mut events = service.subscribe();

        let constraints = AllocationConstraints {
            max_fast_minutes: Some(120),
            ..Default::default()
        };
        let optimized = service.reoptimize(plan.id, &constraints).await.unwrap();

        assert_eq!(optimized.model_allocation.get(ModelTier::Fast).estimated_minutes, 120);
        assert_eq!(service.storage().plans.get(&plan.id), Some(&optimized));
        match events.recv().await.unwrap().kind {
            PlanEventKind::PlanOptimized { previous_minutes, total_minutes, .. } => {
                assert_eq!(previous_minutes, plan.total_estimated_minutes);
                assert_eq!(total_minutes, optimized.total_estimated_minutes);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_plan_is_not_found() {
        let mut service = service();
        let id = PlanId::new();
        let err = service.reoptimize(id, &AllocationConstraints::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::PlanNotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_validate_uses_recorded_usage() {
        let mut service = service();
        let plan = service
            .create_plan(&ComplexityMetrics::uniform(8.0), &RiskAssessment::flat(30.0))
            .await
            .unwrap();

        let clean = service.validate(plan.id).await.unwrap();
        assert!(clean.is_valid);

        service.record_usage(TierHours::new(0.0, 39.0)).await.unwrap();
        let over = service.validate(plan.id).await.unwrap();
        assert!(!over.is_valid);
        assert!(over.errors.iter().any(|e| e.starts_with("deep tier")));
    }

    #[tokio::test]
    async fn test_create_plan_respects_recorded_usage() {
        let mut service = service();
        service.record_usage(TierHours::new(0.0, 30.0)).await.unwrap();

        let plan = service
            .create_plan(&ComplexityMetrics::uniform(8.0), &RiskAssessment::flat(30.0))
            .await
            .unwrap();

        // 36h safe deep limit leaves 6h for the plan
        assert!(plan.tier_hours(ModelTier::Deep) <= 6.0 + 1e-9);
        assert!(plan.recommendations.iter().any(|r| r.starts_with("Reduced deep tier")));
        assert!(service.validate(plan.id).await.unwrap().is_valid);
    }

    #[tokio::test]
    async fn test_recorded_overrun_drops_deep_sessions() {
        let mut service = service();
        service.record_usage(TierHours::new(0.0, 38.0)).await.unwrap();

        let plan = service
            .create_plan(&ComplexityMetrics::uniform(8.0), &RiskAssessment::flat(30.0))
            .await
            .unwrap();

        assert_eq!(plan.model_allocation.get(ModelTier::Deep).estimated_minutes, 0);
        assert!(!plan.recommendations.is_empty());

        // Usage alone is past the threshold, so only that error remains
        let result = service.validate(plan.id).await.unwrap();
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("deep tier projected at 38.0h"));
    }

    #[tokio::test]
    async fn test_current_usage_defaults_to_zero() {
        let service = service();
        let usage = service.current_usage().await.unwrap();
        assert_eq!(usage.deep.used_hours, 0.0);
        assert_eq!(usage.deep.limit_hours, 40.0);
    }

    #[tokio::test]
    async fn test_history_lists_recent_plans() {
        let mut service = service();
        for overall in [4.0, 6.0] {
            service
                .create_plan(&ComplexityMetrics::uniform(overall), &RiskAssessment::flat(20.0))
                .await
                .unwrap();
        }

        let plans = service.history(&TimeRange::last_days(1)).await.unwrap();
        assert_eq!(plans.len(), 2);
        assert!(plans[0].created_at <= plans[1].created_at);
    }
}
