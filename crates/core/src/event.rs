//! Plan events - what the broadcast sink receives.

use crate::id::{EventId, PlanId};
use crate::Time;
use serde::{Deserialize, Serialize};

/// Something that happened to a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEvent {
    /// Unique identifier
    pub id: EventId,

    /// When it happened
    pub timestamp: Time,

    /// What happened
    pub kind: PlanEventKind,
}

impl PlanEvent {
    /// Create a new event stamped now.
    pub fn new(kind: PlanEventKind) -> Self {
        Self {
            id: EventId::new(),
            timestamp: chrono::Utc::now(),
            kind,
        }
    }

    /// Plan the event refers to.
    pub fn plan_id(&self) -> PlanId {
        match &self.kind {
            PlanEventKind::PlanCreated { plan_id, .. }
            | PlanEventKind::PlanOptimized { plan_id, .. }
            | PlanEventKind::PlanValidated { plan_id, .. } => *plan_id,
        }
    }
}

/// Typed event payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlanEventKind {
    /// A new plan was produced
    PlanCreated {
        /// Plan
        plan_id: PlanId,
        /// Number of sessions
        sessions: usize,
        /// Total minutes
        total_minutes: u32,
        /// Confidence
        confidence: u8,
    },

    /// An existing plan was re-optimized against explicit constraints
    PlanOptimized {
        /// Plan
        plan_id: PlanId,
        /// Total minutes before
        previous_minutes: u32,
        /// Total minutes after
        total_minutes: u32,
    },

    /// A plan was validated
    PlanValidated {
        /// Plan
        plan_id: PlanId,
        /// Whether validation passed
        is_valid: bool,
        /// Number of errors
        errors: usize,
        /// Number of warnings
        warnings: usize,
    },
}
