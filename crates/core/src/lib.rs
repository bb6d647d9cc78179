//! sessionplan core data models.
//!
//! This crate defines the inputs, intermediate values and outputs of the
//! session planning engine. It carries no behavior beyond small value
//! transforms; the engine lives in `sessionplan-planner`.

#![warn(missing_docs)]

// Core identities
mod id;

// Inputs
mod metrics;
mod tier;
mod task;

// Plan
mod session;
mod plan;
mod quota;
mod validation;
mod event;

// Re-exports
pub use id::*;

pub use metrics::{
    ComplexityMetrics, DimensionScore, ArchitectureMetrics, TestingMetrics, DocumentationMetrics,
    RiskAssessment, RiskFactor, QuotaRisk,
};
pub use tier::{ModelTier, TierPreference, TierHours, TierTokens};
pub use task::{TaskTemplate, TaskCategory};

pub use session::PlannedSession;
pub use plan::{
    SessionPlan, ModelAllocation, TierAllocation, TokenBudget, CategoryBudget, AllocationConstraints,
};
pub use quota::{QuotaUsage, QuotaSnapshot};
pub use validation::ValidationResult;
pub use event::{PlanEvent, PlanEventKind};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
