//! Session planning engine.
//!
//! Turns project complexity and risk signals into an ordered plan of work
//! sessions split across the fast and deep tiers:
//! ```text
//! TaskSelector → PlanBuilder → Optimizer → QuotaGuard → ConfidenceScorer
//! ```
//! `PlanValidator` re-checks any plan independently. `PlanService` wraps the
//! engine with storage and event broadcast.

#![warn(missing_docs)]

pub mod error;
pub mod config;
pub mod catalog;
pub mod selector;
pub mod dependency;
pub mod builder;
pub mod optimizer;
pub mod quota;
pub mod validator;
pub mod confidence;
pub mod engine;
pub mod service;

pub use error::{PlanError, Result};
pub use config::PlannerConfig;
pub use catalog::TaskCatalog;
pub use selector::{TaskSelector, SelectedTask};
pub use builder::PlanBuilder;
pub use optimizer::{Optimizer, OptimizationRule, RuleContext};
pub use quota::QuotaGuard;
pub use validator::PlanValidator;
pub use confidence::ConfidenceScorer;
pub use engine::SessionPlanner;
pub use service::{PlanService, ServiceError, ServiceResult};
