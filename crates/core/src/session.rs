//! Planned sessions.
//!
//! Sessions are values: every adjustment returns a new session and the plan
//! replaces its sequence wholesale.

use serde::{Deserialize, Serialize};
use crate::id::SessionId;
use crate::task::TaskCategory;
use crate::tier::ModelTier;

/// One schedulable unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedSession {
    /// Unique identifier
    pub id: SessionId,

    /// Session name; equals the source task name and is the dependency key
    pub name: String,

    /// Assigned tier
    pub tier: ModelTier,

    /// Duration estimate
    pub estimated_minutes: u32,

    /// Token estimate
    pub estimated_tokens: u64,

    /// Task names covered by this session
    pub tasks: Vec<String>,

    /// Names of sessions this one depends on
    pub dependencies: Vec<String>,

    /// Priority (1-10)
    pub priority: u8,
}

impl PlannedSession {
    /// Create a session covering a single task of the same name.
    pub fn new(
        name: impl Into<String>,
        tier: ModelTier,
        estimated_minutes: u32,
        estimated_tokens: u64,
        priority: u8,
    ) -> Self {
        let name = name.into();
        Self {
            id: SessionId::new(),
            tasks: vec![name.clone()],
            name,
            tier,
            estimated_minutes,
            estimated_tokens,
            dependencies: Vec::new(),
            priority: priority.clamp(1, 10),
        }
    }

    /// Set dependencies.
    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Category recovered from the session name.
    pub fn category(&self) -> Option<TaskCategory> {
        TaskCategory::from_session_name(&self.name)
    }

    /// Copy with a different priority, clamped to 1-10.
    pub fn with_priority(&self, priority: u8) -> Self {
        Self {
            priority: priority.clamp(1, 10),
            ..self.clone()
        }
    }

    /// Copy moved to another tier with scaled duration and tokens.
    pub fn reassigned(&self, tier: ModelTier, minutes_factor: f64, tokens_factor: f64) -> Self {
        Self {
            tier,
            estimated_minutes: (self.estimated_minutes as f64 * minutes_factor).round() as u32,
            estimated_tokens: (self.estimated_tokens as f64 * tokens_factor).round() as u64,
            ..self.clone()
        }
    }

    /// Copy with a shorter duration; tokens shrink proportionally.
    pub fn shrunk_to(&self, minutes: u32) -> Self {
        let minutes = minutes.min(self.estimated_minutes);
        let tokens = if self.estimated_minutes == 0 {
            self.estimated_tokens
        } else {
            (self.estimated_tokens as f64 * minutes as f64 / self.estimated_minutes as f64).round() as u64
        };
        Self {
            estimated_minutes: minutes,
            estimated_tokens: tokens,
            ..self.clone()
        }
    }

    /// Duration in hours.
    pub fn hours(&self) -> f64 {
        self.estimated_minutes as f64 / 60.0
    }
}
