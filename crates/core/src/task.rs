//! Task templates - the static units of work a plan is built from.

use serde::{Deserialize, Serialize};
use crate::tier::TierPreference;

/// Category a task template belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    /// Understanding the codebase
    Analysis,
    /// Writing new code
    Implementation,
    /// Writing and running tests
    Testing,
    /// Restructuring existing code
    Refactoring,
    /// Writing documentation
    Documentation,
}

impl TaskCategory {
    /// All categories in catalog order.
    pub const ALL: [TaskCategory; 5] = [
        TaskCategory::Analysis,
        TaskCategory::Implementation,
        TaskCategory::Testing,
        TaskCategory::Refactoring,
        TaskCategory::Documentation,
    ];

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Analysis => "analysis",
            TaskCategory::Implementation => "implementation",
            TaskCategory::Testing => "testing",
            TaskCategory::Refactoring => "refactoring",
            TaskCategory::Documentation => "documentation",
        }
    }

    /// Substring that identifies a session of this category by name.
    pub fn name_keyword(&self) -> &'static str {
        match self {
            TaskCategory::Analysis => "Analysis",
            TaskCategory::Implementation => "Implementation",
            TaskCategory::Testing => "Test",
            TaskCategory::Refactoring => "Refactor",
            TaskCategory::Documentation => "Documentation",
        }
    }

    /// Fixed confidence attached to this category's token estimate.
    pub fn budget_confidence(&self) -> u8 {
        match self {
            TaskCategory::Analysis => 80,
            TaskCategory::Implementation => 70,
            TaskCategory::Testing => 85,
            TaskCategory::Refactoring => 65,
            TaskCategory::Documentation => 90,
        }
    }

    /// Category of a session, recovered from its name.
    ///
    /// Keywords are checked in catalog order; the first match wins.
    pub fn from_session_name(name: &str) -> Option<TaskCategory> {
        Self::ALL
            .into_iter()
            .find(|category| name.contains(category.name_keyword()))
    }
}

impl std::fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reusable description of one unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskTemplate {
    /// Unique name within the catalog; doubles as the dependency key
    pub name: String,

    /// Category
    pub category: TaskCategory,

    /// Base complexity (1-10)
    pub base_complexity: u8,

    /// Preferred tier
    pub preferred_tier: TierPreference,

    /// Base duration estimate
    pub base_minutes: u32,

    /// Base token estimate
    pub base_tokens: u64,

    /// Names of templates this one depends on
    pub dependencies: Vec<String>,

    /// Whether this task can run alongside others
    pub parallelizable: bool,
}

impl TaskTemplate {
    /// Create a template without dependencies.
    pub fn new(
        name: impl Into<String>,
        category: TaskCategory,
        base_complexity: u8,
        preferred_tier: TierPreference,
        base_minutes: u32,
        base_tokens: u64,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            base_complexity: base_complexity.clamp(1, 10),
            preferred_tier,
            base_minutes,
            base_tokens,
            dependencies: Vec::new(),
            parallelizable: false,
        }
    }

    /// Add a dependency by name.
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    /// Mark as parallelizable.
    pub fn parallel(mut self) -> Self {
        self.parallelizable = true;
        self
    }
}
