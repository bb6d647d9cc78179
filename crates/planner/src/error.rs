//! Planner errors.
//!
//! Only caller contract violations are errors. Cycles and quota overruns are
//! handled inside the pipeline and surface through `ValidationResult`.

/// Result type for planner operations.
pub type Result<T> = std::result::Result<T, PlanError>;

/// Contract violations reported to the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// Two tasks or sessions share a name, making dependency lookup ambiguous
    #[error("Duplicate task name: {0}")]
    DuplicateTask(String),

    /// A session references a dependency that is neither in the catalog nor in the plan
    #[error("Session '{session}' depends on unknown task '{dependency}'")]
    UnknownDependency {
        /// Session carrying the reference
        session: String,
        /// The unresolvable name
        dependency: String,
    },

    /// Configuration values out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
