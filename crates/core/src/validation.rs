//! Advisory validation findings for a plan.

use serde::{Deserialize, Serialize};

/// Result of validating a plan.
///
/// `is_valid` is true iff `errors` is empty; warnings and suggestions never
/// affect validity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the plan passed
    pub is_valid: bool,

    /// Non-blocking findings
    pub warnings: Vec<String>,

    /// Blocking findings
    pub errors: Vec<String>,

    /// Suggested follow-ups
    pub suggestions: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    /// Create an empty, valid result.
    pub fn new() -> Self {
        Self {
            is_valid: true,
            warnings: Vec::new(),
            errors: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Record an error.
    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.is_valid = false;
    }

    /// Record a warning.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Record a suggestion.
    pub fn suggest(&mut self, message: impl Into<String>) {
        self.suggestions.push(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_keep_result_valid() {
        let mut result = ValidationResult::new();
        result.warning("long plan");
        result.suggest("split it");
        assert!(result.is_valid);

        result.error("cycle");
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["cycle".to_string()]);
    }

    #[test]
    fn test_default_is_valid() {
        let result = ValidationResult::default();
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert_eq!(result, ValidationResult::new());
    }
}
