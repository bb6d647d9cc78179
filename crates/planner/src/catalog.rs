//! Task catalog - the static library of task templates.

use std::collections::HashSet;
use sessionplan_core::{TaskCategory, TaskTemplate, TierPreference};
use crate::{PlanError, Result};

/// Registry of task templates, grouped by category.
///
/// Template names are unique; they are the keys dependencies refer to.
#[derive(Debug, Clone)]
pub struct TaskCatalog {
    templates: Vec<TaskTemplate>,
}

impl TaskCatalog {
    /// Create a catalog, rejecting duplicate names.
    pub fn new(templates: Vec<TaskTemplate>) -> Result<Self> {
        let mut seen = HashSet::new();
        for template in &templates {
            if !seen.insert(template.name.as_str()) {
                return Err(PlanError::DuplicateTask(template.name.clone()));
            }
        }
        Ok(Self { templates })
    }

    /// The built-in catalog.
    pub fn standard() -> Self {
        Self { templates: standard_templates() }
    }

    /// Get a template by name.
    pub fn get(&self, name: &str) -> Option<&TaskTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Whether a template with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Templates of one category, in catalog order.
    pub fn by_category(&self, category: TaskCategory) -> impl Iterator<Item = &TaskTemplate> {
        self.templates.iter().filter(move |t| t.category == category)
    }

    /// All templates.
    pub fn list(&self) -> &[TaskTemplate] {
        &self.templates
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for TaskCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_templates() -> Vec<TaskTemplate> {
    use TaskCategory::*;
    use TierPreference as Pref;

    vec![
        // Analysis
        TaskTemplate::new("Codebase Analysis", Analysis, 5, Pref::Either, 45, 12_000)
            .parallel(),
        TaskTemplate::new("Dependency Analysis", Analysis, 4, Pref::Fast, 30, 8_000)
            .depends_on("Codebase Analysis")
            .parallel(),
        TaskTemplate::new("Architecture Analysis", Analysis, 8, Pref::Deep, 60, 20_000)
            .depends_on("Codebase Analysis"),

        // Implementation
        TaskTemplate::new("Core Feature Implementation", Implementation, 7, Pref::Deep, 180, 60_000)
            .depends_on("Architecture Analysis"),
        TaskTemplate::new("Integration Implementation", Implementation, 6, Pref::Either, 120, 40_000)
            .depends_on("Core Feature Implementation")
            .depends_on("Dependency Analysis")
            .parallel(),
        TaskTemplate::new("Edge Case Implementation", Implementation, 5, Pref::Fast, 60, 18_000)
            .depends_on("Core Feature Implementation")
            .parallel(),

        // Testing
        TaskTemplate::new("Unit Test Suite", Testing, 5, Pref::Fast, 90, 25_000)
            .depends_on("Core Feature Implementation")
            .parallel(),
        TaskTemplate::new("Integration Test Suite", Testing, 6, Pref::Either, 120, 32_000)
            .depends_on("Unit Test Suite")
            .depends_on("Integration Implementation"),
        TaskTemplate::new("Regression Test Pass", Testing, 4, Pref::Fast, 45, 10_000)
            .depends_on("Unit Test Suite")
            .parallel(),

        // Refactoring
        TaskTemplate::new("Hotspot Refactoring", Refactoring, 7, Pref::Deep, 120, 40_000)
            .depends_on("Architecture Analysis"),
        TaskTemplate::new("Technical Debt Refactoring", Refactoring, 6, Pref::Either, 90, 28_000)
            .depends_on("Hotspot Refactoring")
            .parallel(),

        // Documentation
        TaskTemplate::new("API Documentation", Documentation, 3, Pref::Fast, 60, 15_000)
            .depends_on("Core Feature Implementation")
            .parallel(),
        TaskTemplate::new("Architecture Documentation", Documentation, 4, Pref::Fast, 45, 12_000)
            .depends_on("Architecture Analysis")
            .parallel(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_is_consistent() {
        let catalog = TaskCatalog::standard();
        assert!(TaskCatalog::new(catalog.list().to_vec()).is_ok());

        for template in catalog.list() {
            // Session names must bucket back into their own category
            assert_eq!(
                TaskCategory::from_session_name(&template.name),
                Some(template.category),
                "{} buckets into the wrong category",
                template.name
            );
            for dep in &template.dependencies {
                assert!(catalog.contains(dep), "{} depends on unknown {}", template.name, dep);
            }
        }
    }

    #[test]
    fn test_every_category_has_templates() {
        let catalog = TaskCatalog::standard();
        for category in TaskCategory::ALL {
            assert!(catalog.by_category(category).count() > 0, "no templates for {}", category);
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let a = TaskTemplate::new("Codebase Analysis", TaskCategory::Analysis, 5, TierPreference::Fast, 10, 100);
        let err = TaskCatalog::new(vec![a.clone(), a]).unwrap_err();
        assert_eq!(err, PlanError::DuplicateTask("Codebase Analysis".to_string()));
    }
}
