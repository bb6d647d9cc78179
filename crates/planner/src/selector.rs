//! Task selection from complexity signals.

use std::collections::HashSet;
use sessionplan_core::{ComplexityMetrics, TaskCategory, TaskTemplate};
use tracing::debug;
use crate::{PlanError, Result, TaskCatalog};

/// Baseline dimension score; deviation from it drives the multiplier.
const BASELINE_SCORE: f64 = 5.0;
const DIMENSION_WEIGHT: f64 = 0.1;
const GLOBAL_WEIGHT: f64 = 0.05;
const MIN_MULTIPLIER: f64 = 0.5;
const MAX_MULTIPLIER: f64 = 3.0;

/// A template chosen for the plan, with scaled estimates.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedTask {
    /// Source template
    pub template: TaskTemplate,
    /// Complexity multiplier applied to the base estimates
    pub multiplier: f64,
    /// Scaled duration
    pub estimated_minutes: u32,
    /// Scaled tokens
    pub estimated_tokens: u64,
}

impl SelectedTask {
    /// Task name.
    pub fn name(&self) -> &str {
        &self.template.name
    }

    /// Task category.
    pub fn category(&self) -> TaskCategory {
        self.template.category
    }
}

/// Chooses which template groups apply and scales their estimates.
///
/// Pure and deterministic: the same metrics always yield the same tasks in
/// the same order.
pub struct TaskSelector<'a> {
    catalog: &'a TaskCatalog,
}

impl<'a> TaskSelector<'a> {
    /// Create a selector over a catalog.
    pub fn new(catalog: &'a TaskCatalog) -> Self {
        Self { catalog }
    }

    /// Categories that apply to a project.
    pub fn categories(complexity: &ComplexityMetrics) -> Vec<TaskCategory> {
        let mut categories = vec![TaskCategory::Analysis];

        if complexity.overall > 3.0 {
            categories.push(TaskCategory::Implementation);
        }
        if complexity.testing.coverage_percentage < 70.0 || complexity.overall > 6.0 {
            categories.push(TaskCategory::Testing);
        }
        if complexity.architecture.technical_debt_hours > 50.0 || complexity.architecture.score > 7.0 {
            categories.push(TaskCategory::Refactoring);
        }
        if complexity.documentation.completeness_percentage < 60.0 {
            categories.push(TaskCategory::Documentation);
        }

        categories
    }

    /// Multiplier for one category, clamped to [0.5, 3.0].
    pub fn multiplier(category: TaskCategory, complexity: &ComplexityMetrics) -> f64 {
        let codebase = complexity.codebase.score;
        let dependencies = complexity.dependencies.score;
        let architecture = complexity.architecture.score;

        let weighted = match category {
            TaskCategory::Analysis => 0.6 * codebase + 0.4 * dependencies,
            TaskCategory::Implementation => 0.5 * architecture + 0.3 * codebase + 0.2 * dependencies,
            TaskCategory::Testing => 0.7 * complexity.testing.score + 0.3 * codebase,
            TaskCategory::Refactoring => 0.7 * architecture + 0.3 * codebase,
            TaskCategory::Documentation => complexity.documentation.score,
        };

        let raw = 1.0
            + (weighted - BASELINE_SCORE) * DIMENSION_WEIGHT
            + (complexity.overall - BASELINE_SCORE) * GLOBAL_WEIGHT;
        raw.clamp(MIN_MULTIPLIER, MAX_MULTIPLIER)
    }

    /// Select and scale tasks.
    ///
    /// Fails fast if two selected tasks share a name.
    pub fn select(&self, complexity: &ComplexityMetrics) -> Result<Vec<SelectedTask>> {
        let mut selected = Vec::new();
        let mut names = HashSet::new();

        for category in Self::categories(complexity) {
            let multiplier = Self::multiplier(category, complexity);
            debug!("Category {} selected with multiplier {:.2}", category, multiplier);

            for template in self.catalog.by_category(category) {
                if !names.insert(template.name.clone()) {
                    return Err(PlanError::DuplicateTask(template.name.clone()));
                }
                selected.push(SelectedTask {
                    template: template.clone(),
                    multiplier,
                    estimated_minutes: (template.base_minutes as f64 * multiplier).round() as u32,
                    estimated_tokens: (template.base_tokens as f64 * multiplier).round() as u64,
                });
            }
        }

        Ok(selected)
    }
}
