//! Complexity and risk inputs.
//!
//! Both are computed upstream and consumed as immutable snapshots.

use serde::{Deserialize, Serialize};
use crate::tier::TierHours;

/// Complexity signals for a project, scores on a 0-10 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityMetrics {
    /// Overall complexity score (0-10)
    pub overall: f64,

    /// Codebase size and structure
    pub codebase: DimensionScore,

    /// Dependency graph complexity
    pub dependencies: DimensionScore,

    /// Architecture complexity and accumulated debt
    pub architecture: ArchitectureMetrics,

    /// Test suite state
    pub testing: TestingMetrics,

    /// Documentation state
    pub documentation: DocumentationMetrics,
}

/// A plain per-dimension score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DimensionScore {
    /// Score (0-10)
    pub score: f64,
}

/// Architecture dimension.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ArchitectureMetrics {
    /// Score (0-10)
    pub score: f64,
    /// Estimated technical debt in hours
    pub technical_debt_hours: f64,
}

/// Testing dimension.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TestingMetrics {
    /// Score (0-10)
    pub score: f64,
    /// Line coverage, percent
    pub coverage_percentage: f64,
}

/// Documentation dimension.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentationMetrics {
    /// Score (0-10)
    pub score: f64,
    /// Documentation completeness, percent
    pub completeness_percentage: f64,
}

impl ComplexityMetrics {
    /// Metrics with every dimension at the given score and neutral
    /// coverage/completeness/debt values.
    pub fn uniform(score: f64) -> Self {
        Self {
            overall: score,
            codebase: DimensionScore { score },
            dependencies: DimensionScore { score },
            architecture: ArchitectureMetrics { score, technical_debt_hours: 0.0 },
            testing: TestingMetrics { score, coverage_percentage: 75.0 },
            documentation: DocumentationMetrics { score, completeness_percentage: 65.0 },
        }
    }
}

/// Risk of the plan failing, percentages on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Overall risk, percent
    pub overall: f64,

    /// Risk of running out of quota
    pub quota: QuotaRisk,

    /// Risk of overrunning the time budget
    pub time: RiskFactor,

    /// Risk stemming from complexity
    pub complexity: RiskFactor,
}

/// A single risk probability.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RiskFactor {
    /// Probability, percent
    pub probability: f64,
}

/// Quota risk with per-tier usage.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QuotaRisk {
    /// Probability of exceeding quota, percent
    pub probability: f64,
    /// Hours already used this week
    #[serde(default)]
    pub current_usage: TierHours,
    /// Hours expected by the end of the week
    #[serde(default)]
    pub projected_usage: TierHours,
}

impl RiskAssessment {
    /// Risk with every probability (and the overall value) set to `percent`
    /// and no quota usage.
    pub fn flat(percent: f64) -> Self {
        Self {
            overall: percent,
            quota: QuotaRisk {
                probability: percent,
                ..Default::default()
            },
            time: RiskFactor { probability: percent },
            complexity: RiskFactor { probability: percent },
        }
    }
}
