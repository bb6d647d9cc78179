//! Plan confidence scoring.

use sessionplan_core::{ComplexityMetrics, RiskAssessment};

const BASE: f64 = 80.0;
const MIN_CONFIDENCE: f64 = 30.0;
const MAX_CONFIDENCE: f64 = 95.0;

/// Scores how much a plan's estimates can be trusted.
pub struct ConfidenceScorer;

impl ConfidenceScorer {
    /// Score in [30, 95].
    ///
    /// `recommendations` is the number already attached to the plan; each
    /// one marks an optimization that was applied.
    pub fn score(&self, complexity: &ComplexityMetrics, risk: &RiskAssessment, recommendations: usize) -> u8 {
        let mut score = BASE;

        score -= 5.0 * (complexity.overall - 5.0).max(0.0);
        score -= 0.3 * (risk.overall - 50.0).max(0.0);

        if complexity.testing.coverage_percentage > 80.0 {
            score += 10.0;
        }
        if complexity.documentation.completeness_percentage > 70.0 {
            score += 5.0;
        }
        if complexity.architecture.technical_debt_hours > 100.0 {
            score -= 15.0;
        }

        score += (2.0 * recommendations as f64).min(10.0);

        score.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE).round() as u8
    }
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self
    }
}
