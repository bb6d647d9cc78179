//! Planner configuration.

use serde::{Deserialize, Serialize};
use sessionplan_core::TierHours;
use crate::{PlanError, Result};

/// Configuration for the planning engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Hard weekly quota per tier, in hours
    pub weekly_limits: TierHours,

    /// Share of the weekly limit that counts as safe (guard and validator errors)
    pub safety_threshold: f64,

    /// Share of the weekly limit that triggers a validator warning
    pub warning_threshold: f64,

    /// Uncertainty buffer added on top of the raw token total
    pub token_buffer: f64,

    /// Plans longer than this get a split-into-phases warning
    pub max_plan_minutes: u32,

    /// Plans below this confidence get a warning
    pub min_confidence: u8,

    /// Hours taken off the non-preferred tier when re-optimizing with a preference
    pub preference_shift_hours: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            weekly_limits: TierHours::new(480.0, 40.0),
            safety_threshold: 0.9,
            warning_threshold: 0.8,
            token_buffer: 0.2,
            max_plan_minutes: 600,
            min_confidence: 50,
            preference_shift_hours: 10.0,
        }
    }
}

impl PlannerConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set weekly limits.
    pub fn with_weekly_limits(mut self, limits: TierHours) -> Self {
        self.weekly_limits = limits;
        self
    }

    /// Set the safety threshold.
    pub fn with_safety_threshold(mut self, threshold: f64) -> Self {
        self.safety_threshold = threshold;
        self
    }

    /// Set the overlong-plan threshold.
    pub fn with_max_plan_minutes(mut self, minutes: u32) -> Self {
        self.max_plan_minutes = minutes;
        self
    }

    /// Parse from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PlanError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Safe hours for a tier.
    pub fn safe_limits(&self) -> TierHours {
        TierHours::new(
            self.weekly_limits.fast * self.safety_threshold,
            self.weekly_limits.deep * self.safety_threshold,
        )
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.weekly_limits.fast <= 0.0 || self.weekly_limits.deep <= 0.0 {
            return Err(PlanError::InvalidConfig("weekly limits must be positive".to_string()));
        }
        for (name, value) in [
            ("safety_threshold", self.safety_threshold),
            ("warning_threshold", self.warning_threshold),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(PlanError::InvalidConfig(format!("{} must be in (0, 1], got {}", name, value)));
            }
        }
        if self.warning_threshold > self.safety_threshold {
            return Err(PlanError::InvalidConfig(
                "warning_threshold must not exceed safety_threshold".to_string(),
            ));
        }
        if self.token_buffer < 0.0 {
            return Err(PlanError::InvalidConfig("token_buffer must not be negative".to_string()));
        }
        if self.preference_shift_hours < 0.0 {
            return Err(PlanError::InvalidConfig("preference_shift_hours must not be negative".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = PlannerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.safe_limits().deep, 36.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PlannerConfig::from_json(r#"{"max_plan_minutes": 300}"#).unwrap();
        assert_eq!(config.max_plan_minutes, 300);
        assert_eq!(config.weekly_limits.deep, 40.0);
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let err = PlannerConfig::from_json(r#"{"safety_threshold": 1.5}"#).unwrap_err();
        assert!(matches!(err, PlanError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_warning_above_safety() {
        let config = PlannerConfig {
            warning_threshold: 0.95,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_limit() {
        let config = PlannerConfig::new().with_weekly_limits(TierHours::new(0.0, 40.0));
        assert!(config.validate().is_err());
    }
}
