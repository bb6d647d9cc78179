//! Execution tiers - the two rate-limited compute resources.

use serde::{Deserialize, Serialize};

/// A rate-limited execution resource with its own weekly quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Throughput-oriented tier
    Fast,
    /// Thoroughness-oriented tier, higher per-task cost
    Deep,
}

impl ModelTier {
    /// Both tiers, fast first.
    pub const ALL: [ModelTier; 2] = [ModelTier::Fast, ModelTier::Deep];

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Fast => "fast",
            ModelTier::Deep => "deep",
        }
    }

    /// The other tier.
    pub fn other(&self) -> ModelTier {
        match self {
            ModelTier::Fast => ModelTier::Deep,
            ModelTier::Deep => ModelTier::Fast,
        }
    }
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModelTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(ModelTier::Fast),
            "deep" => Ok(ModelTier::Deep),
            other => Err(format!("unknown tier '{}', expected 'fast' or 'deep'", other)),
        }
    }
}

/// Tier a task template would rather run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierPreference {
    /// Prefers the fast tier
    Fast,
    /// Prefers the deep tier
    Deep,
    /// No preference
    Either,
}

impl TierPreference {
    /// Concrete tier for this preference; `Either` resolves to fast.
    pub fn resolve(&self) -> ModelTier {
        match self {
            TierPreference::Deep => ModelTier::Deep,
            TierPreference::Fast | TierPreference::Either => ModelTier::Fast,
        }
    }
}

/// Hours per tier.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TierHours {
    /// Fast tier hours
    pub fast: f64,
    /// Deep tier hours
    pub deep: f64,
}

impl TierHours {
    /// Create from both values.
    pub fn new(fast: f64, deep: f64) -> Self {
        Self { fast, deep }
    }

    /// Hours for one tier.
    pub fn get(&self, tier: ModelTier) -> f64 {
        match tier {
            ModelTier::Fast => self.fast,
            ModelTier::Deep => self.deep,
        }
    }

    /// Per-tier maximum of two readings.
    pub fn max(self, other: Self) -> Self {
        Self::new(self.fast.max(other.fast), self.deep.max(other.deep))
    }
}

/// Tokens per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TierTokens {
    /// Fast tier tokens
    pub fast: u64,
    /// Deep tier tokens
    pub deep: u64,
}

impl TierTokens {
    /// Tokens for one tier.
    pub fn get(&self, tier: ModelTier) -> u64 {
        match tier {
            ModelTier::Fast => self.fast,
            ModelTier::Deep => self.deep,
        }
    }

    /// Sum over both tiers.
    pub fn total(&self) -> u64 {
        self.fast + self.deep
    }
}
