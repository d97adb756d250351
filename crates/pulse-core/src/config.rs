//! Engine configuration.
//!
//! Score weights and tier thresholds are tuning parameters, not logic:
//! they are carried as plain serde structs so the binary can override them
//! from flags or environment without code change.

use serde::{Deserialize, Serialize};

/// Weights for the engagement score formula.
///
/// `score = like_weight * like_count + comment_weight * comment_count`.
///
/// Comments default to twice the weight of likes since they indicate
/// deeper engagement than a one-tap like.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreWeights {
    pub like_weight: f64,
    pub comment_weight: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            like_weight: 1.0,
            comment_weight: 2.0,
        }
    }
}

/// Boundaries for classifying a user's average engagement into a tier.
///
/// Boundary values are inclusive: an average exactly equal to `high`
/// classifies as High.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TierThresholds {
    /// Minimum average engagement for the High tier.
    pub high: f64,
    /// Minimum average engagement for the Medium tier.
    pub medium: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            high: 10.0,
            medium: 3.0,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct EngineConfig {
    pub weights: ScoreWeights,
    pub tiers: TierThresholds,
}
