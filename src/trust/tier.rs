//! Trust tiers and their vote-weight multipliers.
//!
//! Five contiguous bands cover the whole [0, 1] score range; there is no
//! gap or overlap, so `tier_of` is total.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustTier {
    Newcomer,
    Regular,
    Reliable,
    Expert,
    Superforecaster,
}

impl TrustTier {
    /// How much a vote from this tier counts toward the weighted consensus.
    pub fn multiplier(&self) -> f64 {
        match self {
            TrustTier::Newcomer => 0.5,
            TrustTier::Regular => 0.8,
            TrustTier::Reliable => 1.0,
            TrustTier::Expert => 1.5,
            TrustTier::Superforecaster => 2.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrustTier::Newcomer => "Newcomer",
            TrustTier::Regular => "Regular",
            TrustTier::Reliable => "Reliable",
            TrustTier::Expert => "Expert",
            TrustTier::Superforecaster => "Superforecaster",
        }
    }
}

/// Map a trust score to its tier. Scores outside [0, 1] are clamped first,
/// so the function is defined for any input.
pub fn tier_of(score: f64) -> TrustTier {
    let score = score.clamp(0.0, 1.0);
    if score < 0.55 {
        TrustTier::Newcomer
    } else if score < 0.65 {
        TrustTier::Regular
    } else if score < 0.75 {
        TrustTier::Reliable
    } else if score < 0.85 {
        TrustTier::Expert
    } else {
        TrustTier::Superforecaster
    }
}
