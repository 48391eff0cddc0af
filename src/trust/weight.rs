//! Vote weight at cast time.
//!
//! The weight a vote contributes to an event's weighted tally is fixed when
//! the vote is recorded and never recomputed, so historical aggregates stay
//! reproducible no matter how the voter's trust score moves later.

use crate::model::Confidence;
use crate::trust::tier::tier_of;

/// Confidence contribution to the consensus weight. All levels count the
/// same: confidence scales the voter's settlement stakes, not how loudly
/// their vote speaks in the aggregate.
pub fn confidence_factor(_confidence: Confidence) -> f64 {
    1.0
}

/// Weight contributed to the event's weighted tally, always non-negative.
pub fn vote_weight(trust_score: f64, confidence: Confidence) -> f64 {
    tier_of(trust_score).multiplier() * confidence_factor(confidence)
}
