//! Trust scoring: tier bands, vote weighting, and settlement deltas.
//!
//! Everything in this module is a pure function of its inputs. The tier
//! table decides how much a vote counts toward consensus; the score updater
//! decides what a vote costs or earns its caster at settlement. The two
//! scales are deliberately independent.

pub mod score;
pub mod tier;
pub mod weight;

pub use score::{apply_trust_delta, settlement_delta, ScoreDelta};
pub use tier::{tier_of, TrustTier};
pub use weight::{confidence_factor, vote_weight};
