//! The aggregation and settlement engine.
//!
//! Each submodule owns one operation family:
//! - `ledger`     - vote casting against active events
//! - `settlement` - the closed -> settled saga and its fan-out
//! - `badges`     - catalog and idempotent award evaluation
//! - `ranking`    - full leaderboard recompute
//! - `events`     - admin-gated event lifecycle

pub mod badges;
pub mod events;
pub mod ledger;
pub mod ranking;
pub mod settlement;

/// Users below this many settled predictions carry no rank and cannot earn
/// accuracy badges.
pub const MIN_PREDICTIONS_FOR_RANKING: i64 = 5;

/// Votes scored per settlement transaction. A crash loses at most one
/// chunk of work, which the next invocation redoes.
pub const SETTLEMENT_CHUNK_SIZE: i64 = 500;

pub use badges::{default_catalog, BadgeEvaluator};
pub use events::{EventManager, NewEvent};
pub use ledger::VoteLedger;
pub use ranking::RankingRecalculator;
pub use settlement::{SettlementOrchestrator, SettlementResult};
