//! Persistence seam.
//!
//! The engine talks to a [`Store`]: a durable backend offering transactional
//! multi-row commits, a uniqueness constraint for vote de-duplication, and
//! atomic increments on the aggregate columns. Two backends implement it:
//!
//! - [`postgres::PostgresStore`] for production, and
//! - [`memory::MemoryStore`], used when Postgres is disabled and by the
//!   test suite.
//!
//! Operations that must be atomic (vote insert + aggregate bump, a
//! settlement chunk, the settled-status claim) are single trait methods so a
//! torn write is unrepresentable at the call site.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{
    Badge, Event, EventStatus, LeaderboardEntry, PlatformStats, Prediction, Profile, UserBadge,
    UserStats, Vote,
};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Partial update for an event's editable fields. `None` leaves a field
/// untouched; aggregates and outcome are not editable through this path.
#[derive(Debug, Default, Clone)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub resolution_date: Option<DateTime<Utc>>,
}

/// One vote's settlement write: correctness plus the caster's deltas.
/// Applied only if the vote is still unscored, which makes re-application
/// after a crash a no-op.
#[derive(Debug, Clone)]
pub struct VoteSettlement {
    pub vote_id: Uuid,
    pub user_id: String,
    pub is_correct: bool,
    pub trust_delta: f64,
    pub xp_delta: i64,
}

/// The fields the ranking recompute sorts on.
#[derive(Debug, Clone)]
pub struct RankingInput {
    pub user_id: String,
    pub trust_score: f64,
    pub correct_predictions: i64,
    pub total_predictions: i64,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait Store: Send + Sync {
    // -- profiles --

    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError>;

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError>;

    // -- events --

    async fn insert_event(&self, event: &Event) -> Result<(), StoreError>;

    async fn get_event(&self, event_id: Uuid) -> Result<Option<Event>, StoreError>;

    /// Events filtered by status, newest first.
    async fn list_events(&self, status: Option<EventStatus>) -> Result<Vec<Event>, StoreError>;

    async fn update_event_details(
        &self,
        event_id: Uuid,
        changes: &EventChanges,
    ) -> Result<(), StoreError>;

    /// Compare-and-set status transition. Returns true iff the event was in
    /// one of `from` and is now `to`; a concurrent caller that lost the race
    /// sees false.
    async fn transition_status(
        &self,
        event_id: Uuid,
        from: &[EventStatus],
        to: EventStatus,
    ) -> Result<bool, StoreError>;

    /// The settlement commit point: closed -> settled, recording outcome,
    /// settler and timestamp in one conditional write. At most one caller
    /// ever gets true for a given event.
    async fn claim_settlement(
        &self,
        event_id: Uuid,
        outcome: Prediction,
        settled_by: &str,
    ) -> Result<bool, StoreError>;

    // -- votes --

    /// Insert the vote row and bump the matching aggregate columns as one
    /// atomic unit. Fails with [`StoreError::DuplicateVote`] if the
    /// (user, event) pair already voted, and with
    /// [`StoreError::EventNotActive`] if the event's status left `active`
    /// between the caller's precondition check and this write.
    async fn record_vote(&self, vote: &Vote) -> Result<(), StoreError>;

    async fn get_vote(&self, user_id: &str, event_id: Uuid) -> Result<Option<Vote>, StoreError>;

    async fn list_votes(&self, event_id: Uuid) -> Result<Vec<Vote>, StoreError>;

    /// Votes on the event not yet scored (`is_correct` unset), oldest first.
    async fn unsettled_votes(&self, event_id: Uuid, limit: i64) -> Result<Vec<Vote>, StoreError>;

    async fn voter_ids(&self, event_id: Uuid) -> Result<Vec<String>, StoreError>;

    /// Apply one settlement chunk in a single transaction. Votes already
    /// scored are skipped, so replaying a chunk cannot double-apply deltas.
    /// Returns the number of votes actually scored.
    async fn apply_settlements(&self, updates: &[VoteSettlement]) -> Result<u64, StoreError>;

    // -- stats --

    async fn get_stats(&self, user_id: &str) -> Result<Option<UserStats>, StoreError>;

    // -- badges --

    async fn badge_catalog(&self) -> Result<Vec<Badge>, StoreError>;

    async fn user_badges(&self, user_id: &str) -> Result<Vec<UserBadge>, StoreError>;

    /// Insert-if-absent award. Returns true iff the badge was newly earned.
    async fn award_badge(&self, user_id: &str, badge_id: &str) -> Result<bool, StoreError>;

    // -- ranking & read models --

    async fn ranking_inputs(&self, min_predictions: i64) -> Result<Vec<RankingInput>, StoreError>;

    /// Persist freshly assigned ranks and null out everyone below the floor.
    async fn write_ranks(
        &self,
        ranks: &[(String, i64)],
        min_predictions: i64,
    ) -> Result<(), StoreError>;

    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, StoreError>;

    async fn platform_stats(&self) -> Result<PlatformStats, StoreError>;
}
