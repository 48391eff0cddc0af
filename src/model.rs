//! Domain rows and enums shared by the engine, the stores, and the API.
//!
//! Rows mirror the persisted schema one-to-one. Anything captured on a vote
//! at cast time (trust snapshot, weight) is immutable afterwards; historical
//! reads never join against the live profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event lifecycle. Forward-only; `Settled` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Active,
    Closed,
    Settled,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Active => "active",
            EventStatus::Closed => "closed",
            EventStatus::Settled => "settled",
            EventStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(EventStatus::Draft),
            "active" => Some(EventStatus::Active),
            "closed" => Some(EventStatus::Closed),
            "settled" => Some(EventStatus::Settled),
            "cancelled" => Some(EventStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EventStatus::Settled | EventStatus::Cancelled)
    }
}

/// A Yes/No prediction. Also the type of a settled event's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prediction {
    Yes,
    No,
}

impl Prediction {
    pub fn as_bool(&self) -> bool {
        matches!(self, Prediction::Yes)
    }

    pub fn from_bool(b: bool) -> Self {
        if b { Prediction::Yes } else { Prediction::No }
    }
}

/// Self-reported confidence attached to a vote. Scales the settlement
/// reward/penalty, not the consensus weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Percent-confidence proxy used by the settlement formulas.
    pub fn percent(&self) -> f64 {
        match self {
            Confidence::Low => 50.0,
            Confidence::Medium => 75.0,
            Confidence::High => 99.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Confidence::Low),
            "medium" => Some(Confidence::Medium),
            "high" => Some(Confidence::High),
            _ => None,
        }
    }
}

/// A registered user. `id` is the opaque id minted by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,

    /// Accuracy-derived score in [0, 1]; new accounts start at 0.5.
    /// Mutated only by settlement.
    pub trust_score: f64,

    pub is_admin: bool,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub const INITIAL_TRUST_SCORE: f64 = 0.5;

    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            trust_score: Self::INITIAL_TRUST_SCORE,
            is_admin: false,
            is_banned: false,
            created_at: Utc::now(),
        }
    }
}

/// A predictable event with its running vote aggregates.
///
/// The four aggregate columns only ever increase while the event is active,
/// and are frozen the moment it leaves `Active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    pub resolution_date: Option<DateTime<Utc>>,
    pub status: EventStatus,

    /// Set exactly once, at settlement.
    pub outcome: Option<Prediction>,

    pub yes_count: i64,
    pub no_count: i64,
    pub weighted_yes: f64,
    pub weighted_no: f64,

    pub created_by: Option<String>,
    pub settled_by: Option<String>,
    pub settled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn total_votes(&self) -> i64 {
        self.yes_count + self.no_count
    }

    pub fn total_weight(&self) -> f64 {
        self.weighted_yes + self.weighted_no
    }
}

/// An immutable vote record. Weight and trust snapshot are fixed at cast
/// time; `is_correct` is written exactly once, at settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub id: Uuid,
    pub user_id: String,
    pub event_id: Uuid,
    pub prediction: Prediction,
    pub confidence: Confidence,
    pub trust_score_at_vote: f64,
    pub weight: f64,
    pub is_correct: Option<bool>,
    pub created_at: DateTime<Utc>,
}

/// Per-user prediction statistics. Written only during settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: String,
    pub total_predictions: i64,
    pub correct_predictions: i64,
    pub current_streak: i64,
    pub best_streak: i64,
    pub xp: i64,

    /// Null until the user clears the minimum-predictions floor.
    pub rank: Option<i64>,

    pub updated_at: DateTime<Utc>,
}

impl UserStats {
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            total_predictions: 0,
            correct_predictions: 0,
            current_streak: 0,
            best_streak: 0,
            xp: 0,
            rank: None,
            updated_at: Utc::now(),
        }
    }

    /// Fraction of settled predictions that were correct, if any.
    pub fn accuracy(&self) -> Option<f64> {
        if self.total_predictions == 0 {
            None
        } else {
            Some(self.correct_predictions as f64 / self.total_predictions as f64)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl BadgeTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeTier::Bronze => "bronze",
            BadgeTier::Silver => "silver",
            BadgeTier::Gold => "gold",
            BadgeTier::Platinum => "platinum",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bronze" => Some(BadgeTier::Bronze),
            "silver" => Some(BadgeTier::Silver),
            "gold" => Some(BadgeTier::Gold),
            "platinum" => Some(BadgeTier::Platinum),
            _ => None,
        }
    }
}

/// What a badge rewards. `criteria_value` is an integer threshold for every
/// variant except `Accuracy`, where it is a ratio in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCriteria {
    FirstVote,
    Votes,
    Streak,
    Accuracy,
    Rank,
}

impl BadgeCriteria {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeCriteria::FirstVote => "first_vote",
            BadgeCriteria::Votes => "votes",
            BadgeCriteria::Streak => "streak",
            BadgeCriteria::Accuracy => "accuracy",
            BadgeCriteria::Rank => "rank",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "first_vote" => Some(BadgeCriteria::FirstVote),
            "votes" => Some(BadgeCriteria::Votes),
            "streak" => Some(BadgeCriteria::Streak),
            "accuracy" => Some(BadgeCriteria::Accuracy),
            "rank" => Some(BadgeCriteria::Rank),
            _ => None,
        }
    }
}

/// Static catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tier: BadgeTier,
    pub criteria: BadgeCriteria,
    pub criteria_value: f64,
}

/// Award record. Unique per (user, badge); created once, never removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBadge {
    pub user_id: String,
    pub badge_id: String,
    pub earned_at: DateTime<Utc>,
}

/// One leaderboard row, as consumed by the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub user_id: String,
    pub username: String,
    pub trust_score: f64,
    pub total_predictions: i64,
    pub correct_predictions: i64,
    pub accuracy_pct: f64,
    pub current_streak: i64,
    pub best_streak: i64,
    pub badge_count: i64,
}

/// Platform-wide counters for the landing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformStats {
    pub total_users: i64,
    pub active_events: i64,
    pub settled_events: i64,
    pub total_votes: i64,
}
