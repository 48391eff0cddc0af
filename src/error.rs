//! Error taxonomy for the engine.
//!
//! Precondition failures carry the short human-readable reason shown to the
//! caller and are never retried. Storage failures are wrapped and bubble up
//! for the caller to retry (settlement re-invocation is idempotent per vote).

use thiserror::Error;

/// Storage-layer failures, shared by both store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The (user, event) uniqueness constraint rejected a second vote.
    #[error("duplicate vote for this user and event")]
    DuplicateVote,

    /// The vote-record operation found the event no longer accepting votes.
    #[error("event is not accepting votes")]
    EventNotActive,

    #[error("row not found")]
    NotFound,

    /// A persisted value failed to decode into its domain type.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Your account has been suspended")]
    Banned,

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Event not found")]
    EventNotFound,

    #[error("This event is no longer accepting votes")]
    EventNotActive,

    #[error("Voting deadline has passed")]
    DeadlinePassed,

    #[error("You have already voted on this event")]
    AlreadyVoted,

    #[error("Not authorized")]
    NotAuthorized,

    #[error("Event must be closed before it can be settled")]
    EventNotClosed,

    /// The requested lifecycle transition is not allowed from the event's
    /// current status.
    #[error("Invalid event transition from '{from}'")]
    InvalidTransition { from: &'static str },

    /// Bad input shape, rejected before touching state.
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Precondition and validation errors are surfaced verbatim and must not
    /// be retried; everything else is infrastructure.
    pub fn is_precondition(&self) -> bool {
        !matches!(self, EngineError::Store(_))
    }
}
