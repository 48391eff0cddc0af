//! HTTP API endpoints.
//!
//! Provides REST APIs for:
//! - Vote casting and vote lookup
//! - Event authoring, lifecycle transitions, and settlement (admin)
//! - Leaderboard, user stats, badges, and platform stats (read-only)
//!
//! The surrounding identity layer authenticates requests and forwards the
//! opaque user id in the `x-user-id` header; handlers trust it as given.

pub mod events;
pub mod leaderboard;
pub mod votes;

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::Router;
use tracing::error;

use crate::config::ScoringConfig;
use crate::database::Store;
use crate::engine::{EventManager, SettlementOrchestrator, VoteLedger};
use crate::error::EngineError;

/// Shared handler state: the store plus one of each engine component.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn Store>,
    pub ledger: Arc<VoteLedger>,
    pub events: Arc<EventManager>,
    pub settlement: Arc<SettlementOrchestrator>,
    pub leaderboard_limit: i64,
}

impl ApiState {
    pub fn new(store: Arc<dyn Store>, scoring: &ScoringConfig) -> Self {
        let ledger = Arc::new(VoteLedger::new(store.clone()));
        let events = Arc::new(EventManager::new(store.clone()));
        let settlement = Arc::new(
            SettlementOrchestrator::new(store.clone())
                .with_chunk_size(scoring.settlement_chunk_size)
                .with_min_predictions(scoring.min_predictions_for_ranking),
        );
        Self {
            store,
            ledger,
            events,
            settlement,
            leaderboard_limit: scoring.leaderboard_limit,
        }
    }
}

/// Build the full application router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .merge(events::routes())
        .merge(votes::routes())
        .merge(leaderboard::routes())
        .with_state(state)
}

/// Pull the authenticated user id out of the forwarded header.
pub(crate) fn require_user(headers: &HeaderMap) -> Result<String, (StatusCode, String)> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                EngineError::NotAuthenticated.to_string(),
            )
        })
}

/// Map engine errors onto status codes. Precondition failures keep their
/// human-readable reason; storage failures are logged and masked.
pub(crate) fn error_response(err: EngineError) -> (StatusCode, String) {
    let status = match &err {
        EngineError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        EngineError::Banned | EngineError::NotAuthorized => StatusCode::FORBIDDEN,
        EngineError::ProfileNotFound | EngineError::EventNotFound => StatusCode::NOT_FOUND,
        EngineError::EventNotActive
        | EngineError::DeadlinePassed
        | EngineError::AlreadyVoted
        | EngineError::EventNotClosed
        | EngineError::InvalidTransition { .. } => StatusCode::CONFLICT,
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::Store(_) => {
            error!(error = %err, "Storage failure");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            );
        }
    };
    (status, err.to_string())
}
