//! Vote endpoints.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{error_response, require_user, ApiState};
use crate::model::{Confidence, Prediction, Vote};

#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    pub prediction: Prediction,
    /// Defaults to medium, matching the voting form's initial position.
    pub confidence: Option<Confidence>,
}

/// POST /events/{event_id}/vote - cast the caller's vote
pub async fn cast_vote(
    State(state): State<ApiState>,
    Path(event_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<CastVoteRequest>,
) -> Result<Json<Vote>, (StatusCode, String)> {
    let user_id = require_user(&headers)?;
    let confidence = payload.confidence.unwrap_or(Confidence::Medium);

    state
        .ledger
        .cast_vote(&user_id, event_id, payload.prediction, confidence)
        .await
        .map(Json)
        .map_err(error_response)
}

/// GET /events/{event_id}/vote - the caller's vote on this event, if any
pub async fn get_my_vote(
    State(state): State<ApiState>,
    Path(event_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Option<Vote>>, (StatusCode, String)> {
    let user_id = require_user(&headers)?;

    state
        .ledger
        .user_vote(&user_id, event_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub fn routes() -> Router<ApiState> {
    Router::new().route("/events/{event_id}/vote", get(get_my_vote).post(cast_vote))
}
