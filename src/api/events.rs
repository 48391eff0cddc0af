//! Event authoring, lifecycle, and settlement endpoints.
//!
//! All mutations here are admin-gated through the engine; handlers only
//! unpack requests and map errors.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{error_response, require_user, ApiState};
use crate::database::EventChanges;
use crate::engine::{NewEvent, SettlementResult};
use crate::model::{Event, EventStatus, Prediction};

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    pub resolution_date: Option<DateTime<Utc>>,
    /// Open for voting immediately instead of starting as a draft.
    #[serde(default)]
    pub activate: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub resolution_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct SettleRequest {
    pub outcome: Prediction,
}

#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    pub status: Option<EventStatus>,
}

/// POST /events - create an event (admin)
pub async fn create_event(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(payload): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), (StatusCode, String)> {
    let user_id = require_user(&headers)?;

    state
        .events
        .create_event(
            &user_id,
            NewEvent {
                title: payload.title,
                description: payload.description,
                deadline: payload.deadline,
                resolution_date: payload.resolution_date,
                activate: payload.activate,
            },
        )
        .await
        .map(|event| (StatusCode::CREATED, Json(event)))
        .map_err(error_response)
}

/// GET /events - list events, optionally filtered by status
pub async fn list_events(
    State(state): State<ApiState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<Vec<Event>>, (StatusCode, String)> {
    state
        .events
        .list_events(query.status)
        .await
        .map(Json)
        .map_err(error_response)
}

/// GET /events/{event_id} - one event with its aggregates
pub async fn get_event(
    State(state): State<ApiState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Event>, (StatusCode, String)> {
    state
        .events
        .get_event(event_id)
        .await
        .map(Json)
        .map_err(error_response)
}

/// PUT /events/{event_id} - edit a draft or active event (admin)
pub async fn update_event(
    State(state): State<ApiState>,
    Path(event_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<Json<Event>, (StatusCode, String)> {
    let user_id = require_user(&headers)?;

    state
        .events
        .update_event(
            &user_id,
            event_id,
            EventChanges {
                title: payload.title,
                description: payload.description,
                deadline: payload.deadline,
                resolution_date: payload.resolution_date,
            },
        )
        .await
        .map(Json)
        .map_err(error_response)
}

/// POST /events/{event_id}/activate - open a draft for voting (admin)
pub async fn activate_event(
    State(state): State<ApiState>,
    Path(event_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Event>, (StatusCode, String)> {
    let user_id = require_user(&headers)?;
    state
        .events
        .activate(&user_id, event_id)
        .await
        .map(Json)
        .map_err(error_response)
}

/// POST /events/{event_id}/close - stop accepting votes (admin)
pub async fn close_event(
    State(state): State<ApiState>,
    Path(event_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Event>, (StatusCode, String)> {
    let user_id = require_user(&headers)?;
    state
        .events
        .close(&user_id, event_id)
        .await
        .map(Json)
        .map_err(error_response)
}

/// POST /events/{event_id}/cancel - cancel without scoring anyone (admin)
pub async fn cancel_event(
    State(state): State<ApiState>,
    Path(event_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Event>, (StatusCode, String)> {
    let user_id = require_user(&headers)?;
    state
        .events
        .cancel(&user_id, event_id)
        .await
        .map(Json)
        .map_err(error_response)
}

/// POST /events/{event_id}/settle - record the outcome and fan out (admin)
pub async fn settle_event(
    State(state): State<ApiState>,
    Path(event_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<SettleRequest>,
) -> Result<Json<SettlementResult>, (StatusCode, String)> {
    let user_id = require_user(&headers)?;

    state
        .settlement
        .settle(event_id, payload.outcome, &user_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/{event_id}", get(get_event).put(update_event))
        .route("/events/{event_id}/activate", post(activate_event))
        .route("/events/{event_id}/close", post(close_event))
        .route("/events/{event_id}/cancel", post(cancel_event))
        .route("/events/{event_id}/settle", post(settle_event))
}
