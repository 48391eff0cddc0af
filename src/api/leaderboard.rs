//! Read-only endpoints: leaderboard, per-user stats and badges, platform
//! counters. Nothing here mutates state.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::{error_response, ApiState};
use crate::error::EngineError;
use crate::model::{LeaderboardEntry, PlatformStats, UserBadge, UserStats};

/// GET /leaderboard - ranked users, best first
pub async fn get_leaderboard(
    State(state): State<ApiState>,
) -> Result<Json<Vec<LeaderboardEntry>>, (StatusCode, String)> {
    state
        .store
        .leaderboard(state.leaderboard_limit)
        .await
        .map(Json)
        .map_err(|e| error_response(EngineError::Store(e)))
}

/// GET /users/{user_id}/stats - prediction statistics for one user
pub async fn get_user_stats(
    State(state): State<ApiState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserStats>, (StatusCode, String)> {
    match state.store.get_stats(&user_id).await {
        // A user who never had a vote settled simply has empty stats.
        Ok(stats) => Ok(Json(stats.unwrap_or_else(|| UserStats::empty(&user_id)))),
        Err(e) => Err(error_response(EngineError::Store(e))),
    }
}

/// GET /users/{user_id}/badges - badges the user has earned
pub async fn get_user_badges(
    State(state): State<ApiState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<UserBadge>>, (StatusCode, String)> {
    state
        .store
        .user_badges(&user_id)
        .await
        .map(Json)
        .map_err(|e| error_response(EngineError::Store(e)))
}

/// GET /stats - platform-wide counters
pub async fn get_platform_stats(
    State(state): State<ApiState>,
) -> Result<Json<PlatformStats>, (StatusCode, String)> {
    state
        .store
        .platform_stats()
        .await
        .map(Json)
        .map_err(|e| error_response(EngineError::Store(e)))
}

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/leaderboard", get(get_leaderboard))
        .route("/users/{user_id}/stats", get(get_user_stats))
        .route("/users/{user_id}/badges", get(get_user_badges))
        .route("/stats", get(get_platform_stats))
}
