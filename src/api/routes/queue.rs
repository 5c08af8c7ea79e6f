//! Queue handlers.

use super::QueueResponse;
use crate::api::AppState;
use axum::{Json, extract::State, response::IntoResponse};

/// GET /queue - List pending episodes
#[utoipa::path(
    get,
    path = "/queue",
    tag = "queue",
    responses(
        (status = 200, description = "Pending episodes in dispatch order", body = QueueResponse)
    )
)]
pub async fn get_queue(State(state): State<AppState>) -> impl IntoResponse {
    Json(QueueResponse {
        items: state.orchestrator.queue_snapshot().await,
    })
}

/// DELETE /queue - Drop every pending episode
///
/// A transfer already running in the backend is not affected.
#[utoipa::path(
    delete,
    path = "/queue",
    tag = "queue",
    responses(
        (status = 200, description = "Queue cleared", body = crate::types::ClearOutcome)
    )
)]
pub async fn clear_queue(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.orchestrator.clear_queue().await)
}
