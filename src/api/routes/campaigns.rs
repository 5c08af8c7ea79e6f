//! Campaign handlers: range submission and backend completion signals.

use crate::api::AppState;
use crate::types::RangeRequest;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// POST /campaigns - Start a range-download campaign
#[utoipa::path(
    post,
    path = "/campaigns",
    tag = "campaigns",
    request_body = RangeRequest,
    responses(
        (status = 202, description = "Range accepted; first episode dispatched or queued", body = crate::types::RangeSubmission),
        (status = 422, description = "Season range is empty after clamping", body = crate::error::ApiError),
        (status = 502, description = "Series metadata unavailable", body = crate::error::ApiError)
    )
)]
pub async fn submit_campaign(
    State(state): State<AppState>,
    Json(request): Json<RangeRequest>,
) -> Response {
    let title = request.title.clone();
    match state.orchestrator.submit_range(request).await {
        Ok(submission) => (StatusCode::ACCEPTED, Json(submission)).into_response(),
        Err(e) => {
            tracing::warn!(title = %title, error = %e, "Range submission rejected");
            e.into_response()
        }
    }
}

/// POST /completion - Backend reports a finished transfer
///
/// Also mounted at `POST /torrent-finished` for download clients configured
/// with the legacy hook URL.
#[utoipa::path(
    post,
    path = "/completion",
    tag = "campaigns",
    responses(
        (status = 200, description = "Next episode dispatched, or the campaign went idle", body = crate::types::CompletionOutcome)
    )
)]
pub async fn notify_completion(State(state): State<AppState>) -> impl IntoResponse {
    let outcome = state.orchestrator.notify_completion().await;
    (StatusCode::OK, Json(outcome))
}
