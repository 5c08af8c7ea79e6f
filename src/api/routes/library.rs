//! Library handlers: show mappings, search and one-off downloads.

use super::{SearchQuery, ShowsResponse};
use crate::api::AppState;
use crate::error::ApiError;
use crate::types::SingleDownloadRequest;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// GET /shows - List known show mappings
#[utoipa::path(
    get,
    path = "/shows",
    tag = "library",
    responses(
        (status = 200, description = "Show mappings in insertion order", body = ShowsResponse)
    )
)]
pub async fn list_shows(State(state): State<AppState>) -> impl IntoResponse {
    Json(ShowsResponse {
        mappings: state.orchestrator.mappings_snapshot().await,
    })
}

/// GET /search - Search the torrent indexer
#[utoipa::path(
    get,
    path = "/search",
    tag = "library",
    params(SearchQuery),
    responses(
        (status = 200, description = "Candidates, best-seeded first", body = Vec<crate::types::CandidateSource>),
        (status = 400, description = "Empty query", body = crate::error::ApiError),
        (status = 502, description = "Search provider failed", body = crate::error::ApiError)
    )
)]
pub async fn search(State(state): State<AppState>, Query(params): Query<SearchQuery>) -> Response {
    let query = params.query.trim();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError::validation("query parameter is required")),
        )
            .into_response();
    }

    match state.orchestrator.search(query).await {
        Ok(candidates) => (StatusCode::OK, Json(candidates)).into_response(),
        Err(e) => {
            tracing::warn!(query, error = %e, "Search failed");
            e.into_response()
        }
    }
}

/// POST /downloads - Start a single transfer outside any campaign
#[utoipa::path(
    post,
    path = "/downloads",
    tag = "library",
    request_body = SingleDownloadRequest,
    responses(
        (status = 202, description = "Transfer handed to the backend", body = crate::types::SingleDownload),
        (status = 502, description = "Backend rejected the transfer", body = crate::error::ApiError)
    )
)]
pub async fn start_download(
    State(state): State<AppState>,
    Json(request): Json<SingleDownloadRequest>,
) -> Response {
    match state.orchestrator.start_single(request).await {
        Ok(download) => (StatusCode::ACCEPTED, Json(download)).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Single download failed");
            e.into_response()
        }
    }
}
