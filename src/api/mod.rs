//! REST API server module
//!
//! Exposes range campaigns, the completion hook, the queue and the show
//! mappings over HTTP, with an OpenAPI document and an SSE event stream.

use crate::{Config, RangeOrchestrator, Result};
use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Campaigns
/// - `POST /campaigns` - Start a range campaign
/// - `POST /completion` - Backend finished a transfer
/// - `POST /torrent-finished` - Alias of `/completion`
///
/// ## Queue
/// - `GET /queue` - List pending episodes
/// - `DELETE /queue` - Clear pending episodes
///
/// ## Library
/// - `GET /shows` - List show mappings
/// - `GET /search?query=` - Search the indexer
/// - `POST /downloads` - Start a single transfer
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /status` - Driver state and queue depth
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
/// - `GET /events` - Server-sent events stream
pub fn create_router(orchestrator: Arc<RangeOrchestrator>, config: Arc<Config>) -> Router {
    let state = AppState::new(orchestrator, config.clone());

    let router = Router::new()
        // Campaigns
        .route("/campaigns", post(routes::submit_campaign))
        .route("/completion", post(routes::notify_completion))
        .route("/torrent-finished", post(routes::notify_completion))
        // Queue
        .route("/queue", get(routes::get_queue).delete(routes::clear_queue))
        // Library
        .route("/shows", get(routes::list_shows))
        .route("/search", get(routes::search))
        .route("/downloads", post(routes::start_download))
        // System
        .route("/health", get(routes::health_check))
        .route("/status", get(routes::get_status))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream));

    // SwaggerUi registers its own document route; it must not overlap /openapi.json
    let router = if config.server.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state);

    // Last layer applied is outermost: Request → Trace → CORS → Auth → Handler
    let router = if config.server.api.api_key.is_some() {
        router.layer(middleware::from_fn_with_state(
            config.server.api.api_key.clone(),
            auth::require_api_key,
        ))
    } else {
        router
    };

    let router = if config.server.api.cors_enabled {
        router.layer(build_cors_layer(&config.server.api.cors_origins))
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http())
}

/// Build a CORS layer based on configured origins
///
/// `"*"` (or an empty list) allows any origin. All methods and headers are
/// allowed.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until the server fails. See [`start_api_server_with_shutdown`] for a
/// cancellable variant.
///
/// # Example
///
/// ```no_run
/// use sailor::{Config, Providers, RangeOrchestrator};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default().with_env_overrides();
/// let providers = Providers::from_config(&config.providers)?;
/// let orchestrator = Arc::new(RangeOrchestrator::new(config.clone(), providers).await?);
///
/// // Blocks until the server stops
/// sailor::api::start_api_server(orchestrator, Arc::new(config)).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(
    orchestrator: Arc<RangeOrchestrator>,
    config: Arc<Config>,
) -> Result<()> {
    start_api_server_with_shutdown(orchestrator, config, CancellationToken::new()).await
}

/// Start the API server and stop accepting connections once `shutdown` is cancelled
///
/// In-flight requests are allowed to finish before this returns.
pub async fn start_api_server_with_shutdown(
    orchestrator: Arc<RangeOrchestrator>,
    config: Arc<Config>,
    shutdown: CancellationToken,
) -> Result<()> {
    let bind_address = config.server.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(orchestrator, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %listener.local_addr().unwrap_or(bind_address),
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
