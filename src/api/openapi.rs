//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the sailor REST API using utoipa for
//! compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the sailor REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "sailor REST API",
        version = "0.1.0",
        description = "REST API for sequential episode-range torrent campaigns: submit a season/episode range, signal completions, inspect the queue",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        // Campaigns
        crate::api::routes::submit_campaign,
        crate::api::routes::notify_completion,

        // Queue
        crate::api::routes::get_queue,
        crate::api::routes::clear_queue,

        // Library
        crate::api::routes::list_shows,
        crate::api::routes::search,
        crate::api::routes::start_download,

        // System
        crate::api::routes::health_check,
        crate::api::routes::get_status,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::MediaType,
        crate::types::ShowMapping,
        crate::types::EpisodeWorkItem,
        crate::types::CandidateSource,
        crate::types::RangeBounds,
        crate::types::RangeRequest,
        crate::types::RangeSubmission,
        crate::types::Durability,
        crate::types::DriverState,
        crate::types::SingleDownloadRequest,
        crate::types::SingleDownload,
        crate::types::CompletionOutcome,
        crate::types::ClearOutcome,
        crate::types::OrchestratorStatus,
        crate::types::Event,

        // API request/response types from routes
        crate::api::routes::SearchQuery,
        crate::api::routes::QueueResponse,
        crate::api::routes::ShowsResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "campaigns", description = "Range campaigns - Submit episode ranges and signal finished transfers"),
        (name = "queue", description = "Queue - Inspect and clear pending episodes"),
        (name = "library", description = "Library - Show mappings, indexer search and one-off downloads"),
        (name = "system", description = "System endpoints - Health checks, status, OpenAPI spec, events"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security addon to add API key authentication scheme to OpenAPI spec
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("X-Api-Key"),
                    ),
                ),
            );
            components.add_security_scheme(
                "api_key_query",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Query(
                        utoipa::openapi::security::ApiKeyValue::new("api_key"),
                    ),
                ),
            );
        }
    }
}
