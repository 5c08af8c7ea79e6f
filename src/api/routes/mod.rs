//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`campaigns`] - Range submission and completion signals
//! - [`queue`] - Pending episodes
//! - [`library`] - Show mappings, search and one-off downloads
//! - [`system`] - Health, status, events, OpenAPI

use serde::{Deserialize, Serialize};

mod campaigns;
mod library;
mod queue;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use campaigns::*;
pub use library::*;
pub use queue::*;
pub use system::*;

/// Query parameters for GET /search
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Free-text query sent to the search provider
    #[serde(default)]
    pub query: String,
}

/// Response for GET /queue
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QueueResponse {
    /// Pending episodes in dispatch order
    pub items: Vec<crate::types::EpisodeWorkItem>,
}

/// Response for GET /shows
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ShowsResponse {
    /// Every known show mapping in insertion order
    pub mappings: Vec<crate::types::ShowMapping>,
}
