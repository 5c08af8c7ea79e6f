//! Capability traits consumed by the orchestrator

use async_trait::async_trait;
use std::path::Path;

use crate::error::ProviderError;
use crate::types::{CandidateSource, SeriesInfo};

/// Result type for metadata and search lookups
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Series and season metadata lookup
///
/// Implementations report a title the service does not know as
/// [`ProviderError::NotFound`] and anything that prevented an answer as
/// [`ProviderError::Transport`].
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Canonical identity and season count for a user-typed title
    async fn series(&self, title: &str) -> ProviderResult<SeriesInfo>;

    /// Number of episodes the service lists for one season
    async fn season_episode_count(&self, title: &str, season: u32) -> ProviderResult<u32>;

    /// Short adapter name used in logs
    fn name(&self) -> &'static str;
}

/// Candidate source search
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Candidates for a free-text query, in the order the service ranked them
    ///
    /// An empty result is not an error.
    async fn search(&self, query: &str) -> ProviderResult<Vec<CandidateSource>>;

    /// Short adapter name used in logs
    fn name(&self) -> &'static str;
}

/// Download backend that performs the actual transfer
///
/// `start` returns once the backend has accepted the transfer; completion is
/// reported back out-of-band through
/// [`RangeOrchestrator::notify_completion`](crate::RangeOrchestrator::notify_completion).
#[async_trait]
pub trait DownloadBackend: Send + Sync {
    /// Ask the backend to begin fetching `locator`
    ///
    /// `save_path` of `None` leaves the backend's default location in place.
    async fn start(&self, locator: &str, save_path: Option<&Path>) -> crate::Result<()>;

    /// Short adapter name used in logs
    fn name(&self) -> &'static str;
}
