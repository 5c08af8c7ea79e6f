//! External collaborators of the orchestrator
//!
//! The orchestrator only sees the capability traits in [`traits`]. Default
//! HTTP adapters are provided for the services the stack is usually run with:
//! - [`OmdbClient`] - series and season metadata
//! - [`JackettClient`] - torrent search across indexers
//! - [`QbittorrentClient`] - qBittorrent WebUI as the download backend

mod jackett;
mod omdb;
mod qbittorrent;
mod traits;

pub use jackett::JackettClient;
pub use omdb::OmdbClient;
pub use qbittorrent::QbittorrentClient;
pub use traits::{DownloadBackend, MetadataProvider, ProviderResult, SearchProvider};

use crate::config::ProvidersConfig;
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

/// The three collaborators a [`RangeOrchestrator`](crate::RangeOrchestrator) drives
#[derive(Clone)]
pub struct Providers {
    /// Series/season metadata lookup
    pub metadata: Arc<dyn MetadataProvider>,
    /// Candidate search
    pub search: Arc<dyn SearchProvider>,
    /// Transfer backend
    pub backend: Arc<dyn DownloadBackend>,
}

impl Providers {
    /// Build the default OMDb + Jackett + qBittorrent adapters from configuration
    pub fn from_config(config: &ProvidersConfig) -> Result<Self> {
        let http = build_http_client(config.request_timeout)?;

        Ok(Self {
            metadata: Arc::new(OmdbClient::new(http.clone(), config.omdb.clone())),
            search: Arc::new(JackettClient::new(http.clone(), config.jackett.clone())),
            backend: Arc::new(QbittorrentClient::new(http, config.qbittorrent.clone())),
        })
    }
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Providers")
            .field("metadata", &self.metadata.name())
            .field("search", &self.search.name())
            .field("backend", &self.backend.name())
            .finish()
    }
}

/// Shared HTTP client for the default adapters
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("sailor/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))
}

/// Map a reqwest failure to the provider taxonomy
pub(crate) fn transport_error(context: &str, e: reqwest::Error) -> crate::error::ProviderError {
    crate::error::ProviderError::Transport(format!("{}: {}", context, e))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProvidersConfig;

    #[test]
    fn test_from_config_wires_default_adapters() {
        let providers = Providers::from_config(&ProvidersConfig::default()).unwrap();

        assert_eq!(providers.metadata.name(), "omdb");
        assert_eq!(providers.search.name(), "jackett");
        assert_eq!(providers.backend.name(), "qbittorrent");

        let debug = format!("{:?}", providers);
        assert!(debug.contains("jackett"));
    }
}
