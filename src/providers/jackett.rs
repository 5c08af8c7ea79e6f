//! Jackett search adapter

use async_trait::async_trait;
use serde::Deserialize;

use super::traits::{ProviderResult, SearchProvider};
use super::transport_error;
use crate::config::JackettConfig;
use crate::error::ProviderError;
use crate::types::CandidateSource;

/// [`SearchProvider`] backed by a Jackett instance
#[derive(Clone, Debug)]
pub struct JackettClient {
    http: reqwest::Client,
    config: JackettConfig,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "Results", default)]
    results: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Size", default)]
    size: Option<u64>,
    #[serde(rename = "Seeders", default)]
    seeders: Option<u32>,
    #[serde(rename = "MagnetUri", default)]
    magnet_uri: Option<String>,
    #[serde(rename = "Link", default)]
    link: Option<String>,
}

impl SearchEntry {
    /// Magnet link preferred; the torrent download link is the fallback
    fn into_candidate(self) -> Option<CandidateSource> {
        let locator = self
            .magnet_uri
            .filter(|m| !m.is_empty())
            .or(self.link.filter(|l| !l.is_empty()))?;

        Some(CandidateSource {
            title: self.title,
            size_bytes: self.size.unwrap_or(0),
            seeders: self.seeders.unwrap_or(0),
            locator,
        })
    }
}

impl JackettClient {
    /// Create a client from a shared HTTP client and Jackett settings
    pub fn new(http: reqwest::Client, config: JackettConfig) -> Self {
        Self { http, config }
    }

    fn results_url(&self) -> String {
        format!(
            "{}/indexers/all/results",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl SearchProvider for JackettClient {
    async fn search(&self, query: &str) -> ProviderResult<Vec<CandidateSource>> {
        let mut params = vec![
            ("Query", query.to_string()),
            ("apikey", self.config.api_key.clone()),
        ];
        for tracker in &self.config.trackers {
            params.push(("Tracker[]", tracker.clone()));
        }

        let response = self
            .http
            .get(self.results_url())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&params)
            .send()
            .await
            .map_err(|e| transport_error("Jackett request failed", e))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::Unauthorized(
                "Jackett rejected the API key".into(),
            ));
        }
        if !status.is_success() {
            return Err(ProviderError::Transport(format!(
                "Jackett returned HTTP {}",
                status
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Jackett body: {}", e)))?;

        let total = body.results.len();
        let candidates: Vec<CandidateSource> = body
            .results
            .into_iter()
            .filter_map(SearchEntry::into_candidate)
            .collect();

        tracing::debug!(
            query,
            total,
            usable = candidates.len(),
            "Jackett search completed"
        );

        Ok(candidates)
    }

    fn name(&self) -> &'static str {
        "jackett"
    }
}
