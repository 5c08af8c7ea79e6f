//! OMDb metadata adapter

use async_trait::async_trait;
use serde::Deserialize;

use super::traits::{MetadataProvider, ProviderResult};
use super::transport_error;
use crate::config::OmdbConfig;
use crate::error::ProviderError;
use crate::types::SeriesInfo;

/// [`MetadataProvider`] backed by the OMDb API
///
/// OMDb answers HTTP 200 for unknown titles and signals the miss with
/// `"Response": "False"`, so the body is always inspected.
#[derive(Clone, Debug)]
pub struct OmdbClient {
    http: reqwest::Client,
    config: OmdbConfig,
}

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "totalSeasons", default)]
    total_seasons: Option<String>,
    #[serde(rename = "Response", default)]
    response: String,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SeasonResponse {
    #[serde(rename = "Episodes", default)]
    episodes: Vec<serde_json::Value>,
    #[serde(rename = "Response", default)]
    response: String,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

impl OmdbClient {
    /// Create a client from a shared HTTP client and OMDb settings
    pub fn new(http: reqwest::Client, config: OmdbConfig) -> Self {
        Self { http, config }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        params: &[(&str, String)],
    ) -> ProviderResult<T> {
        let mut query = vec![("apikey", self.config.api_key.clone())];
        query.extend(params.iter().cloned());

        let response = self
            .http
            .get(&self.config.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| transport_error("OMDb request failed", e))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::Unauthorized("OMDb rejected the API key".into()));
        }
        if !status.is_success() {
            return Err(ProviderError::Transport(format!(
                "OMDb returned HTTP {}",
                status
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("OMDb body: {}", e)))
    }
}

#[async_trait]
impl MetadataProvider for OmdbClient {
    async fn series(&self, title: &str) -> ProviderResult<SeriesInfo> {
        let body: SeriesResponse = self.get(&[("t", title.to_string())]).await?;

        if body.response == "False" {
            return Err(ProviderError::NotFound(format!(
                "series '{}' ({})",
                title,
                body.error.unwrap_or_else(|| "no match".into())
            )));
        }

        // OMDb reports "N/A" for movies and some miniseries
        let total_seasons = body
            .total_seasons
            .as_deref()
            .and_then(|s| s.trim().parse::<u32>().ok());

        tracing::debug!(
            title,
            official_title = %body.title,
            year = %body.year,
            ?total_seasons,
            "OMDb series lookup"
        );

        Ok(SeriesInfo {
            official_title: body.title,
            year: body.year,
            total_seasons,
        })
    }

    async fn season_episode_count(&self, title: &str, season: u32) -> ProviderResult<u32> {
        let body: SeasonResponse = self
            .get(&[("t", title.to_string()), ("Season", season.to_string())])
            .await?;

        if body.response == "False" {
            return Err(ProviderError::NotFound(format!(
                "season {} of '{}' ({})",
                season,
                title,
                body.error.unwrap_or_else(|| "no match".into())
            )));
        }

        Ok(body.episodes.len() as u32)
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}
