//! qBittorrent WebUI backend adapter

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::traits::DownloadBackend;
use super::transport_error;
use crate::config::QbittorrentConfig;
use crate::error::ProviderError;
use crate::{Error, Result};

/// [`DownloadBackend`] that adds torrents through the qBittorrent WebUI API
///
/// The session cookie is obtained lazily on first use and refreshed once when
/// the WebUI answers 403 (expired session).
#[derive(Clone, Debug)]
pub struct QbittorrentClient {
    http: reqwest::Client,
    config: QbittorrentConfig,
    sid: Arc<Mutex<Option<String>>>,
}

enum AddOutcome {
    Accepted,
    SessionExpired,
}

impl QbittorrentClient {
    /// Create a client from a shared HTTP client and WebUI settings
    pub fn new(http: reqwest::Client, config: QbittorrentConfig) -> Self {
        Self {
            http,
            config,
            sid: Arc::new(Mutex::new(None)),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    /// Log in and return the `SID` session cookie value
    async fn login(&self) -> Result<String> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .header(reqwest::header::REFERER, &self.config.base_url)
            .form(&[
                ("username", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| transport_error("qBittorrent login failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Unauthorized(format!(
                "qBittorrent login returned HTTP {}",
                status
            ))
            .into());
        }

        let sid = response
            .headers()
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(parse_sid);

        let body = response.text().await.unwrap_or_default();

        match sid {
            Some(sid) => {
                tracing::debug!("qBittorrent session established");
                Ok(sid)
            }
            None => Err(ProviderError::Unauthorized(format!(
                "qBittorrent login refused: {}",
                body.trim()
            ))
            .into()),
        }
    }

    async fn session(&self) -> Result<String> {
        let mut sid = self.sid.lock().await;
        if let Some(existing) = sid.as_ref() {
            return Ok(existing.clone());
        }
        let fresh = self.login().await?;
        *sid = Some(fresh.clone());
        Ok(fresh)
    }

    async fn add(&self, sid: &str, locator: &str, save_path: Option<&Path>) -> Result<AddOutcome> {
        let mut form = vec![("urls", locator.to_string())];
        if let Some(path) = save_path {
            form.push(("savepath", path.display().to_string()));
        }

        let response = self
            .http
            .post(self.url("/torrents/add"))
            .header(reqwest::header::REFERER, &self.config.base_url)
            .header(reqwest::header::COOKIE, format!("SID={}", sid))
            .form(&form)
            .send()
            .await
            .map_err(|e| transport_error("qBittorrent add failed", e))?;

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN {
            return Ok(AddOutcome::SessionExpired);
        }

        let body = response.text().await.unwrap_or_default();
        let body = body.trim();

        if status.is_success() && (body == "Ok." || body == "OK") {
            Ok(AddOutcome::Accepted)
        } else {
            Err(Error::BackendRejected(format!(
                "HTTP {}: {}",
                status,
                if body.is_empty() { "<empty body>" } else { body }
            )))
        }
    }
}

/// Extract the value of `SID=` from a `Set-Cookie` header
fn parse_sid(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("SID="))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl DownloadBackend for QbittorrentClient {
    async fn start(&self, locator: &str, save_path: Option<&Path>) -> Result<()> {
        let sid = self.session().await?;

        match self.add(&sid, locator, save_path).await? {
            AddOutcome::Accepted => {}
            AddOutcome::SessionExpired => {
                tracing::info!("qBittorrent session expired, logging in again");
                let fresh = self.login().await?;
                *self.sid.lock().await = Some(fresh.clone());

                match self.add(&fresh, locator, save_path).await? {
                    AddOutcome::Accepted => {}
                    AddOutcome::SessionExpired => {
                        return Err(ProviderError::Unauthorized(
                            "qBittorrent refused a fresh session".into(),
                        )
                        .into());
                    }
                }
            }
        }

        tracing::info!(
            save_path = ?save_path,
            "qBittorrent accepted transfer"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "qbittorrent"
    }
}
