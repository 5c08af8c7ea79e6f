//! Configuration types for sailor

use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Main configuration for [`RangeOrchestrator`](crate::RangeOrchestrator)
///
/// Fields are organized into logical sub-configs:
/// - [`library`](LibraryConfig) - where finished media lands
/// - [`providers`](ProvidersConfig) - metadata, search and backend endpoints
/// - [`persistence`](PersistenceConfig) - queue and mapping storage
/// - [`server`](ServerIntegrationConfig) - REST API settings
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Media library roots
    #[serde(default)]
    pub library: LibraryConfig,

    /// External collaborator endpoints and credentials
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Durable state storage
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// API and external server integration
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Apply credentials from the process environment
    ///
    /// Recognized variables: `OPEN_MOVIE_API_KEY`, `JACKETT_API_KEY`,
    /// `QBITTORRENT_USER`, `QBITTORRENT_PASSWORD` and `SAILOR_API_KEY`.
    /// Empty values are ignored so a blank `.env` entry does not wipe a
    /// configured value.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    pub(crate) fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OPEN_MOVIE_API_KEY") {
            self.providers.omdb.api_key = key;
        }
        if let Some(key) = get("JACKETT_API_KEY") {
            self.providers.jackett.api_key = key;
        }
        if let Some(user) = get("QBITTORRENT_USER") {
            self.providers.qbittorrent.username = user;
        }
        if let Some(password) = get("QBITTORRENT_PASSWORD") {
            self.providers.qbittorrent.password = password;
        }
        if let Some(key) = get("SAILOR_API_KEY") {
            self.server.api.api_key = Some(key);
        }
        self
    }

    /// Root directory for show downloads
    pub fn shows_root(&self) -> &PathBuf {
        &self.library.shows_root
    }

    /// Directory for movie downloads
    pub fn movies_root(&self) -> &PathBuf {
        &self.library.movies_root
    }
}

/// Media library layout
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LibraryConfig {
    /// Shows are saved to `<shows_root>/<safe dir name>` (default: "/media/jellyfin/SHOWS")
    #[serde(default = "default_shows_root")]
    pub shows_root: PathBuf,

    /// Movies are saved directly into this directory (default: "/media/jellyfin/MOVIES")
    #[serde(default = "default_movies_root")]
    pub movies_root: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            shows_root: default_shows_root(),
            movies_root: default_movies_root(),
        }
    }
}

/// Endpoints for the default provider adapters
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ProvidersConfig {
    /// OMDb metadata lookup
    #[serde(default)]
    pub omdb: OmdbConfig,

    /// Jackett torrent search
    #[serde(default)]
    pub jackett: JackettConfig,

    /// qBittorrent WebUI backend
    #[serde(default)]
    pub qbittorrent: QbittorrentConfig,

    /// HTTP timeout applied to every provider request (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub request_timeout: Duration,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            omdb: OmdbConfig::default(),
            jackett: JackettConfig::default(),
            qbittorrent: QbittorrentConfig::default(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// OMDb API settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct OmdbConfig {
    /// Base URL (default: "http://www.omdbapi.com/")
    #[serde(default = "default_omdb_url")]
    pub base_url: String,

    /// API key
    #[serde(default)]
    pub api_key: String,
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_omdb_url(),
            api_key: String::new(),
        }
    }
}

/// Jackett API settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct JackettConfig {
    /// Base URL including the API prefix (default: "http://localhost:9117/api/v2.0")
    #[serde(default = "default_jackett_url")]
    pub base_url: String,

    /// API key
    #[serde(default)]
    pub api_key: String,

    /// Trackers passed as `Tracker[]` filters (default: ["thepiratebay"])
    #[serde(default = "default_trackers")]
    pub trackers: Vec<String>,
}

impl Default for JackettConfig {
    fn default() -> Self {
        Self {
            base_url: default_jackett_url(),
            api_key: String::new(),
            trackers: default_trackers(),
        }
    }
}

/// qBittorrent WebUI settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct QbittorrentConfig {
    /// Base URL including the API prefix (default: "http://localhost:8080/api/v2")
    #[serde(default = "default_qbittorrent_url")]
    pub base_url: String,

    /// WebUI username
    #[serde(default)]
    pub username: String,

    /// WebUI password
    #[serde(default)]
    pub password: String,
}

impl Default for QbittorrentConfig {
    fn default() -> Self {
        Self {
            base_url: default_qbittorrent_url(),
            username: String::new(),
            password: String::new(),
        }
    }
}

/// Storage backend for the durable queue and mapping snapshots
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// SQLite database at `database_path`
    #[default]
    Sqlite,
    /// One `<key>.json` file per snapshot under `state_dir`
    JsonFiles,
    /// Process memory only (nothing survives restart)
    Memory,
}

/// Data storage and state management
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PersistenceConfig {
    /// Which storage backend to use (default: sqlite)
    #[serde(default)]
    pub backend: StorageBackend,

    /// Database path (default: "./sailor.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Directory for JSON snapshot files (default: "/var/lib/sailor")
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_path: default_database_path(),
            state_dir: default_state_dir(),
        }
    }
}

/// API and external server integration configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:8000)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Optional API key for authentication
    #[serde(default)]
    pub api_key: Option<String>,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_key: None,
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_shows_root() -> PathBuf {
    PathBuf::from("/media/jellyfin/SHOWS")
}

fn default_movies_root() -> PathBuf {
    PathBuf::from("/media/jellyfin/MOVIES")
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_omdb_url() -> String {
    "http://www.omdbapi.com/".into()
}

fn default_jackett_url() -> String {
    "http://localhost:9117/api/v2.0".into()
}

fn default_trackers() -> Vec<String> {
    vec!["thepiratebay".into()]
}

fn default_qbittorrent_url() -> String {
    "http://localhost:8080/api/v2".into()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./sailor.db")
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("/var/lib/sailor")
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_json_yields_defaults() {
        let config: Config = serde_json::from_str("{}").expect("deserialize failed");

        assert_eq!(config.shows_root(), &PathBuf::from("/media/jellyfin/SHOWS"));
        assert_eq!(config.movies_root(), &PathBuf::from("/media/jellyfin/MOVIES"));
        assert_eq!(config.providers.request_timeout, Duration::from_secs(30));
        assert_eq!(config.providers.jackett.trackers, vec!["thepiratebay"]);
        assert_eq!(config.persistence.backend, StorageBackend::Sqlite);
        assert_eq!(
            config.persistence.state_dir,
            PathBuf::from("/var/lib/sailor")
        );
        assert!(config.server.api.api_key.is_none());
        assert!(config.server.api.cors_enabled);
    }

    #[test]
    fn partial_sub_config_keeps_other_defaults() {
        let json = r#"{
            "library": { "shows_root": "/srv/tv" },
            "persistence": { "backend": "json_files", "state_dir": "/tmp/state" }
        }"#;
        let config: Config = serde_json::from_str(json).expect("deserialize failed");

        assert_eq!(config.shows_root(), &PathBuf::from("/srv/tv"));
        assert_eq!(config.movies_root(), &PathBuf::from("/media/jellyfin/MOVIES"));
        assert_eq!(config.persistence.backend, StorageBackend::JsonFiles);
        assert_eq!(config.persistence.database_path, PathBuf::from("./sailor.db"));
    }

    #[test]
    fn request_timeout_serializes_as_seconds() {
        let mut config = Config::default();
        config.providers.request_timeout = Duration::from_secs(12);

        let json = serde_json::to_value(&config).expect("serialize failed");
        assert_eq!(json["providers"]["request_timeout"], 12);

        let restored: Config = serde_json::from_value(json).expect("deserialize failed");
        assert_eq!(restored.providers.request_timeout, Duration::from_secs(12));
    }

    #[test]
    fn env_overrides_fill_credentials() {
        let vars: HashMap<&str, &str> = [
            ("OPEN_MOVIE_API_KEY", "omdb-key"),
            ("JACKETT_API_KEY", "jackett-key"),
            ("QBITTORRENT_USER", "admin"),
            ("QBITTORRENT_PASSWORD", "hunter2"),
            ("SAILOR_API_KEY", "secret"),
        ]
        .into_iter()
        .collect();

        let config =
            Config::default().with_overrides_from(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.providers.omdb.api_key, "omdb-key");
        assert_eq!(config.providers.jackett.api_key, "jackett-key");
        assert_eq!(config.providers.qbittorrent.username, "admin");
        assert_eq!(config.providers.qbittorrent.password, "hunter2");
        assert_eq!(config.server.api.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn blank_env_values_do_not_clobber_configured_values() {
        let mut config = Config::default();
        config.providers.omdb.api_key = "from-file".into();
        config.server.api.api_key = Some("file-secret".into());

        let config = config.with_overrides_from(|_| Some("   ".to_string()));

        assert_eq!(config.providers.omdb.api_key, "from-file");
        assert_eq!(config.server.api.api_key.as_deref(), Some("file-secret"));
    }
}
