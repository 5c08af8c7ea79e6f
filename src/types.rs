//! Core types for sailor

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Kind of media a campaign fetches
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Feature film, saved under the movie root with no per-title directory
    Movie,
    /// Episodic series, saved under `<shows root>/<safe dir name>`
    #[default]
    Show,
}

impl MediaType {
    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Show => "show",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical identity of a show, created on first resolution and never mutated
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShowMapping {
    /// What the user typed when the mapping was first created
    pub user_title: String,
    /// Title as reported by the metadata provider
    pub official_title: String,
    /// Filesystem-safe directory name derived from `official_title`
    pub safe_dir_name: String,
    /// Release year as reported by the metadata provider (may be a span, e.g. "2004–2010")
    pub year: String,
}

/// One episode to fetch, immutable once generated
///
/// Serialized field names match the persisted queue format (`title`, `type`,
/// `referenceTorrentSize`) so existing state files keep loading.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeWorkItem {
    /// Season number (1-based)
    pub season: u32,
    /// Episode number within the season (1-based)
    pub episode: u32,
    /// Title the user searched for; used to build search queries
    #[serde(rename = "title")]
    pub search_title: String,
    /// Canonical title; used to find the show mapping for the save path
    pub official_title: String,
    /// Year from the original request
    pub year: String,
    /// Media kind of the campaign
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Byte size of the torrent the user picked for the campaign
    #[serde(rename = "referenceTorrentSize")]
    pub reference_size: u64,
}

impl EpisodeWorkItem {
    /// Search query sent to the search provider for this item
    ///
    /// Shows are searched as `"<title> S01E02"`, movies as `"<title> <year>"`.
    pub fn search_query(&self) -> String {
        match self.media_type {
            MediaType::Show => format!(
                "{} S{:02}E{:02}",
                self.search_title, self.season, self.episode
            ),
            MediaType::Movie => format!("{} {}", self.search_title, self.year)
                .trim()
                .to_string(),
        }
    }
}

/// One search result for a single episode
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CandidateSource {
    /// Release title as reported by the indexer
    pub title: String,
    /// Total size in bytes
    pub size_bytes: u64,
    /// Number of seeders at search time
    pub seeders: u32,
    /// Magnet URI or torrent URL handed to the backend
    pub locator: String,
}

/// Optional season/episode bounds of a range request
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RangeBounds {
    /// First season (default 1, floored to 1)
    #[serde(default)]
    pub min_season: Option<u32>,
    /// Last season (default: total seasons, capped to total seasons)
    #[serde(default)]
    pub max_season: Option<u32>,
    /// First episode of the first season in range
    #[serde(default)]
    pub min_episode: Option<u32>,
    /// Last episode of the last season in range
    #[serde(default)]
    pub max_episode: Option<u32>,
}

impl RangeBounds {
    /// Whether any bound was given
    pub fn is_bounded(&self) -> bool {
        self.min_season.is_some()
            || self.max_season.is_some()
            || self.min_episode.is_some()
            || self.max_episode.is_some()
    }
}

/// A range-download request as submitted by the boundary layer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RangeRequest {
    /// Title as typed by the user
    pub title: String,
    /// Year as typed by the user (may be empty)
    #[serde(default)]
    pub year: String,
    /// Media kind
    #[serde(default)]
    pub media_type: MediaType,
    /// Season/episode bounds
    #[serde(flatten)]
    pub bounds: RangeBounds,
    /// Byte size of the torrent the user picked
    #[serde(default)]
    pub reference_size: u64,
}

/// Series-level metadata from the metadata provider
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SeriesInfo {
    /// Canonical title
    pub official_title: String,
    /// Release year (may be a span)
    pub year: String,
    /// Number of seasons, when the provider reports a usable value
    pub total_seasons: Option<u32>,
}

/// Outcome of a range submission
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RangeSubmission {
    /// Items dispatched immediately (0 or 1)
    pub started_count: usize,
    /// Items appended to the download queue
    pub queued_count: usize,
}

impl RangeSubmission {
    /// Whether the range resolved to zero episodes
    pub fn is_empty(&self) -> bool {
        self.started_count == 0 && self.queued_count == 0
    }
}

/// Whether a mutation reached durable storage
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Durability {
    /// The full snapshot was written
    Committed,
    /// Applied in memory only; it will be lost on restart unless a later write succeeds
    InMemoryOnly,
}

impl Durability {
    /// Whether the snapshot was written
    pub fn is_committed(&self) -> bool {
        matches!(self, Durability::Committed)
    }
}

/// A value produced by a mutating operation, paired with its durability
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Persisted<T> {
    /// The value the operation produced
    pub value: T,
    /// Whether the mutation behind it was written to the store
    pub durability: Durability,
}

impl<T> Persisted<T> {
    /// Pair a value with its durability
    pub fn new(value: T, durability: Durability) -> Self {
        Self { value, durability }
    }

    /// Whether the mutation behind the value was written
    pub fn is_committed(&self) -> bool {
        self.durability.is_committed()
    }

    /// Drop the durability and keep the value
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Control-loop state of the sequential driver
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DriverState {
    /// No campaign in progress
    #[default]
    Idle,
    /// A dispatch task is searching/starting the current item
    Dispatching,
    /// The backend owns the current transfer; waiting for a completion signal
    AwaitingCompletion,
}

/// One-off transfer outside any campaign
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SingleDownloadRequest {
    /// Magnet URI or torrent URL
    pub locator: String,
    /// Media kind; decides the library root
    #[serde(default)]
    pub media_type: Option<MediaType>,
    /// User-typed title, used to resolve a show directory
    #[serde(default)]
    pub title: Option<String>,
}

/// Result of a one-off transfer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SingleDownload {
    /// Save path handed to the backend; `None` means the backend default
    pub save_path: Option<PathBuf>,
}

/// Result of a completion signal
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CompletionOutcome {
    /// The next queued item was handed to a dispatch task
    Dispatched {
        /// Season of the dispatched item
        season: u32,
        /// Episode of the dispatched item
        episode: u32,
        /// Items still queued after the pop
        remaining: usize,
    },
    /// The queue was empty; the driver is idle
    Idle,
}

/// Result of clearing the queue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClearOutcome {
    /// Number of items dropped
    pub removed: usize,
    /// Whether the empty queue was written
    pub durability: Durability,
}

/// Snapshot of the orchestrator for status reporting
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrchestratorStatus {
    /// Current control-loop state
    pub state: DriverState,
    /// Number of items waiting in the queue
    pub queued: usize,
    /// Number of known show mappings
    pub mappings: usize,
    /// The next item a completion signal would dispatch
    pub next: Option<EpisodeWorkItem>,
}

/// Event emitted by the orchestrator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A range submission produced work
    CampaignStarted {
        /// Canonical title of the campaign
        official_title: String,
        /// Episodes generated for the range
        episodes: usize,
        /// Episodes appended to the queue
        queued: usize,
    },

    /// A completion signal arrived from the backend
    CompletionReceived {
        /// Driver state when the signal arrived
        state: DriverState,
    },

    /// An item was handed to the backend
    EpisodeDispatched {
        /// Season number
        season: u32,
        /// Episode number
        episode: u32,
        /// Canonical title
        official_title: String,
        /// Title of the chosen candidate
        candidate: String,
        /// Seeders of the chosen candidate
        seeders: u32,
        /// Save path given to the backend
        save_path: Option<PathBuf>,
    },

    /// An item could not be dispatched and was dropped
    DispatchFailed {
        /// Season number
        season: u32,
        /// Episode number
        episode: u32,
        /// Canonical title
        official_title: String,
        /// Error message
        error: String,
    },

    /// A completion signal found the queue empty
    QueueDrained,

    /// The queue was cleared by request
    QueueCleared {
        /// Number of items dropped
        removed: usize,
    },

    /// A durable write failed; state is held in memory only
    PersistenceDegraded {
        /// Store key that failed
        key: String,
        /// Error message
        error: String,
    },
}
