//! Episode range orchestrator split into focused submodules.
//!
//! The `RangeOrchestrator` struct and its methods are organized by domain:
//! - [`mappings`] - Show mapping store and directory name sanitization
//! - [`episodes`] - Season/episode range expansion
//! - [`selection`] - Candidate scoring
//! - [`queue`] - Durable FIFO of pending episodes
//! - [`driver`] - Submission, completion signals and dispatch
//! - [`lifecycle`] - Shutdown coordination

mod driver;
mod episodes;
mod lifecycle;
mod mappings;
mod queue;
mod selection;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub use episodes::{GeneratedRange, generate_episodes};
pub use mappings::{ShowMappingStore, sanitize_dir_name};
pub use queue::DownloadQueue;
pub use selection::{CandidateScore, score_candidates, select_best_candidate};

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::{Mutex, broadcast};

use crate::config::Config;
use crate::error::Result;
use crate::providers::Providers;
use crate::store::{self, DurableStore};
use crate::types::{DriverState, Event, OrchestratorStatus};

/// Sequential episode-range download orchestrator (cloneable - all fields are Arc-wrapped)
///
/// Owns the durable queue and show mappings and drives one download backend
/// through a campaign, one episode at a time.
#[derive(Clone)]
pub struct RangeOrchestrator {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Backing store for both snapshots
    pub(crate) store: Arc<dyn DurableStore>,
    /// Metadata, search and backend collaborators
    pub(crate) providers: Providers,
    /// Episodes accepted but not yet dispatched
    pub(crate) queue: DownloadQueue,
    /// Canonical identities of every show seen so far
    pub(crate) mappings: ShowMappingStore,
    /// Control-loop state; always locked before the queue
    pub(crate) driver: Arc<Mutex<DriverState>>,
    /// Dispatch tasks still talking to the search provider or backend
    pub(crate) in_flight: Arc<AtomicUsize>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
}

impl RangeOrchestrator {
    /// Create an orchestrator backed by the configured durable store
    ///
    /// Opens the store selected by `config.persistence`, then behaves like
    /// [`with_store`](Self::with_store).
    pub async fn new(config: Config, providers: Providers) -> Result<Self> {
        let store = store::open_store(&config.persistence).await?;
        Self::with_store(config, store, providers).await
    }

    /// Create an orchestrator on an already opened store
    ///
    /// Rehydrates the queue and the show mappings and records a session
    /// start. A non-empty rehydrated queue means a campaign was interrupted,
    /// so the driver starts in `AwaitingCompletion` and the next completion
    /// signal resumes it.
    pub async fn with_store(
        config: Config,
        store: Arc<dyn DurableStore>,
        providers: Providers,
    ) -> Result<Self> {
        match store.mark_clean_start().await {
            Ok(true) => tracing::warn!(
                store = store.name(),
                "Previous session did not shut down cleanly, resuming from last snapshot"
            ),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to record session start"),
        }

        let queue = DownloadQueue::load(store.clone()).await;
        let mappings = ShowMappingStore::load(store.clone()).await;

        let initial_state = if queue.is_empty().await {
            DriverState::Idle
        } else {
            DriverState::AwaitingCompletion
        };

        // Create broadcast channel with buffer size of 1000 events
        let (event_tx, _rx) = broadcast::channel(1000);

        tracing::info!(
            store = store.name(),
            providers = ?providers,
            state = ?initial_state,
            "Orchestrator initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            store,
            providers,
            queue,
            mappings,
            driver: Arc::new(Mutex::new(initial_state)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            event_tx,
        })
    }

    /// Subscribe to orchestrator events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    /// A subscriber that falls more than 1000 events behind receives `RecvError::Lagged`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sailor::{Config, Providers, RangeOrchestrator};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let config = Config::default().with_env_overrides();
    ///     let providers = Providers::from_config(&config.providers)?;
    ///     let orchestrator = RangeOrchestrator::new(config, providers).await?;
    ///
    ///     let mut events = orchestrator.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             tracing::info!(?event, "orchestrator event");
    ///         }
    ///     });
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Current control-loop state
    pub async fn state(&self) -> DriverState {
        *self.driver.lock().await
    }

    /// Snapshot of state, queue depth and the next queued item
    pub async fn status(&self) -> OrchestratorStatus {
        // Driver before queue, matching every mutating path
        let state = self.driver.lock().await;
        let (queued, next) = self.queue.head().await;
        OrchestratorStatus {
            state: *state,
            queued,
            mappings: self.mappings.len().await,
            next,
        }
    }

    /// Copy of the pending episodes in dispatch order
    pub async fn queue_snapshot(&self) -> Vec<crate::types::EpisodeWorkItem> {
        self.queue.snapshot().await
    }

    /// Copy of every show mapping in insertion order
    pub async fn mappings_snapshot(&self) -> Vec<crate::types::ShowMapping> {
        self.mappings.snapshot().await
    }

    /// Name of the durable store in use
    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }
}
