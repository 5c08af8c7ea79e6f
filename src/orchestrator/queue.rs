//! Durable FIFO of episodes waiting to be dispatched.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::store::{DurableStore, QUEUE_KEY};
use crate::types::{ClearOutcome, Durability, EpisodeWorkItem, Persisted};

#[derive(Serialize)]
struct QueueSnapshot<'a> {
    items: &'a VecDeque<EpisodeWorkItem>,
}

#[derive(Deserialize)]
struct QueueFile {
    #[serde(default)]
    items: Vec<EpisodeWorkItem>,
}

/// Durable FIFO of [`EpisodeWorkItem`]s
///
/// Holds exactly the items accepted but not yet dispatched. Each mutation
/// keeps the lock until the full snapshot has been written, so concurrent
/// callers never observe a half-applied change. A failed write is logged and
/// reported as [`Durability::InMemoryOnly`]; the in-memory queue stays
/// authoritative for the rest of the run.
#[derive(Clone)]
pub struct DownloadQueue {
    items: Arc<Mutex<VecDeque<EpisodeWorkItem>>>,
    store: Arc<dyn DurableStore>,
}

impl DownloadQueue {
    /// Rehydrate from the durable store
    pub async fn load(store: Arc<dyn DurableStore>) -> Self {
        let items: VecDeque<EpisodeWorkItem> = match store.load(QUEUE_KEY).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<QueueFile>(&bytes) {
                Ok(file) => file.items.into(),
                Err(e) => {
                    tracing::warn!(error = %e, "Queue snapshot is corrupt, starting empty");
                    VecDeque::new()
                }
            },
            Ok(None) => VecDeque::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read queue snapshot, starting empty");
                VecDeque::new()
            }
        };

        tracing::info!(count = items.len(), "Loaded download queue");

        Self {
            items: Arc::new(Mutex::new(items)),
            store,
        }
    }

    /// Append one item
    pub async fn push(&self, item: EpisodeWorkItem) -> Durability {
        let mut items = self.items.lock().await;
        tracing::debug!(
            season = item.season,
            episode = item.episode,
            title = %item.official_title,
            "Enqueued episode"
        );
        items.push_back(item);
        self.persist(&items).await
    }

    /// Append items in order with a single snapshot write
    ///
    /// An empty batch changes nothing and writes nothing.
    pub async fn extend(&self, batch: Vec<EpisodeWorkItem>) -> Durability {
        if batch.is_empty() {
            return Durability::Committed;
        }

        let mut items = self.items.lock().await;
        let added = batch.len();
        items.extend(batch);
        tracing::debug!(added, queued = items.len(), "Enqueued episodes");
        self.persist(&items).await
    }

    /// Remove and return the oldest item
    ///
    /// Returns `None` on an empty queue without touching the store.
    pub async fn pop(&self) -> Option<Persisted<EpisodeWorkItem>> {
        let mut items = self.items.lock().await;
        let item = items.pop_front()?;
        let durability = self.persist(&items).await;
        Some(Persisted::new(item, durability))
    }

    /// Drop every queued item
    pub async fn clear(&self) -> ClearOutcome {
        let mut items = self.items.lock().await;
        let removed = items.len();
        items.clear();
        let durability = self.persist(&items).await;
        ClearOutcome {
            removed,
            durability,
        }
    }

    /// Whether nothing is queued
    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }

    /// Number of queued items
    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    /// The item the next `pop` would return
    pub async fn peek(&self) -> Option<EpisodeWorkItem> {
        self.items.lock().await.front().cloned()
    }

    /// Depth and next item, read under one lock so they always agree
    pub async fn head(&self) -> (usize, Option<EpisodeWorkItem>) {
        let items = self.items.lock().await;
        (items.len(), items.front().cloned())
    }

    /// Copy of the queue in dispatch order
    pub async fn snapshot(&self) -> Vec<EpisodeWorkItem> {
        self.items.lock().await.iter().cloned().collect()
    }

    // Caller holds the items lock
    async fn persist(&self, items: &VecDeque<EpisodeWorkItem>) -> Durability {
        let result = match serde_json::to_vec_pretty(&QueueSnapshot { items }) {
            Ok(bytes) => self.store.save(QUEUE_KEY, &bytes).await,
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(()) => Durability::Committed,
            Err(e) => {
                tracing::warn!(
                    store = self.store.name(),
                    queued = items.len(),
                    error = %e,
                    "Failed to persist download queue, keeping it in memory"
                );
                Durability::InMemoryOnly
            }
        }
    }
}

impl std::fmt::Debug for DownloadQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadQueue")
            .field("store", &self.store.name())
            .finish_non_exhaustive()
    }
}
