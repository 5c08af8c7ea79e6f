//! Show mapping store: user title to canonical identity.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::store::{DurableStore, MAPPINGS_KEY};
use crate::types::{Durability, Persisted, ShowMapping};

/// Characters replaced with `_` in directory names
const FORBIDDEN_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Maximum length of a directory name, in characters
const MAX_DIR_NAME_CHARS: usize = 100;

/// Derive a filesystem-safe directory name from a title
///
/// Forbidden characters become `_`, whitespace runs collapse to one space,
/// the result is trimmed and cut to 100 characters.
///
/// ```
/// use sailor::orchestrator::sanitize_dir_name;
///
/// assert_eq!(sanitize_dir_name("Show: The/Rise?"), "Show_ The_Rise_");
/// ```
pub fn sanitize_dir_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if FORBIDDEN_CHARS.contains(&c) { '_' } else { c })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");

    collapsed.chars().take(MAX_DIR_NAME_CHARS).collect()
}

#[derive(Serialize)]
struct MappingsSnapshot<'a> {
    mappings: &'a [ShowMapping],
}

#[derive(Deserialize)]
struct MappingsFile {
    #[serde(default)]
    mappings: Vec<ShowMapping>,
}

/// Durable, deduplicated set of [`ShowMapping`]s
///
/// Mappings are unique by `(official_title, year)`, created once and never
/// changed. Every new mapping is followed by a full snapshot write under the
/// same lock.
#[derive(Clone)]
pub struct ShowMappingStore {
    mappings: Arc<Mutex<Vec<ShowMapping>>>,
    store: Arc<dyn DurableStore>,
    last_persist_ok: Arc<AtomicBool>,
}

impl ShowMappingStore {
    /// Rehydrate from the durable store
    ///
    /// A missing blob starts empty. An unreadable or corrupt blob is logged and
    /// also starts empty.
    pub async fn load(store: Arc<dyn DurableStore>) -> Self {
        let mappings = match store.load(MAPPINGS_KEY).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<MappingsFile>(&bytes) {
                Ok(file) => file.mappings,
                Err(e) => {
                    tracing::warn!(error = %e, "Show mapping snapshot is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read show mappings, starting empty");
                Vec::new()
            }
        };

        tracing::info!(count = mappings.len(), "Loaded show mappings");

        Self {
            mappings: Arc::new(Mutex::new(mappings)),
            store,
            last_persist_ok: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Find or create the mapping for an official identity
    ///
    /// An existing `(official_title, year)` match is returned untouched, whatever
    /// `user_title` says; its durability reflects the store's most recent write.
    /// A new mapping is appended and the whole set persisted before returning.
    pub async fn resolve(
        &self,
        user_title: &str,
        official_title: &str,
        year: &str,
    ) -> Persisted<ShowMapping> {
        let mut mappings = self.mappings.lock().await;

        if let Some(existing) = mappings
            .iter()
            .find(|m| m.official_title == official_title && m.year == year)
        {
            let durability = if self.last_persist_ok.load(Ordering::SeqCst) {
                Durability::Committed
            } else {
                Durability::InMemoryOnly
            };
            return Persisted::new(existing.clone(), durability);
        }

        let mapping = ShowMapping {
            user_title: user_title.to_string(),
            official_title: official_title.to_string(),
            safe_dir_name: sanitize_dir_name(official_title),
            year: year.to_string(),
        };
        mappings.push(mapping.clone());

        tracing::info!(
            user_title,
            official_title,
            safe_dir_name = %mapping.safe_dir_name,
            "Created show mapping"
        );

        let durability = self.persist(&mappings).await;
        Persisted::new(mapping, durability)
    }

    /// First mapping with this official title, in insertion order
    pub async fn find_by_official_title(&self, official_title: &str) -> Option<ShowMapping> {
        self.mappings
            .lock()
            .await
            .iter()
            .find(|m| m.official_title == official_title)
            .cloned()
    }

    /// Copy of every mapping, in insertion order
    pub async fn snapshot(&self) -> Vec<ShowMapping> {
        self.mappings.lock().await.clone()
    }

    /// Number of known mappings
    pub async fn len(&self) -> usize {
        self.mappings.lock().await.len()
    }

    /// Whether no mapping exists yet
    pub async fn is_empty(&self) -> bool {
        self.mappings.lock().await.is_empty()
    }

    // Caller holds the mappings lock
    async fn persist(&self, mappings: &[ShowMapping]) -> Durability {
        let result = match serde_json::to_vec_pretty(&MappingsSnapshot { mappings }) {
            Ok(bytes) => self.store.save(MAPPINGS_KEY, &bytes).await,
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(()) => {
                self.last_persist_ok.store(true, Ordering::SeqCst);
                Durability::Committed
            }
            Err(e) => {
                tracing::warn!(
                    store = self.store.name(),
                    error = %e,
                    "Failed to persist show mappings, keeping them in memory"
                );
                self.last_persist_ok.store(false, Ordering::SeqCst);
                Durability::InMemoryOnly
            }
        }
    }
}

impl std::fmt::Debug for ShowMappingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShowMappingStore")
            .field("store", &self.store.name())
            .finish_non_exhaustive()
    }
}
