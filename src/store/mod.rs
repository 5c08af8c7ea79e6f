//! Durable keyed-blob storage for the queue and the show mappings
//!
//! The orchestrator persists two independent JSON blobs, one per key, through
//! the [`DurableStore`] trait. Implementations:
//! - [`crate::db::Database`] - SQLite (default)
//! - [`JsonFileStore`] - one `<key>.json` file per blob in a state directory
//! - [`MemoryStore`] - in-process, for embedding and tests

mod file;
mod memory;
mod traits;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use traits::DurableStore;

use crate::config::{PersistenceConfig, StorageBackend};
use crate::db::Database;
use crate::Result;
use std::sync::Arc;

/// Store key of the download queue snapshot
pub const QUEUE_KEY: &str = "download_queue";

/// Store key of the show mapping snapshot
pub const MAPPINGS_KEY: &str = "show_mappings";

/// Open the store selected by the persistence configuration
pub async fn open_store(config: &PersistenceConfig) -> Result<Arc<dyn DurableStore>> {
    let store: Arc<dyn DurableStore> = match config.backend {
        StorageBackend::Sqlite => Arc::new(Database::new(&config.database_path).await?),
        StorageBackend::JsonFiles => Arc::new(JsonFileStore::new(&config.state_dir).await?),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };

    tracing::info!(store = store.name(), "Durable store opened");

    Ok(store)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_store_honours_backend_choice() {
        let temp_dir = tempdir().unwrap();

        for (backend, expected) in [
            (StorageBackend::Sqlite, "sqlite"),
            (StorageBackend::JsonFiles, "json-files"),
            (StorageBackend::Memory, "memory"),
        ] {
            let config = PersistenceConfig {
                backend,
                database_path: temp_dir.path().join("sailor.db"),
                state_dir: temp_dir.path().join("state"),
            };

            let store = open_store(&config).await.unwrap();
            assert_eq!(store.name(), expected);

            store.save(QUEUE_KEY, b"{\"items\":[]}").await.unwrap();
            assert_eq!(
                store.load(QUEUE_KEY).await.unwrap().as_deref(),
                Some(&b"{\"items\":[]}"[..])
            );
        }
    }
}
