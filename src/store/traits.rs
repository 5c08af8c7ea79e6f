//! Trait for keyed durable storage

use async_trait::async_trait;

/// Keyed blob storage used for the queue and mapping snapshots
///
/// Every `save` replaces the whole blob for the key. Implementations must make
/// the replacement atomic: after a crash a reader sees either the previous blob
/// or the new one, never a mix.
///
/// # Examples
///
/// ```no_run
/// use sailor::store::{DurableStore, JsonFileStore};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = JsonFileStore::new("/var/lib/sailor").await?;
/// store.save("download_queue", br#"{"items":[]}"#).await?;
///
/// if let Some(bytes) = store.load("download_queue").await? {
///     println!("{} bytes persisted", bytes.len());
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Read the blob stored under `key`
    ///
    /// Returns `Ok(None)` when nothing was ever written for the key.
    async fn load(&self, key: &str) -> crate::Result<Option<Vec<u8>>>;

    /// Replace the blob stored under `key`
    async fn save(&self, key: &str, bytes: &[u8]) -> crate::Result<()>;

    /// Record that a process started using this store
    ///
    /// Returns `true` when the previous session never reached
    /// [`mark_clean_shutdown`](Self::mark_clean_shutdown). Stores without
    /// session tracking always report a clean history.
    async fn mark_clean_start(&self) -> crate::Result<bool> {
        Ok(false)
    }

    /// Record that the current session is ending cleanly
    async fn mark_clean_shutdown(&self) -> crate::Result<()> {
        Ok(())
    }

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
