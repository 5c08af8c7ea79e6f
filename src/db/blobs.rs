//! Keyed snapshot storage backing the durable queue and mapping stores.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::store::DurableStore;
use crate::{Error, Result};

use super::Database;

impl Database {
    /// Keys currently holding a snapshot, in lexical order
    pub async fn blob_keys(&self) -> Result<Vec<String>> {
        sqlx::query_scalar("SELECT key FROM durable_blobs ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to list snapshot keys: {}",
                    e
                )))
            })
    }
}

#[async_trait]
impl DurableStore for Database {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        sqlx::query_scalar("SELECT value FROM durable_blobs WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to load snapshot '{}': {}",
                    key, e
                )))
            })
    }

    async fn save(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO durable_blobs (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(bytes)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to save snapshot '{}': {}",
                key, e
            )))
        })?;

        Ok(())
    }

    async fn mark_clean_start(&self) -> Result<bool> {
        let was_unclean = self.was_unclean_shutdown().await?;
        self.set_clean_start().await?;
        Ok(was_unclean)
    }

    async fn mark_clean_shutdown(&self) -> Result<()> {
        self.set_clean_shutdown().await
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
