//! SqliteSettingsStore - ISettingsStore implementation
//!
//! One row per key in the `settings` table. Every write replaces the whole
//! row in a single statement, so readers never observe a partial blob.

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::trace;

use cloudshelf_core::ports::ISettingsStore;

use crate::{CacheError, DatabasePool};

/// SQLite-backed key/value settings store
#[derive(Clone)]
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens the database at `path` and returns a store over it
    ///
    /// # Errors
    ///
    /// See [`DatabasePool::new`].
    pub async fn open(path: &Path) -> Result<Self, CacheError> {
        let pool = DatabasePool::new(path).await?;
        Ok(Self::new(pool.pool().clone()))
    }

    /// All stored keys, sorted
    pub async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let keys = sqlx::query_scalar("SELECT key FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }

    /// RFC 3339 timestamp of the last write to `key`
    pub async fn updated_at(&self, key: &str) -> Result<Option<String>, CacheError> {
        let updated = sqlx::query_scalar("SELECT updated_at FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }
}

#[async_trait::async_trait]
impl ISettingsStore for SqliteSettingsStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let value: Option<Vec<u8>> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read setting '{key}'"))?;

        trace!(key, found = value.is_some(), "Setting read");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        sqlx::query("INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?, ?, ?)")
            .bind(key)
            .bind(value)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to write setting '{key}'"))?;

        trace!(key, bytes = value.len(), "Setting written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to remove setting '{key}'"))?;

        trace!(key, "Setting removed");
        Ok(())
    }
}
