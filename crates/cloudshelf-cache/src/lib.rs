//! Cloudshelf Cache - SQLite settings store
//!
//! Implements the `ISettingsStore` port with one `settings` table of
//! key/blob rows. The account registry keeps its whole account set under a
//! single key, so every write is one upsert statement.
//!
//! ```no_run
//! use std::path::Path;
//! use cloudshelf_cache::SqliteSettingsStore;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = SqliteSettingsStore::open(Path::new("/tmp/cloudshelf/settings.db")).await?;
//! println!("{:?}", store.keys().await?);
//! # Ok(())
//! # }
//! ```

pub mod pool;
pub mod settings_store;

pub use pool::DatabasePool;
pub use settings_store::SqliteSettingsStore;

/// Failures opening or querying the settings database
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The database file or connection could not be opened
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// The settings schema could not be applied
    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

impl From<sqlx::Error> for CacheError {
    fn from(e: sqlx::Error) -> Self {
        CacheError::QueryFailed(e.to_string())
    }
}
