//! Settings store port (driven/secondary port)
//!
//! A minimal key/value interface over whatever settings storage the host
//! platform provides. The account registry keeps its whole account set
//! under a single key and rewrites it as one blob on every mutation.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   (SQLite, files, platform preferences) and callers only log them.
//! - Each call is atomic on its own; callers that read-modify-write must
//!   serialize themselves.

/// Port trait for key/value settings persistence
#[async_trait::async_trait]
pub trait ISettingsStore: Send + Sync {
    /// Reads the blob stored under `key`, `None` if absent
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;

    /// Replaces the blob stored under `key`
    async fn set(&self, key: &str, value: &[u8]) -> anyhow::Result<()>;

    /// Removes `key`; removing a missing key is not an error
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}
