//! Cloud service port (driven/secondary port)
//!
//! This module defines the single capability interface every storage
//! provider adapter implements. The account registry and file browser only
//! ever talk to providers through [`ICloudService`], so they never
//! special-case a provider.
//!
//! ## Design Notes
//!
//! - Unlike the persistence ports, this port returns the typed
//!   [`CloudError`] taxonomy: callers need to tell a missing session from a
//!   name collision or a quota problem.
//! - Every operation except `authenticate` must fail with
//!   `CloudError::NotAuthenticated` when no session exists, before doing any
//!   other validation or side-effecting work.
//! - Uses `#[async_trait]` for async trait methods.

use std::future::Future;
use std::time::Duration;

use url::Url;

use crate::domain::{CloudAccount, CloudError, CloudFile, CloudPath, ServiceType};

/// Result of a provider search
///
/// Providers may cap the number of results they return; when they do,
/// `truncated` is set so the caller never mistakes a partial result set for
/// a complete one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    /// Matching entries
    pub items: Vec<CloudFile>,
    /// True if the provider returned only a subset of the matches
    pub truncated: bool,
}

impl SearchResults {
    /// A complete result set
    pub fn complete(items: Vec<CloudFile>) -> Self {
        Self {
            items,
            truncated: false,
        }
    }

    /// A result set the provider cut short
    pub fn truncated(items: Vec<CloudFile>) -> Self {
        Self {
            items,
            truncated: true,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Port trait for cloud storage provider operations
///
/// One instance serves one provider and holds at most one authenticated
/// session. All methods may suspend on network I/O.
///
/// ## Implementation Notes
///
/// - `list_files` is non-recursive and imposes no ordering; callers sort.
/// - `rename_file` and `move_file` keep the entry id; `copy_file` and
///   `upload_file` produce new ids.
/// - Name collisions must surface the provider's conflict response as
///   `CloudError::OperationFailed`, never silently overwrite.
/// - `sign_out` always clears local session state, even when revoking the
///   remote session fails (reported as `CloudError::NetworkError`).
#[async_trait::async_trait]
pub trait ICloudService: Send + Sync {
    /// The provider this adapter talks to
    fn service_type(&self) -> ServiceType;

    /// Returns true while a session is established
    fn is_authenticated(&self) -> bool;

    /// Runs the provider's authentication flow and returns a fresh account
    /// snapshot including quota
    async fn authenticate(&self) -> Result<CloudAccount, CloudError>;

    /// Invalidates the local session
    async fn sign_out(&self) -> Result<(), CloudError>;

    /// Refreshes identity and quota information
    async fn get_account_info(&self) -> Result<CloudAccount, CloudError>;

    /// Lists the direct children of `path` (root is [`CloudPath::root`])
    async fn list_files(&self, path: &CloudPath) -> Result<Vec<CloudFile>, CloudError>;

    /// Downloads the full content of a file
    async fn download_file(&self, file: &CloudFile) -> Result<Vec<u8>, CloudError>;

    /// Returns a direct-access URL for previewing a file
    ///
    /// The URL may be ephemeral and is not guaranteed stable across calls.
    async fn get_preview_url(&self, file: &CloudFile) -> Result<Url, CloudError>;

    /// Creates a folder named `name` inside `parent`
    async fn create_folder(&self, name: &str, parent: &CloudPath)
        -> Result<CloudFile, CloudError>;

    /// Deletes a file, or a folder together with its contents
    async fn delete_file(&self, file: &CloudFile) -> Result<(), CloudError>;

    /// Renames an entry in place; the result keeps the same id
    async fn rename_file(&self, file: &CloudFile, new_name: &str)
        -> Result<CloudFile, CloudError>;

    /// Moves an entry (and any descendants) under `destination`
    async fn move_file(
        &self,
        file: &CloudFile,
        destination: &CloudPath,
    ) -> Result<CloudFile, CloudError>;

    /// Duplicates an entry under `destination`; the copy gets a new id
    async fn copy_file(
        &self,
        file: &CloudFile,
        destination: &CloudPath,
    ) -> Result<CloudFile, CloudError>;

    /// Uploads `data` as a new file named `name` inside `parent`
    async fn upload_file(
        &self,
        data: &[u8],
        name: &str,
        parent: &CloudPath,
    ) -> Result<CloudFile, CloudError>;

    /// Case-insensitive substring search over entry names
    ///
    /// The search scope is provider policy; the mock adapter searches the
    /// whole account.
    async fn search_files(&self, query: &str) -> Result<SearchResults, CloudError>;
}

/// Runs an adapter call with a deadline
///
/// A call that does not finish within `limit` fails with
/// `CloudError::NetworkError` wrapping [`crate::domain::OperationTimedOut`].
pub async fn with_timeout<T, F>(
    operation: &'static str,
    limit: Duration,
    fut: F,
) -> Result<T, CloudError>
where
    F: Future<Output = Result<T, CloudError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, timeout = ?limit, "Adapter call timed out");
            Err(CloudError::timed_out(operation, limit))
        }
    }
}
