//! MockCloudService - ICloudService implementation over an in-memory tree
//!
//! Stands in for a real provider during development, demos and tests. Each
//! instance simulates one provider holding one account's namespace.
//!
//! ## Design Notes
//!
//! - Session state lives in an `AtomicBool` so `is_authenticated` stays
//!   synchronous; the namespace, quota usage and scheduled failures sit
//!   behind a `tokio::sync::Mutex`.
//! - Every operation except `authenticate` checks the session before
//!   anything else, then sleeps for the configured latency, then checks the
//!   session again under the state lock, then consumes a scheduled failure
//!   if one is queued. A `sign_out` landing during the sleep therefore
//!   rejects the pending call instead of letting it mutate the namespace.
//! - Search walks the whole namespace in path order and reports truncation
//!   when more than `max_search_results` entries match.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use cloudshelf_core::config::MockConfig;
use cloudshelf_core::domain::{CloudAccount, CloudError, CloudFile, CloudPath, ServiceType};
use cloudshelf_core::ports::{ICloudService, SearchResults};

use crate::failure::{MockFailure, MockOperation};
use crate::seed::{self, SEEDED_USED_SPACE, TOTAL_SPACE};
use crate::tree::MockTree;

const PREVIEW_BASE_URL: &str = "https://example.com/preview/";

struct MockState {
    tree: MockTree,
    account: Option<CloudAccount>,
    used_space: u64,
    failures: HashMap<MockOperation, VecDeque<MockFailure>>,
}

impl MockState {
    fn available(&self) -> u64 {
        TOTAL_SPACE.saturating_sub(self.used_space)
    }
}

/// In-memory provider adapter
pub struct MockCloudService {
    service_type: ServiceType,
    config: MockConfig,
    authenticated: AtomicBool,
    state: Mutex<MockState>,
}

impl MockCloudService {
    /// Seeded adapter with default settings
    pub fn new(service_type: ServiceType) -> Self {
        Self::with_config(service_type, MockConfig::default())
    }

    /// Seeded adapter with the given identity, latency and search cap
    pub fn with_config(service_type: ServiceType, config: MockConfig) -> Self {
        // The seed is a compile-time table of valid names.
        let (tree, used_space) = match seed::seeded_tree(service_type) {
            Ok(tree) => (tree, SEEDED_USED_SPACE),
            Err(e) => {
                tracing::error!(error = %e, "Invalid mock seed, starting empty");
                (MockTree::default(), 0)
            }
        };
        Self::build(service_type, config, tree, used_space)
    }

    /// Adapter with an empty namespace and no usage
    pub fn empty(service_type: ServiceType) -> Self {
        Self::build(service_type, MockConfig::default(), MockTree::default(), 0)
    }

    fn build(service_type: ServiceType, config: MockConfig, tree: MockTree, used_space: u64) -> Self {
        Self {
            service_type,
            config,
            authenticated: AtomicBool::new(false),
            state: Mutex::new(MockState {
                tree,
                account: None,
                used_space,
                failures: HashMap::new(),
            }),
        }
    }

    /// Makes the next call of `operation` fail with `failure`
    ///
    /// Failures queue up per operation and are consumed in order.
    pub async fn fail_next(&self, operation: MockOperation, failure: MockFailure) {
        debug!(%operation, ?failure, "Scheduling mock failure");
        self.state
            .lock()
            .await
            .failures
            .entry(operation)
            .or_default()
            .push_back(failure);
    }

    /// Bytes currently counted against the quota
    pub async fn used_space(&self) -> u64 {
        self.state.lock().await.used_space
    }

    // --- Internals ---

    async fn simulate_latency(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }
    }

    /// Locks the state after latency, consuming a scheduled failure
    ///
    /// With `requires_session`, the session is re-read once the lock is held.
    async fn enter(
        &self,
        operation: MockOperation,
        requires_session: bool,
    ) -> Result<MutexGuard<'_, MockState>, CloudError> {
        self.simulate_latency().await;
        let mut state = self.state.lock().await;
        if requires_session && !self.authenticated.load(Ordering::SeqCst) {
            debug!(%operation, service = %self.service_type, "Rejected: signed out during latency");
            return Err(CloudError::NotAuthenticated);
        }
        let scheduled = state
            .failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);
        if let Some(failure) = scheduled {
            debug!(%operation, ?failure, "Returning scheduled mock failure");
            return Err(failure.into_error(operation));
        }
        Ok(state)
    }

    /// Session check followed by [`Self::enter`]
    async fn begin(&self, operation: MockOperation) -> Result<MutexGuard<'_, MockState>, CloudError> {
        if !self.authenticated.load(Ordering::SeqCst) {
            debug!(%operation, service = %self.service_type, "Rejected: not authenticated");
            return Err(CloudError::NotAuthenticated);
        }
        self.enter(operation, true).await
    }

    fn snapshot(&self, state: &MockState, id: String) -> CloudAccount {
        CloudAccount::new(id, self.service_type, &self.config.email, &self.config.display_name)
            .with_quota(state.used_space, TOTAL_SPACE)
            .with_last_sync_date(Utc::now())
    }

    fn new_id() -> String {
        Uuid::new_v4().to_string()
    }
}

#[async_trait::async_trait]
impl ICloudService for MockCloudService {
    fn service_type(&self) -> ServiceType {
        self.service_type
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    async fn authenticate(&self) -> Result<CloudAccount, CloudError> {
        let mut state = self.enter(MockOperation::Authenticate, false).await?;
        let account = self.snapshot(&state, Self::new_id());
        state.account = Some(account.clone());
        self.authenticated.store(true, Ordering::SeqCst);
        info!(service = %self.service_type, email = %account.email(), "Mock session established");
        Ok(account)
    }

    async fn sign_out(&self) -> Result<(), CloudError> {
        self.authenticated.store(false, Ordering::SeqCst);
        let mut state = self.state.lock().await;
        state.account = None;
        drop(state);
        info!(service = %self.service_type, "Mock session cleared");

        // Local state is gone either way; a scheduled failure models the
        // remote revocation failing.
        self.enter(MockOperation::SignOut, false).await.map(|_| ())
    }

    async fn get_account_info(&self) -> Result<CloudAccount, CloudError> {
        let mut state = self.begin(MockOperation::GetAccountInfo).await?;
        let (used, now) = (state.used_space, Utc::now());
        let account = state.account.as_mut().ok_or(CloudError::NotAuthenticated)?;
        account.update_quota(used, TOTAL_SPACE);
        account.record_sync(now);
        Ok(account.clone())
    }

    async fn list_files(&self, path: &CloudPath) -> Result<Vec<CloudFile>, CloudError> {
        let state = self.begin(MockOperation::ListFiles).await?;
        let files = state.tree.children(path)?;
        debug!(path = %path, count = files.len(), "MockCloudService::list_files");
        Ok(files)
    }

    async fn download_file(&self, file: &CloudFile) -> Result<Vec<u8>, CloudError> {
        let state = self.begin(MockOperation::DownloadFile).await?;
        let entry = state.tree.lookup(file)?;
        if entry.file.is_folder() {
            return Err(CloudError::OperationFailed(
                "Folders cannot be downloaded".to_string(),
            ));
        }
        debug!(path = %file.path(), "MockCloudService::download_file");
        Ok(entry
            .content
            .clone()
            .unwrap_or_else(|| seed::placeholder_content(&entry.file)))
    }

    async fn get_preview_url(&self, file: &CloudFile) -> Result<Url, CloudError> {
        let state = self.begin(MockOperation::GetPreviewUrl).await?;
        let entry = state.tree.lookup(file)?;
        Url::parse(PREVIEW_BASE_URL)
            .and_then(|base| base.join(entry.file.id()))
            .map_err(|e| CloudError::OperationFailed(format!("Invalid preview URL: {e}")))
    }

    async fn create_folder(&self, name: &str, parent: &CloudPath) -> Result<CloudFile, CloudError> {
        let mut state = self.begin(MockOperation::CreateFolder).await?;
        let folder = CloudFile::new_folder(Self::new_id(), parent, name, self.service_type)?;
        let folder = state.tree.add(folder, None)?;
        debug!(path = %folder.path(), "MockCloudService::create_folder");
        Ok(folder)
    }

    async fn delete_file(&self, file: &CloudFile) -> Result<(), CloudError> {
        let mut state = self.begin(MockOperation::DeleteFile).await?;
        let freed = state.tree.remove(file)?;
        state.used_space = state.used_space.saturating_sub(freed);
        debug!(path = %file.path(), freed, "MockCloudService::delete_file");
        Ok(())
    }

    async fn rename_file(&self, file: &CloudFile, new_name: &str) -> Result<CloudFile, CloudError> {
        let mut state = self.begin(MockOperation::RenameFile).await?;
        let renamed = state.tree.rename(file, new_name)?;
        debug!(from = %file.path(), to = %renamed.path(), "MockCloudService::rename_file");
        Ok(renamed)
    }

    async fn move_file(&self, file: &CloudFile, destination: &CloudPath) -> Result<CloudFile, CloudError> {
        let mut state = self.begin(MockOperation::MoveFile).await?;
        let moved = state.tree.move_to(file, destination)?;
        debug!(from = %file.path(), to = %moved.path(), "MockCloudService::move_file");
        Ok(moved)
    }

    async fn copy_file(&self, file: &CloudFile, destination: &CloudPath) -> Result<CloudFile, CloudError> {
        let mut state = self.begin(MockOperation::CopyFile).await?;
        let budget = state.available();
        let (copy, bytes) = state.tree.copy_to(file, destination, budget, Self::new_id)?;
        state.used_space += bytes;
        debug!(from = %file.path(), to = %copy.path(), bytes, "MockCloudService::copy_file");
        Ok(copy)
    }

    async fn upload_file(&self, data: &[u8], name: &str, parent: &CloudPath) -> Result<CloudFile, CloudError> {
        let mut state = self.begin(MockOperation::UploadFile).await?;
        let size = data.len() as u64;
        if size > state.available() {
            return Err(CloudError::QuotaExceeded);
        }
        let file = CloudFile::new_file(Self::new_id(), parent, name, size, self.service_type)?;
        let file = state.tree.add(file, Some(data.to_vec()))?;
        state.used_space += size;
        debug!(path = %file.path(), size, "MockCloudService::upload_file");
        Ok(file)
    }

    async fn search_files(&self, query: &str) -> Result<SearchResults, CloudError> {
        let state = self.begin(MockOperation::SearchFiles).await?;
        if query.is_empty() {
            return Ok(SearchResults::default());
        }

        let limit = self.config.max_search_results;
        let needle = query.to_lowercase();
        let mut matches = state.tree.find(&needle);
        let items: Vec<CloudFile> = matches.by_ref().take(limit).cloned().collect();
        let truncated = matches.next().is_some();
        debug!(query, found = items.len(), truncated, "MockCloudService::search_files");

        Ok(if truncated {
            SearchResults::truncated(items)
        } else {
            SearchResults::complete(items)
        })
    }
}
