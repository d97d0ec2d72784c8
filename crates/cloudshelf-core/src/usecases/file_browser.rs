//! File browser use case
//!
//! A per-account browsing session: current directory, back-navigation
//! history, search and preview, with every file operation mediated so that
//! loading and error state stay consistent.
//!
//! ## State model
//!
//! The browser owns a single [`BrowserState`] published through a
//! `tokio::sync::watch` channel. Every operation also returns a snapshot of
//! the state after it completed. Loading and error are overlays on the
//! current path (see [`BrowserStatus`]), never separate modes.
//!
//! ## Concurrency
//!
//! - A new navigation supersedes any in-flight listing: its token is
//!   cancelled and its generation retired, so a stale listing is never
//!   applied.
//! - Mutating operations are serialized per browser. After a successful
//!   mutation the current directory is reloaded from the provider; the
//!   reload is discarded if the user navigated away in the meantime.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    config::{BrowserConfig, TimeoutConfig},
    domain::{CloudAccount, CloudError, CloudFile, CloudPath},
    ports::{with_timeout, ICloudService},
    usecases::{AccountRegistry, NavigationHistory},
};

// ============================================================================
// State
// ============================================================================

/// Search overlay state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    /// Active query; empty when not searching
    pub query: String,
    pub results: Vec<CloudFile>,
    pub is_searching: bool,
    /// True if the provider returned only part of the matches
    pub truncated: bool,
}

impl SearchState {
    /// True while a non-empty query is set
    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }
}

/// Downloaded content of a previewable file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewContent {
    pub file: CloudFile,
    pub data: Vec<u8>,
}

/// Coarse view of the browser state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserStatus {
    Idle(CloudPath),
    Loading(CloudPath),
    Error { path: CloudPath, message: String },
}

/// Snapshot of a browsing session
#[derive(Debug, Clone, Default)]
pub struct BrowserState {
    /// Account being browsed, `None` until [`FileBrowser::set_account`]
    pub account: Option<CloudAccount>,
    pub current_path: CloudPath,
    pub history: NavigationHistory,
    /// Listing of `current_path`
    pub files: Vec<CloudFile>,
    /// Number of operations currently running
    pub in_flight: usize,
    /// Message of the most recent failure, until dismissed
    pub error: Option<String>,
    pub search: SearchState,
    pub preview: Option<PreviewContent>,
}

impl BrowserState {
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn show_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn can_go_back(&self) -> bool {
        self.history.can_go_back()
    }

    pub fn status(&self) -> BrowserStatus {
        let path = self.current_path.clone();
        if self.is_loading() {
            BrowserStatus::Loading(path)
        } else if let Some(message) = &self.error {
            BrowserStatus::Error {
                path,
                message: message.clone(),
            }
        } else {
            BrowserStatus::Idle(path)
        }
    }

    /// Search results while a query is active, the directory listing otherwise
    pub fn visible_files(&self) -> &[CloudFile] {
        if self.search.is_active() {
            &self.search.results
        } else {
            &self.files
        }
    }

    /// Human-readable location, "Root" at the top level
    pub fn display_path(&self) -> String {
        if self.current_path.is_root() {
            "Root".to_string()
        } else {
            self.current_path.to_string()
        }
    }
}

// ============================================================================
// FileBrowser
// ============================================================================

struct LoadTicket {
    generation: u64,
    token: CancellationToken,
}

/// Browsing session over one account at a time
pub struct FileBrowser {
    registry: Arc<AccountRegistry>,
    config: BrowserConfig,
    timeouts: TimeoutConfig,
    state: watch::Sender<BrowserState>,
    op_lock: Mutex<()>,
    load_token: Mutex<CancellationToken>,
    generation: AtomicU64,
    search_seq: AtomicU64,
}

impl FileBrowser {
    pub fn new(registry: Arc<AccountRegistry>, config: BrowserConfig, timeouts: TimeoutConfig) -> Self {
        let (state, _) = watch::channel(BrowserState::default());
        Self {
            registry,
            config,
            timeouts,
            state,
            op_lock: Mutex::new(()),
            load_token: Mutex::new(CancellationToken::new()),
            generation: AtomicU64::new(0),
            search_seq: AtomicU64::new(0),
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> BrowserState {
        self.state.borrow().clone()
    }

    /// Receives every state change
    pub fn subscribe(&self) -> watch::Receiver<BrowserState> {
        self.state.subscribe()
    }

    pub fn account(&self) -> Option<CloudAccount> {
        self.state.borrow().account.clone()
    }

    // --- Navigation ---

    /// Switches to `account`, resets to the root and loads it
    pub async fn set_account(&self, account: CloudAccount) -> BrowserState {
        info!(service = %account.service_type(), id = %account.id(), "Browsing account");

        let adapter = Arc::clone(self.registry.adapter_for(&account));
        self.search_seq.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|s| {
            *s = BrowserState {
                account: Some(account),
                in_flight: s.in_flight,
                ..BrowserState::default()
            };
        });

        let ticket = self.supersede_loads().await;
        self.load_listing(adapter, CloudPath::root(), ticket).await;
        self.state()
    }

    /// Enters `folder`; files are ignored
    pub async fn navigate_to_folder(&self, folder: &CloudFile) -> BrowserState {
        if !folder.is_folder() {
            debug!(path = %folder.path(), "Not a folder, ignoring navigation");
            return self.state();
        }
        let Some(adapter) = self.adapter() else {
            return self.state();
        };

        let target = folder.path().clone();
        self.state.send_modify(|s| {
            let previous = std::mem::replace(&mut s.current_path, target.clone());
            s.history.push(previous);
            s.files.clear();
        });
        debug!(path = %target, "Navigated into folder");

        let ticket = self.supersede_loads().await;
        self.load_listing(adapter, target, ticket).await;
        self.state()
    }

    /// Returns to the previous directory; no-op at the root entry
    pub async fn navigate_back(&self) -> BrowserState {
        let Some(adapter) = self.adapter() else {
            return self.state();
        };

        let mut target = None;
        self.state.send_if_modified(|s| match s.history.pop() {
            Some(previous) => {
                s.current_path = previous.clone();
                s.files.clear();
                target = Some(previous);
                true
            }
            None => false,
        });
        let Some(target) = target else {
            debug!("History at root, nothing to go back to");
            return self.state();
        };
        debug!(path = %target, "Navigated back");

        let ticket = self.supersede_loads().await;
        self.load_listing(adapter, target, ticket).await;
        self.state()
    }

    /// Reloads the current directory
    pub async fn refresh(&self) -> BrowserState {
        let Some(adapter) = self.adapter() else {
            return self.state();
        };
        let path = self.state.borrow().current_path.clone();
        let ticket = self.current_ticket().await;
        self.load_listing(adapter, path, ticket).await;
        self.state()
    }

    // --- File operations ---

    /// Creates a folder in the current directory; empty names are ignored
    pub async fn create_folder(&self, name: &str) -> BrowserState {
        if name.is_empty() {
            return self.state();
        }
        let name = name.to_string();
        self.mutate("create_folder", self.timeouts.mutate(), move |adapter, path| async move {
            adapter.create_folder(&name, &path).await
        })
        .await
    }

    /// Uploads `data` as `name` into the current directory
    pub async fn upload_file(&self, data: Vec<u8>, name: &str) -> BrowserState {
        if name.is_empty() {
            return self.state();
        }
        let name = name.to_string();
        self.mutate("upload_file", self.timeouts.transfer(), move |adapter, path| async move {
            adapter.upload_file(&data, &name, &path).await
        })
        .await
    }

    pub async fn delete_file(&self, file: &CloudFile) -> BrowserState {
        let file = file.clone();
        self.mutate("delete_file", self.timeouts.mutate(), move |adapter, _| async move {
            adapter.delete_file(&file).await
        })
        .await
    }

    /// Renames `file`; empty names are ignored
    pub async fn rename_file(&self, file: &CloudFile, new_name: &str) -> BrowserState {
        if new_name.is_empty() {
            return self.state();
        }
        let file = file.clone();
        let new_name = new_name.to_string();
        self.mutate("rename_file", self.timeouts.mutate(), move |adapter, _| async move {
            adapter.rename_file(&file, &new_name).await
        })
        .await
    }

    pub async fn move_file(&self, file: &CloudFile, destination: &CloudPath) -> BrowserState {
        let file = file.clone();
        let destination = destination.clone();
        self.mutate("move_file", self.timeouts.mutate(), move |adapter, _| async move {
            adapter.move_file(&file, &destination).await
        })
        .await
    }

    pub async fn copy_file(&self, file: &CloudFile, destination: &CloudPath) -> BrowserState {
        let file = file.clone();
        let destination = destination.clone();
        self.mutate("copy_file", self.timeouts.mutate(), move |adapter, _| async move {
            adapter.copy_file(&file, &destination).await
        })
        .await
    }

    // --- Search ---

    /// Runs a search; an empty query clears search mode
    ///
    /// Only the most recent search applies its results.
    pub async fn search(&self, query: &str) -> BrowserState {
        if query.is_empty() {
            return self.clear_search();
        }
        let Some(adapter) = self.adapter() else {
            return self.state();
        };

        let seq = self.search_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.to_string();
        self.state.send_modify(|s| {
            s.search.query = query.clone();
            s.search.is_searching = true;
            s.error = None;
        });
        debug!(query = %query, "Searching");

        self.run_search(adapter, query, seq).await;
        self.state()
    }

    /// Re-runs the active query so results reflect a finished mutation
    async fn rerun_search(&self, adapter: Arc<dyn ICloudService>) {
        let query = self.state.borrow().search.query.clone();
        if query.is_empty() {
            return;
        }
        let seq = self.search_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| s.search.is_searching = true);
        debug!(query = %query, "Refreshing search after file operation");
        self.run_search(adapter, query, seq).await;
    }

    /// Applies the outcome only while `seq` is still the latest search
    async fn run_search(&self, adapter: Arc<dyn ICloudService>, query: String, seq: u64) {
        let result = with_timeout(
            "search_files",
            self.timeouts.search(),
            adapter.search_files(&query),
        )
        .await;

        self.state.send_if_modified(|s| {
            if self.search_seq.load(Ordering::SeqCst) != seq {
                return false;
            }
            s.search.is_searching = false;
            match result {
                Ok(found) => {
                    let mut items = found.items;
                    self.sort_entries(&mut items);
                    debug!(query = %query, matches = items.len(), truncated = found.truncated, "Search finished");
                    s.search.results = items;
                    s.search.truncated = found.truncated;
                }
                Err(e) => {
                    warn!(query = %query, error = %e, "Search failed");
                    s.search.results.clear();
                    s.search.truncated = false;
                    s.error = Some(e.to_string());
                }
            }
            true
        });
    }

    /// Leaves search mode
    pub fn clear_search(&self) -> BrowserState {
        self.search_seq.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|s| s.search = SearchState::default());
        self.state()
    }

    // --- Preview ---

    /// Downloads `file` for preview; non-previewable files are ignored
    pub async fn load_preview(&self, file: &CloudFile) -> BrowserState {
        if !file.can_preview() {
            debug!(name = %file.name(), "File cannot be previewed");
            return self.state();
        }
        let Some(adapter) = self.adapter() else {
            return self.state();
        };

        self.state.send_modify(|s| {
            s.in_flight += 1;
            s.error = None;
            s.preview = None;
        });

        let result = with_timeout(
            "download_file",
            self.timeouts.transfer(),
            adapter.download_file(file),
        )
        .await;

        self.state.send_modify(|s| {
            s.in_flight = s.in_flight.saturating_sub(1);
            match result {
                Ok(data) => {
                    debug!(name = %file.name(), bytes = data.len(), "Preview loaded");
                    s.preview = Some(PreviewContent {
                        file: file.clone(),
                        data,
                    });
                }
                Err(e) => {
                    warn!(name = %file.name(), error = %e, "Preview failed");
                    s.error = Some(e.to_string());
                }
            }
        });
        self.state()
    }

    pub fn close_preview(&self) -> BrowserState {
        self.state.send_modify(|s| s.preview = None);
        self.state()
    }

    /// Clears the error overlay
    pub fn dismiss_error(&self) -> BrowserState {
        self.state.send_if_modified(|s| s.error.take().is_some());
        self.state()
    }

    // --- Internals ---

    fn adapter(&self) -> Option<Arc<dyn ICloudService>> {
        let state = self.state.borrow();
        let account = state.account.as_ref()?;
        Some(Arc::clone(self.registry.adapter_for(account)))
    }

    /// Cancels any in-flight listing and starts a new generation
    async fn supersede_loads(&self) -> LoadTicket {
        let mut token = self.load_token.lock().await;
        token.cancel();
        *token = CancellationToken::new();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        LoadTicket {
            generation,
            token: token.clone(),
        }
    }

    async fn current_ticket(&self) -> LoadTicket {
        let token = self.load_token.lock().await;
        LoadTicket {
            generation: self.generation.load(Ordering::SeqCst),
            token: token.clone(),
        }
    }

    /// Lists `path` and applies the result unless superseded
    async fn load_listing(&self, adapter: Arc<dyn ICloudService>, path: CloudPath, ticket: LoadTicket) {
        self.state.send_modify(|s| {
            s.in_flight += 1;
            s.error = None;
        });

        let listing = with_timeout("list_files", self.timeouts.list(), adapter.list_files(&path));
        let outcome = tokio::select! {
            _ = ticket.token.cancelled() => None,
            result = listing => Some(result),
        };

        self.state.send_modify(|s| {
            s.in_flight = s.in_flight.saturating_sub(1);

            let Some(result) = outcome else {
                debug!(path = %path, "Listing superseded");
                return;
            };
            if self.generation.load(Ordering::SeqCst) != ticket.generation || s.current_path != path {
                debug!(path = %path, "Discarding stale listing");
                return;
            }

            match result {
                Ok(mut files) => {
                    self.sort_entries(&mut files);
                    debug!(path = %path, count = files.len(), "Listing loaded");
                    s.files = files;
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "Listing failed");
                    s.error = Some(e.to_string());
                    if !self.config.preserve_listing_on_error {
                        s.files.clear();
                    }
                }
            }
        });
    }

    /// Runs a mutating adapter call, then reloads the current directory
    /// and any active search
    async fn mutate<T, F, Fut>(&self, operation: &'static str, limit: Duration, call: F) -> BrowserState
    where
        F: FnOnce(Arc<dyn ICloudService>, CloudPath) -> Fut,
        Fut: Future<Output = Result<T, CloudError>>,
    {
        let _serial = self.op_lock.lock().await;
        let Some(adapter) = self.adapter() else {
            debug!(operation, "No account selected");
            return self.state();
        };

        let ticket = self.current_ticket().await;
        let path = self.state.borrow().current_path.clone();
        self.state.send_modify(|s| {
            s.in_flight += 1;
            s.error = None;
        });
        debug!(operation, path = %path, "Running file operation");

        match with_timeout(operation, limit, call(Arc::clone(&adapter), path.clone())).await {
            Ok(_) => {
                info!(operation, path = %path, "File operation succeeded");
                self.load_listing(Arc::clone(&adapter), path, ticket).await;
                self.rerun_search(adapter).await;
            }
            Err(e) => {
                warn!(operation, path = %path, error = %e, "File operation failed");
                self.state.send_modify(|s| s.error = Some(e.to_string()));
            }
        }

        self.state.send_modify(|s| s.in_flight = s.in_flight.saturating_sub(1));
        self.state()
    }

    fn sort_entries(&self, files: &mut [CloudFile]) {
        if self.config.sort_by_name {
            files.sort_by_cached_key(|f| f.name().to_lowercase());
        }
    }
}
