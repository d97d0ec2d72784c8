//! Account registry use case
//!
//! Owns the set of connected accounts, routes account-scoped calls to the
//! adapter bound to the account's provider, and persists the account set
//! through the settings store port.
//!
//! The registry is constructed once at process start with
//! [`AccountRegistry::load`] and shared (`Arc`) with every file browser.
//!
//! ## Concurrency
//!
//! - Authentication and sign-out are serialized per adapter: one flow in
//!   flight per provider at a time.
//! - Every mutation of the account set holds the registry write lock across
//!   the read-modify-write of the persisted blob, so concurrent
//!   connect/disconnect/refresh calls cannot lose updates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, info, warn};

use crate::{
    config::TimeoutConfig,
    domain::{CloudAccount, CloudError, DomainError, ServiceType},
    ports::{with_timeout, ICloudService, ISettingsStore},
};

/// Version written into the persisted account blob
const SCHEMA_VERSION: u32 = 1;

/// Capacity of the registry event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

// ============================================================================
// ServiceSet
// ============================================================================

/// One adapter per supported provider
///
/// Built once; every [`ServiceType`] is guaranteed to have a bound adapter,
/// so lookups cannot fail.
pub struct ServiceSet {
    services: [Arc<dyn ICloudService>; 4],
}

impl ServiceSet {
    /// Builds the set by asking `factory` for each provider's adapter
    ///
    /// # Errors
    /// Returns `DomainError::ValidationFailed` if an adapter reports a
    /// different provider than the slot it was created for.
    pub fn from_fn<F>(mut factory: F) -> Result<Self, DomainError>
    where
        F: FnMut(ServiceType) -> Arc<dyn ICloudService>,
    {
        let services = ServiceType::ALL.map(&mut factory);
        for (expected, adapter) in ServiceType::ALL.iter().zip(services.iter()) {
            if adapter.service_type() != *expected {
                return Err(DomainError::ValidationFailed(format!(
                    "adapter for {} reports service type {}",
                    expected,
                    adapter.service_type()
                )));
            }
        }
        Ok(Self { services })
    }

    /// The adapter bound to `service_type`
    pub fn get(&self, service_type: ServiceType) -> &Arc<dyn ICloudService> {
        &self.services[service_type.index()]
    }

    /// All bound adapters, in [`ServiceType::ALL`] order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ICloudService>> {
        self.services.iter()
    }
}

// ============================================================================
// Events
// ============================================================================

/// Change notifications published by the registry
#[derive(Debug, Clone)]
pub enum RegistryEvent {
    /// An account was connected (or reconnected, replacing its old entry)
    Connected(CloudAccount),
    /// An account was removed
    Disconnected(CloudAccount),
    /// An account's information was refreshed
    Refreshed(CloudAccount),
}

// ============================================================================
// Persistence format
// ============================================================================

#[derive(Serialize)]
struct PersistedAccountsRef<'a> {
    version: u32,
    accounts: &'a [CloudAccount],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PersistedAccounts {
    Versioned {
        version: u32,
        accounts: Vec<CloudAccount>,
    },
    Legacy(Vec<CloudAccount>),
}

/// Serializes the account set into the persisted blob format
pub fn encode_accounts(accounts: &[CloudAccount]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(&PersistedAccountsRef {
        version: SCHEMA_VERSION,
        accounts,
    })
}

/// Deserializes a persisted blob
///
/// Accepts both the versioned envelope and a bare JSON array. Anything
/// unreadable (or written by a newer schema) yields an empty set. Duplicate
/// `(service_type, email)` entries keep the most recent one.
pub fn decode_accounts(bytes: &[u8]) -> Vec<CloudAccount> {
    let accounts = match serde_json::from_slice::<PersistedAccounts>(bytes) {
        Ok(PersistedAccounts::Versioned { version, accounts }) if version <= SCHEMA_VERSION => {
            accounts
        }
        Ok(PersistedAccounts::Versioned { version, .. }) => {
            warn!(
                version,
                supported = SCHEMA_VERSION,
                "Persisted accounts use a newer schema, starting empty"
            );
            return Vec::new();
        }
        Ok(PersistedAccounts::Legacy(accounts)) => accounts,
        Err(e) => {
            warn!(error = %e, "Persisted accounts are corrupt, starting empty");
            return Vec::new();
        }
    };

    let mut unique: Vec<CloudAccount> = Vec::with_capacity(accounts.len());
    for account in accounts {
        match unique.iter_mut().find(|a| a.same_identity(&account)) {
            Some(existing) => *existing = account,
            None => unique.push(account),
        }
    }
    unique
}

// ============================================================================
// AccountRegistry
// ============================================================================

/// Registry of connected accounts
pub struct AccountRegistry {
    services: ServiceSet,
    store: Arc<dyn ISettingsStore>,
    accounts_key: String,
    timeouts: TimeoutConfig,
    accounts: watch::Sender<Vec<CloudAccount>>,
    write_lock: Mutex<()>,
    auth_locks: [Mutex<()>; 4],
    events: broadcast::Sender<RegistryEvent>,
}

impl AccountRegistry {
    /// Creates the registry and loads the persisted account set
    ///
    /// Missing or corrupt persisted state is treated as an empty set; a
    /// failing store read is logged, never fatal.
    pub async fn load(
        services: ServiceSet,
        store: Arc<dyn ISettingsStore>,
        accounts_key: impl Into<String>,
        timeouts: TimeoutConfig,
    ) -> Self {
        let accounts_key = accounts_key.into();

        let accounts = match store.get(&accounts_key).await {
            Ok(Some(bytes)) => decode_accounts(&bytes),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, key = %accounts_key, "Failed to read persisted accounts");
                Vec::new()
            }
        };

        info!(count = accounts.len(), "Account registry loaded");

        let (accounts_tx, _) = watch::channel(accounts);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            services,
            store,
            accounts_key,
            timeouts,
            accounts: accounts_tx,
            write_lock: Mutex::new(()),
            auth_locks: Default::default(),
            events,
        }
    }

    // --- Queries ---

    /// Snapshot of the connected accounts, in connection order
    pub fn accounts(&self) -> Vec<CloudAccount> {
        self.accounts.borrow().clone()
    }

    /// Looks up an account by id
    pub fn account(&self, id: &str) -> Option<CloudAccount> {
        self.accounts.borrow().iter().find(|a| a.id() == id).cloned()
    }

    /// The adapter serving `account`
    pub fn adapter_for(&self, account: &CloudAccount) -> &Arc<dyn ICloudService> {
        self.services.get(account.service_type())
    }

    /// The adapter bound to `service_type`
    pub fn adapter_for_type(&self, service_type: ServiceType) -> &Arc<dyn ICloudService> {
        self.services.get(service_type)
    }

    /// Receives a fresh account list after every change
    pub fn watch_accounts(&self) -> watch::Receiver<Vec<CloudAccount>> {
        self.accounts.subscribe()
    }

    /// Receives a [`RegistryEvent`] for every change
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    // --- Operations ---

    /// Authenticates with `service_type` and stores the resulting account
    ///
    /// Reconnecting the same email on the same provider replaces the
    /// existing entry instead of adding a duplicate.
    ///
    /// # Errors
    ///
    /// Returns `CloudError::AuthenticationFailed` when the flow fails, or
    /// `CloudError::NetworkError` on transport failure or timeout. The
    /// account set is left untouched on error.
    pub async fn connect(&self, service_type: ServiceType) -> Result<CloudAccount, CloudError> {
        let adapter = Arc::clone(self.services.get(service_type));
        let _auth = self.auth_locks[service_type.index()].lock().await;

        info!(service = %service_type, "Connecting account");

        let account = with_timeout("authenticate", self.timeouts.auth(), adapter.authenticate())
            .await
            .map_err(|e| match e {
                e @ (CloudError::AuthenticationFailed(_) | CloudError::NetworkError(_)) => e,
                other => CloudError::AuthenticationFailed(other.to_string()),
            })?;

        let _write = self.write_lock.lock().await;
        self.accounts.send_modify(|accounts| {
            match accounts.iter_mut().find(|a| a.same_identity(&account)) {
                Some(existing) => {
                    debug!(old_id = %existing.id(), new_id = %account.id(), "Replacing reconnected account");
                    *existing = account.clone();
                }
                None => accounts.push(account.clone()),
            }
        });
        self.persist().await;

        info!(service = %service_type, email = %account.email(), id = %account.id(), "Account connected");
        self.emit(RegistryEvent::Connected(account.clone()));
        Ok(account)
    }

    /// Signs out of `account`'s provider and removes the account
    ///
    /// # Errors
    ///
    /// A `CloudError::NetworkError` from sign-out means the remote session
    /// could not be revoked after local state was cleared: the account is
    /// still removed and the error returned. Any other sign-out error leaves
    /// the account set untouched.
    pub async fn disconnect(&self, account: &CloudAccount) -> Result<(), CloudError> {
        let service_type = account.service_type();
        let adapter = Arc::clone(self.services.get(service_type));
        let _auth = self.auth_locks[service_type.index()].lock().await;

        info!(service = %service_type, id = %account.id(), "Disconnecting account");

        let outcome = with_timeout("sign_out", self.timeouts.auth(), adapter.sign_out()).await;
        if let Err(e) = &outcome {
            if !e.is_network() {
                warn!(error = %e, "Sign-out rejected, keeping account");
                return outcome;
            }
            warn!(error = %e, "Remote sign-out failed, removing account locally");
        }

        let _write = self.write_lock.lock().await;
        let mut removed = None;
        self.accounts.send_if_modified(|accounts| {
            match accounts.iter().position(|a| a.id() == account.id()) {
                Some(idx) => {
                    removed = Some(accounts.remove(idx));
                    true
                }
                None => false,
            }
        });

        if let Some(mut removed) = removed {
            self.persist().await;
            removed.mark_disconnected();
            self.emit(RegistryEvent::Disconnected(removed));
        }

        outcome
    }

    /// Refreshes identity and quota information for `account`
    ///
    /// The stored entry with the same id is replaced by the fresh snapshot.
    ///
    /// # Errors
    ///
    /// Propagates the adapter error (e.g. `CloudError::NotAuthenticated`)
    /// without touching the account set. Returns
    /// `CloudError::OperationFailed`, also without touching the set, when
    /// the adapter's session now belongs to a different identity.
    pub async fn refresh(&self, account: &CloudAccount) -> Result<CloudAccount, CloudError> {
        let adapter = Arc::clone(self.adapter_for(account));

        debug!(id = %account.id(), "Refreshing account");

        let updated = with_timeout(
            "get_account_info",
            self.timeouts.auth(),
            adapter.get_account_info(),
        )
        .await?;

        // The adapter holds one session; it may have moved to another email
        if !updated.same_identity(account) {
            warn!(
                id = %account.id(),
                expected = %account.email(),
                actual = %updated.email(),
                "Session belongs to a different account, not refreshing"
            );
            return Err(CloudError::OperationFailed(format!(
                "{} is signed in as {}, not {}",
                account.service_type(),
                updated.email(),
                account.email()
            )));
        }

        let _write = self.write_lock.lock().await;
        let replaced = self.accounts.send_if_modified(|accounts| {
            match accounts.iter_mut().find(|a| a.id() == account.id()) {
                Some(existing) => {
                    *existing = updated.clone();
                    true
                }
                None => false,
            }
        });

        if replaced {
            self.persist().await;
            self.emit(RegistryEvent::Refreshed(updated.clone()));
        }

        Ok(updated)
    }

    // --- Internals ---

    /// Writes the full account set as one blob. Callers hold the write lock.
    async fn persist(&self) {
        let snapshot = self.accounts();
        let bytes = match encode_accounts(&snapshot) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Failed to serialize accounts");
                return;
            }
        };

        match self.store.set(&self.accounts_key, &bytes).await {
            Ok(()) => debug!(count = snapshot.len(), "Persisted accounts"),
            Err(e) => warn!(error = %e, "Failed to persist accounts, keeping in-memory state"),
        }
    }

    fn emit(&self, event: RegistryEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
