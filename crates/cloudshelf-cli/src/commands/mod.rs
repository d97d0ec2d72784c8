//! CLI subcommands and the context they share

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use cloudshelf_cache::SqliteSettingsStore;
use cloudshelf_core::config::Config;
use cloudshelf_core::domain::CloudAccount;
use cloudshelf_core::usecases::AccountRegistry;
use tracing::debug;

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

pub mod accounts;
pub mod browse;
pub mod completions;
pub mod config;

/// Loaded configuration plus output settings, handed to every command
pub struct AppContext {
    pub config: Config,
    pub config_path: PathBuf,
    pub format: OutputFormat,
}

impl AppContext {
    pub fn new(config: Config, config_path: PathBuf, format: OutputFormat) -> Self {
        Self {
            config,
            config_path,
            format,
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.is_json())
    }

    /// Opens the settings database and loads the account registry over the
    /// in-memory provider adapters
    pub async fn open_registry(&self) -> Result<Arc<AccountRegistry>> {
        let services = cloudshelf_mock::mock_services(&self.config.mock)
            .context("Failed to create provider adapters")?;

        let store = SqliteSettingsStore::open(&self.config.storage.database)
            .await
            .with_context(|| {
                format!(
                    "Failed to open settings database at {}",
                    self.config.storage.database.display()
                )
            })?;

        let registry = AccountRegistry::load(
            services,
            Arc::new(store),
            self.config.storage.accounts_key.clone(),
            self.config.timeouts.clone(),
        )
        .await;

        Ok(Arc::new(registry))
    }
}

/// Returns `account` if its provider session is live, otherwise signs in
/// again and returns the reconnected account
///
/// Sessions do not outlive the process, while the account set is persisted,
/// so a stored account usually needs a fresh session.
pub async fn ensure_session(
    registry: &AccountRegistry,
    account: CloudAccount,
) -> Result<CloudAccount> {
    if registry.adapter_for(&account).is_authenticated() {
        return Ok(account);
    }

    debug!(id = %account.id(), service = %account.service_type(), "Re-establishing session");
    registry
        .connect(account.service_type())
        .await
        .with_context(|| format!("Failed to sign in to {}", account.service_type()))
}
