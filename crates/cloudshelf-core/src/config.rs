//! Configuration module for Cloudshelf.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings key under which the account set is persisted by default.
pub const DEFAULT_ACCOUNTS_KEY: &str = "CloudAccounts";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for Cloudshelf.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub timeouts: TimeoutConfig,
    pub browser: BrowserConfig,
    pub mock: MockConfig,
    pub logging: LoggingConfig,
}

/// Where registry state is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database backing the settings store.
    pub database: PathBuf,
    /// Settings key holding the serialized account set.
    pub accounts_key: String,
}

/// Per-operation deadlines for adapter calls, in seconds.
///
/// A call exceeding its deadline fails with a network error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// `authenticate`, `sign_out` and `get_account_info`.
    pub auth: u64,
    /// `list_files`.
    pub list: u64,
    /// `download_file` and `upload_file`.
    pub transfer: u64,
    /// Folder creation, delete, rename, move and copy.
    pub mutate: u64,
    /// `search_files`.
    pub search: u64,
}

/// File browser behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Sort listings and search results case-insensitively by name.
    pub sort_by_name: bool,
    /// Keep the last good listing when reloading a directory fails.
    pub preserve_listing_on_error: bool,
}

/// Settings for the in-memory provider adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Simulated latency added to every adapter call, in milliseconds.
    pub latency_ms: u64,
    /// Maximum number of search results before the result set is truncated.
    pub max_search_results: usize,
    /// Email of the simulated user.
    pub email: String,
    /// Display name of the simulated user.
    pub display_name: String,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Emit JSON log lines instead of human-readable output.
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Using default configuration");
                Self::default()
            }
        }
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/cloudshelf/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("cloudshelf")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("cloudshelf")
                .join("settings.db"),
            accounts_key: DEFAULT_ACCOUNTS_KEY.to_string(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            auth: 60,
            list: 30,
            transfer: 120,
            mutate: 30,
            search: 30,
        }
    }
}

impl TimeoutConfig {
    pub fn auth(&self) -> Duration {
        Duration::from_secs(self.auth)
    }

    pub fn list(&self) -> Duration {
        Duration::from_secs(self.list)
    }

    pub fn transfer(&self) -> Duration {
        Duration::from_secs(self.transfer)
    }

    pub fn mutate(&self) -> Duration {
        Duration::from_secs(self.mutate)
    }

    pub fn search(&self) -> Duration {
        Duration::from_secs(self.search)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            sort_by_name: true,
            preserve_listing_on_error: false,
        }
    }
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            latency_ms: 0,
            max_search_results: 100,
            email: "user@example.com".to_string(),
            display_name: "Demo User".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"timeouts.list"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- storage ---
        if self.storage.accounts_key.trim().is_empty() {
            errors.push(ValidationError {
                field: "storage.accounts_key".into(),
                message: "must not be empty".into(),
            });
        }
        if self.storage.database.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "storage.database".into(),
                message: "must not be empty".into(),
            });
        }

        // --- timeouts ---
        let timeouts = [
            ("timeouts.auth", self.timeouts.auth),
            ("timeouts.list", self.timeouts.list),
            ("timeouts.transfer", self.timeouts.transfer),
            ("timeouts.mutate", self.timeouts.mutate),
            ("timeouts.search", self.timeouts.search),
        ];
        for (field, value) in timeouts {
            if value == 0 {
                errors.push(ValidationError {
                    field: field.into(),
                    message: "must be greater than 0".into(),
                });
            }
        }

        // --- mock ---
        if self.mock.max_search_results == 0 {
            errors.push(ValidationError {
                field: "mock.max_search_results".into(),
                message: "must be greater than 0".into(),
            });
        }
        if !self.mock.email.contains('@') {
            errors.push(ValidationError {
                field: "mock.email".into(),
                message: format!("not an email address: '{}'", self.mock.email),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use cloudshelf_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .timeouts_list(10)
///     .browser_preserve_listing_on_error(true)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- storage ---

    pub fn storage_database(mut self, path: PathBuf) -> Self {
        self.config.storage.database = path;
        self
    }

    pub fn storage_accounts_key(mut self, key: impl Into<String>) -> Self {
        self.config.storage.accounts_key = key.into();
        self
    }

    // --- timeouts ---

    pub fn timeouts_auth(mut self, seconds: u64) -> Self {
        self.config.timeouts.auth = seconds;
        self
    }

    pub fn timeouts_list(mut self, seconds: u64) -> Self {
        self.config.timeouts.list = seconds;
        self
    }

    pub fn timeouts_transfer(mut self, seconds: u64) -> Self {
        self.config.timeouts.transfer = seconds;
        self
    }

    pub fn timeouts_mutate(mut self, seconds: u64) -> Self {
        self.config.timeouts.mutate = seconds;
        self
    }

    pub fn timeouts_search(mut self, seconds: u64) -> Self {
        self.config.timeouts.search = seconds;
        self
    }

    // --- browser ---

    pub fn browser_sort_by_name(mut self, sort: bool) -> Self {
        self.config.browser.sort_by_name = sort;
        self
    }

    pub fn browser_preserve_listing_on_error(mut self, preserve: bool) -> Self {
        self.config.browser.preserve_listing_on_error = preserve;
        self
    }

    // --- mock ---

    pub fn mock_latency_ms(mut self, ms: u64) -> Self {
        self.config.mock.latency_ms = ms;
        self
    }

    pub fn mock_max_search_results(mut self, n: usize) -> Self {
        self.config.mock.max_search_results = n;
        self
    }

    pub fn mock_identity(mut self, email: impl Into<String>, display_name: impl Into<String>) -> Self {
        self.config.mock.email = email.into();
        self.config.mock.display_name = display_name.into();
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_json(mut self, json: bool) -> Self {
        self.config.logging.json = json;
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
