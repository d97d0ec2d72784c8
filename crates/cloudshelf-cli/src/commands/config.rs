//! Config command - View and manage Cloudshelf configuration
//!
//! Provides the `cloudshelf config` CLI command which:
//! 1. Shows the effective configuration (YAML or JSON) and the keys stored
//!    in the settings database
//! 2. Validates the configuration file and reports every error
//! 3. Writes a default configuration file

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use cloudshelf_cache::SqliteSettingsStore;
use cloudshelf_core::config::Config;
use tracing::info;

use super::AppContext;

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Validate configuration file
    Validate,
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        match self {
            ConfigCommand::Show => execute_show(ctx).await,
            ConfigCommand::Validate => execute_validate(ctx),
            ConfigCommand::Init { force } => execute_init(ctx, *force),
        }
    }
}

async fn execute_show(ctx: &AppContext) -> Result<()> {
    let formatter = ctx.formatter();

    info!(config_path = %ctx.config_path.display(), "Showing configuration");

    let stored = stored_settings(&ctx.config.storage.database).await?;

    if ctx.is_json() {
        let json = serde_json::to_value(&ctx.config)
            .context("Failed to serialize configuration to JSON")?;
        let stored: Vec<_> = stored
            .iter()
            .map(|(key, updated_at)| serde_json::json!({ "key": key, "updated_at": updated_at }))
            .collect();
        formatter.print_json(&serde_json::json!({
            "config": json,
            "stored_settings": stored,
        }));
    } else {
        formatter.success(&format!("Configuration ({})", ctx.config_path.display()));
        formatter.info("");

        let yaml = serde_yaml::to_string(&ctx.config)
            .context("Failed to serialize configuration to YAML")?;
        for line in yaml.lines() {
            formatter.info(line);
        }

        formatter.info("");
        if stored.is_empty() {
            formatter.info("Settings database: nothing stored yet");
        } else {
            formatter.info(&format!(
                "Settings database ({})",
                ctx.config.storage.database.display()
            ));
            for (key, updated_at) in &stored {
                let updated_at = updated_at.as_deref().unwrap_or("unknown");
                formatter.info(&format!("  {key} (last written {updated_at})"));
            }
        }
    }

    Ok(())
}

/// Keys in the settings database with their last write time
///
/// A database that does not exist yet is reported as empty rather than
/// created.
async fn stored_settings(database: &Path) -> Result<Vec<(String, Option<String>)>> {
    if !database.exists() {
        return Ok(Vec::new());
    }

    let store = SqliteSettingsStore::open(database)
        .await
        .with_context(|| format!("Failed to open settings database at {}", database.display()))?;

    let mut stored = Vec::new();
    for key in store.keys().await.context("Failed to list stored settings")? {
        let updated_at = store
            .updated_at(&key)
            .await
            .with_context(|| format!("Failed to read timestamp of '{key}'"))?;
        stored.push((key, updated_at));
    }
    Ok(stored)
}

fn execute_validate(ctx: &AppContext) -> Result<()> {
    let formatter = ctx.formatter();
    let config_path = &ctx.config_path;

    // Load explicitly: a parse error must be reported, not defaulted away
    let config = match Config::load(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            let message = if config_path.exists() {
                format!("Failed to parse configuration: {}", e)
            } else {
                "Configuration file not found. Using defaults.".to_string()
            };

            if ctx.is_json() {
                formatter.print_json(&serde_json::json!({
                    "valid": false,
                    "config_path": config_path.display().to_string(),
                    "errors": [message],
                }));
            } else if config_path.exists() {
                formatter.error(&message);
                formatter.info(&format!("File: {}", config_path.display()));
            } else {
                formatter.info(&format!(
                    "Configuration file not found at {}",
                    config_path.display()
                ));
                formatter.info("Using default configuration. Run 'cloudshelf config init' to create one.");
            }
            return Ok(());
        }
    };

    info!(config_path = %config_path.display(), "Validating configuration");

    let errors = config.validate();

    if ctx.is_json() {
        let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        formatter.print_json(&serde_json::json!({
            "valid": errors.is_empty(),
            "config_path": config_path.display().to_string(),
            "errors": error_strings,
        }));
    } else if errors.is_empty() {
        formatter.success("Configuration is valid");
        formatter.info(&format!("File: {}", config_path.display()));
    } else {
        formatter.error(&format!(
            "Configuration has {} error{}:",
            errors.len(),
            if errors.len() == 1 { "" } else { "s" }
        ));
        formatter.info(&format!("File: {}", config_path.display()));
        formatter.info("");
        for error in &errors {
            formatter.info(&format!("  {} - {}", error.field, error.message));
        }
    }

    Ok(())
}

fn execute_init(ctx: &AppContext, force: bool) -> Result<()> {
    let formatter = ctx.formatter();

    write_default_config(&ctx.config_path, force)?;

    if ctx.is_json() {
        formatter.print_json(&serde_json::json!({
            "success": true,
            "config_path": ctx.config_path.display().to_string(),
        }));
    } else {
        formatter.success(&format!(
            "Wrote default configuration to {}",
            ctx.config_path.display()
        ));
    }
    Ok(())
}

/// Serializes [`Config::default`] to `path`, creating parent directories
fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Configuration file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("Failed to create configuration directory")?;
    }

    let yaml = serde_yaml::to_string(&Config::default()).context("Failed to serialize configuration")?;
    std::fs::write(path, yaml).context("Failed to write configuration file")?;

    info!(config_path = %path.display(), "Default configuration written");
    Ok(())
}
