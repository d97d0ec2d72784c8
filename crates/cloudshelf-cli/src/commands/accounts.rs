//! Accounts commands - list, connect, disconnect and refresh
//!
//! Provides the `cloudshelf accounts` CLI subcommands which:
//! 1. `list`       - Shows the persisted accounts with their quota
//! 2. `connect`    - Authenticates with a provider and stores the account
//! 3. `disconnect` - Signs out and forgets an account
//! 4. `refresh`    - Re-reads identity and quota for an account
//!
//! Provider sessions live only as long as the process, so `refresh`
//! re-establishes the session first when needed.

use anyhow::{Context, Result};
use clap::Subcommand;
use cloudshelf_core::domain::{CloudAccount, ServiceType};
use cloudshelf_core::usecases::AccountRegistry;
use tracing::info;

use super::AppContext;
use crate::output::OutputFormatter;

#[derive(Debug, Subcommand)]
pub enum AccountsCommand {
    /// List connected accounts
    List,
    /// Connect an account (dropbox, google-drive, onedrive, icloud)
    Connect {
        /// Storage provider
        service: ServiceType,
    },
    /// Disconnect an account
    Disconnect {
        /// Account id, as shown by `accounts list`
        id: String,
    },
    /// Refresh identity and quota for an account
    Refresh {
        /// Account id, as shown by `accounts list`
        id: String,
    },
}

impl AccountsCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let fmt = ctx.formatter();
        let registry = ctx.open_registry().await?;
        match self {
            AccountsCommand::List => execute_list(&registry, &*fmt, ctx.is_json()),
            AccountsCommand::Connect { service } => {
                execute_connect(&registry, *service, &*fmt, ctx.is_json()).await
            }
            AccountsCommand::Disconnect { id } => execute_disconnect(&registry, id, &*fmt).await,
            AccountsCommand::Refresh { id } => {
                execute_refresh(&registry, id, &*fmt, ctx.is_json()).await
            }
        }
    }
}

fn execute_list(registry: &AccountRegistry, fmt: &dyn OutputFormatter, json: bool) -> Result<()> {
    let accounts = registry.accounts();

    if json {
        let value = serde_json::to_value(&accounts).context("Failed to serialize accounts")?;
        fmt.print_json(&value);
        return Ok(());
    }

    if accounts.is_empty() {
        fmt.info("No accounts connected. Run 'cloudshelf accounts connect <service>' to add one.");
        return Ok(());
    }

    fmt.success(&format!(
        "{} account{} connected",
        accounts.len(),
        if accounts.len() == 1 { "" } else { "s" }
    ));
    for account in &accounts {
        fmt.info("");
        for line in describe(account) {
            fmt.info(&line);
        }
    }
    Ok(())
}

async fn execute_connect(
    registry: &AccountRegistry,
    service: ServiceType,
    fmt: &dyn OutputFormatter,
    json: bool,
) -> Result<()> {
    info!(service = %service, "Connecting account from CLI");

    let account = registry
        .connect(service)
        .await
        .with_context(|| format!("Failed to connect {}", service))?;

    if json {
        let value = serde_json::to_value(&account).context("Failed to serialize account")?;
        fmt.print_json(&value);
    } else {
        fmt.success(&format!(
            "Connected {} as {} ({})",
            service,
            account.display_name(),
            account.email()
        ));
        fmt.info(&format!("Account id: {}", account.id()));
    }
    Ok(())
}

async fn execute_disconnect(
    registry: &AccountRegistry,
    id: &str,
    fmt: &dyn OutputFormatter,
) -> Result<()> {
    let account = lookup(registry, id)?;

    match registry.disconnect(&account).await {
        Ok(()) => {}
        Err(e) if e.is_network() => {
            fmt.warn(&format!("Remote sign-out failed: {}", e));
        }
        Err(e) => return Err(e).context("Failed to disconnect account"),
    }

    fmt.success(&format!(
        "Disconnected {} ({})",
        account.service_type(),
        account.email()
    ));
    Ok(())
}

async fn execute_refresh(
    registry: &AccountRegistry,
    id: &str,
    fmt: &dyn OutputFormatter,
    json: bool,
) -> Result<()> {
    let account = lookup(registry, id)?;
    let account = super::ensure_session(registry, account).await?;

    let refreshed = registry
        .refresh(&account)
        .await
        .context("Failed to refresh account")?;

    if json {
        let value = serde_json::to_value(&refreshed).context("Failed to serialize account")?;
        fmt.print_json(&value);
    } else {
        fmt.success("Account refreshed");
        for line in describe(&refreshed) {
            fmt.info(&line);
        }
    }
    Ok(())
}

fn lookup(registry: &AccountRegistry, id: &str) -> Result<CloudAccount> {
    registry
        .account(id)
        .with_context(|| format!("No connected account with id '{}'", id))
}

/// Human-readable summary lines for one account
fn describe(account: &CloudAccount) -> Vec<String> {
    let mut lines = vec![
        format!("{} - {} <{}>", account.service_type(), account.display_name(), account.email()),
        format!("Id:        {}", account.id()),
        format!(
            "Connected: {}",
            account.connected_date().format("%Y-%m-%d %H:%M")
        ),
    ];

    if let (Some(used), Some(total), Some(pct)) = (
        account.formatted_used_space(),
        account.formatted_total_space(),
        account.usage_percentage(),
    ) {
        lines.push(format!("Storage:   {} of {} used ({:.1}%)", used, total, pct * 100.0));
    }
    if let Some(last_sync) = account.last_sync_date() {
        lines.push(format!("Synced:    {}", last_sync.format("%Y-%m-%d %H:%M")));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_includes_quota_when_known() {
        let account = CloudAccount::new("acc-1", ServiceType::Dropbox, "user@example.com", "Demo User")
            .with_quota(5_234_567_890, 15_000_000_000);

        let lines = describe(&account);

        assert_eq!(lines[0], "Dropbox - Demo User <user@example.com>");
        assert!(lines.iter().any(|l| l == "Storage:   5.23 GB of 15.00 GB used (34.9%)"));
    }

    #[test]
    fn test_describe_omits_unknown_quota() {
        let account = CloudAccount::new("acc-2", ServiceType::OneDrive, "a@b.c", "A");

        let lines = describe(&account);

        assert!(!lines.iter().any(|l| l.starts_with("Storage:")));
        assert!(!lines.iter().any(|l| l.starts_with("Synced:")));
    }
}
