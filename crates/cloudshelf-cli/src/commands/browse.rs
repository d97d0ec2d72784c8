//! Browse command - interactive file browser shell
//!
//! `cloudshelf browse <service>` connects to the provider, then reads one
//! command per line from stdin and drives a `FileBrowser` with it. Names
//! containing spaces can be quoted: `cd "Meeting Notes"`.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use cloudshelf_core::domain::{CloudFile, CloudPath, ServiceType};
use cloudshelf_core::usecases::{BrowserState, FileBrowser};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use super::AppContext;
use crate::output::OutputFormatter;

const HELP: &[&str] = &[
    "ls                      List the current folder (or search results)",
    "cd <folder>             Open a folder in the current listing (cd .. goes back)",
    "back                    Return to the previous folder",
    "pwd                     Show the current folder",
    "mkdir <name>            Create a folder",
    "put <local-file> [name] Upload a local file",
    "rm <name>               Delete a file or folder",
    "mv <name> <folder>      Move into another folder (\"/\" is the root)",
    "cp <name> <folder>      Copy into another folder",
    "rename <name> <new>     Rename a file or folder",
    "preview <name>          Show the content of a previewable file",
    "search <query>          Search the whole account",
    "clear                   Leave search results",
    "help                    Show this help",
    "quit                    Leave the browser",
];

/// Arguments for the browse subcommand
#[derive(Debug, clap::Args)]
pub struct BrowseCommand {
    /// Storage provider to browse (dropbox, google-drive, onedrive, icloud)
    pub service: ServiceType,
}

impl BrowseCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let fmt = ctx.formatter();
        let registry = ctx.open_registry().await?;

        let account = registry
            .connect(self.service)
            .await
            .with_context(|| format!("Failed to connect {}", self.service))?;
        fmt.success(&format!(
            "Browsing {} as {}",
            account.service_type(),
            account.email()
        ));

        let browser = FileBrowser::new(
            Arc::clone(&registry),
            ctx.config.browser.clone(),
            ctx.config.timeouts.clone(),
        );
        let state = browser.set_account(account).await;
        report(&browser, &state, &*fmt, true);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            if !ctx.is_json() {
                print!("{}> ", browser.state().display_path());
                std::io::stdout().flush().context("Failed to write prompt")?;
            }

            let Some(line) = lines.next_line().await.context("Failed to read command")? else {
                break;
            };

            let command = match ShellCommand::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(message) => {
                    fmt.error(&message);
                    continue;
                }
            };
            debug!(?command, "Shell command");

            if command == ShellCommand::Quit {
                break;
            }
            run(&browser, command, &*fmt).await;
        }

        info!("Browser closed");
        Ok(())
    }
}

// ============================================================================
// Shell commands
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    List,
    Cd(String),
    Back,
    Pwd,
    Mkdir(String),
    Put { local: PathBuf, name: Option<String> },
    Rm(String),
    Mv { name: String, destination: CloudPath },
    Cp { name: String, destination: CloudPath },
    Rename { name: String, new_name: String },
    Preview(String),
    Search(String),
    Clear,
    Help,
    Quit,
}

impl ShellCommand {
    /// Parses one input line; `Ok(None)` for a blank line
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let args = split_args(line)?;
        let Some((verb, rest)) = args.split_first() else {
            return Ok(None);
        };

        let command = match (verb.as_str(), rest) {
            ("ls", []) => Self::List,
            ("cd", [dir]) if dir == ".." => Self::Back,
            ("cd", [dir]) => Self::Cd(dir.clone()),
            ("back", []) => Self::Back,
            ("pwd", []) => Self::Pwd,
            ("mkdir", [name]) => Self::Mkdir(name.clone()),
            ("put", [local]) => Self::Put {
                local: PathBuf::from(local),
                name: None,
            },
            ("put", [local, name]) => Self::Put {
                local: PathBuf::from(local),
                name: Some(name.clone()),
            },
            ("rm", [name]) => Self::Rm(name.clone()),
            ("mv", [name, dest]) => Self::Mv {
                name: name.clone(),
                destination: parse_destination(dest)?,
            },
            ("cp", [name, dest]) => Self::Cp {
                name: name.clone(),
                destination: parse_destination(dest)?,
            },
            ("rename", [name, new_name]) => Self::Rename {
                name: name.clone(),
                new_name: new_name.clone(),
            },
            ("preview", [name]) => Self::Preview(name.clone()),
            ("search", query) if !query.is_empty() => Self::Search(query.join(" ")),
            ("clear", []) => Self::Clear,
            ("help", []) | ("?", []) => Self::Help,
            ("quit", []) | ("exit", []) => Self::Quit,
            (verb, _) if HELP.iter().any(|h| h.split_whitespace().next() == Some(verb)) => {
                return Err(format!("Wrong arguments for '{}'. Type 'help' for usage.", verb));
            }
            (verb, _) => return Err(format!("Unknown command '{}'. Type 'help'.", verb)),
        };
        Ok(Some(command))
    }
}

/// Splits on whitespace, keeping double-quoted runs together
fn split_args(line: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err("Unterminated quote".to_string());
    }
    if has_token {
        args.push(current);
    }
    Ok(args)
}

fn parse_destination(raw: &str) -> Result<CloudPath, String> {
    if raw == "/" {
        return Ok(CloudPath::root());
    }
    CloudPath::new(raw).map_err(|e| format!("Invalid destination '{}': {}", raw, e))
}

// ============================================================================
// Execution
// ============================================================================

async fn run(browser: &FileBrowser, command: ShellCommand, fmt: &dyn OutputFormatter) {
    let state = browser.state();

    let result = match command {
        ShellCommand::List => state,
        ShellCommand::Pwd => {
            fmt.info(&state.current_path.to_string());
            return;
        }
        ShellCommand::Help => {
            for line in HELP {
                fmt.info(line);
            }
            return;
        }
        ShellCommand::Cd(name) => match lookup(&state, &name, fmt) {
            Some(file) if file.is_folder() => browser.navigate_to_folder(&file).await,
            Some(_) => {
                fmt.error(&format!("'{}' is not a folder", name));
                return;
            }
            None => return,
        },
        ShellCommand::Back => {
            if !state.can_go_back() {
                fmt.warn("Already at the top folder");
                return;
            }
            browser.navigate_back().await
        }
        ShellCommand::Mkdir(name) => browser.create_folder(&name).await,
        ShellCommand::Put { local, name } => {
            let name = match name.or_else(|| local_file_name(&local)) {
                Some(name) => name,
                None => {
                    fmt.error(&format!("Cannot derive a name from {}", local.display()));
                    return;
                }
            };
            match tokio::fs::read(&local).await {
                Ok(data) => browser.upload_file(data, &name).await,
                Err(e) => {
                    fmt.error(&format!("Failed to read {}: {}", local.display(), e));
                    return;
                }
            }
        }
        ShellCommand::Rm(name) => match lookup(&state, &name, fmt) {
            Some(file) => browser.delete_file(&file).await,
            None => return,
        },
        ShellCommand::Mv { name, destination } => match lookup(&state, &name, fmt) {
            Some(file) => browser.move_file(&file, &destination).await,
            None => return,
        },
        ShellCommand::Cp { name, destination } => match lookup(&state, &name, fmt) {
            Some(file) => browser.copy_file(&file, &destination).await,
            None => return,
        },
        ShellCommand::Rename { name, new_name } => match lookup(&state, &name, fmt) {
            Some(file) => browser.rename_file(&file, &new_name).await,
            None => return,
        },
        ShellCommand::Preview(name) => match lookup(&state, &name, fmt) {
            Some(file) if !file.can_preview() => {
                fmt.warn(&format!("'{}' cannot be previewed", name));
                return;
            }
            Some(file) => {
                let state = browser.load_preview(&file).await;
                show_preview(&state, fmt);
                browser.close_preview();
                report(browser, &state, fmt, false);
                return;
            }
            None => return,
        },
        ShellCommand::Search(query) => browser.search(&query).await,
        ShellCommand::Clear => browser.clear_search(),
        ShellCommand::Quit => return,
    };

    report(browser, &result, fmt, true);
}

/// Finds `name` among the entries currently shown
fn lookup(state: &BrowserState, name: &str, fmt: &dyn OutputFormatter) -> Option<CloudFile> {
    let found = state
        .visible_files()
        .iter()
        .find(|f| f.name() == name)
        .cloned();
    if found.is_none() {
        fmt.error(&format!("No entry named '{}' here", name));
    }
    found
}

fn local_file_name(local: &std::path::Path) -> Option<String> {
    local
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}

/// Prints the error if one is showing, then the listing when asked
fn report(browser: &FileBrowser, state: &BrowserState, fmt: &dyn OutputFormatter, listing: bool) {
    if let Some(message) = state.error.as_deref() {
        fmt.error(message);
        browser.dismiss_error();
        return;
    }
    if !listing {
        return;
    }

    if state.search.is_active() {
        let mut header = format!(
            "{} result{} for \"{}\"",
            state.search.results.len(),
            if state.search.results.len() == 1 { "" } else { "s" },
            state.search.query
        );
        if state.search.truncated {
            header.push_str(" (more available, refine the query)");
        }
        fmt.info(&header);
    } else {
        fmt.info(&state.display_path());
    }
    fmt.print_files(state.visible_files());
}

fn show_preview(state: &BrowserState, fmt: &dyn OutputFormatter) {
    let Some(preview) = state.preview.as_ref() else {
        return;
    };

    fmt.success(&format!(
        "{} ({})",
        preview.file.name(),
        preview.file.formatted_size()
    ));
    match std::str::from_utf8(&preview.data) {
        Ok(text) => {
            for line in text.lines() {
                fmt.info(line);
            }
        }
        Err(_) => fmt.info(&format!("{} bytes of binary content", preview.data.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> ShellCommand {
        ShellCommand::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_split_args_keeps_quoted_names() {
        assert_eq!(
            split_args(r#"rename "Meeting Notes.txt"  notes.txt"#).unwrap(),
            vec!["rename", "Meeting Notes.txt", "notes.txt"]
        );
        assert_eq!(split_args(r#"mkdir """#).unwrap(), vec!["mkdir", ""]);
        assert!(split_args(r#"cd "Documents"#).is_err());
    }

    #[test]
    fn test_blank_line_is_no_command() {
        assert_eq!(ShellCommand::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_navigation() {
        assert_eq!(parse("ls"), ShellCommand::List);
        assert_eq!(parse("cd Documents"), ShellCommand::Cd("Documents".into()));
        assert_eq!(parse("cd .."), ShellCommand::Back);
        assert_eq!(parse("exit"), ShellCommand::Quit);
    }

    #[test]
    fn test_parse_destinations() {
        assert_eq!(
            parse("mv Resume.pdf /"),
            ShellCommand::Mv {
                name: "Resume.pdf".into(),
                destination: CloudPath::root(),
            }
        );
        assert_eq!(
            parse("cp Resume.pdf /Documents"),
            ShellCommand::Cp {
                name: "Resume.pdf".into(),
                destination: CloudPath::new("/Documents").unwrap(),
            }
        );
        assert!(ShellCommand::parse("mv a.txt Documents").is_err());
    }

    #[test]
    fn test_parse_put_with_and_without_name() {
        assert_eq!(
            parse("put /tmp/report.txt"),
            ShellCommand::Put {
                local: PathBuf::from("/tmp/report.txt"),
                name: None,
            }
        );
        assert_eq!(
            parse("put /tmp/report.txt q3.txt"),
            ShellCommand::Put {
                local: PathBuf::from("/tmp/report.txt"),
                name: Some("q3.txt".into()),
            }
        );
    }

    #[test]
    fn test_search_joins_words() {
        assert_eq!(parse("search meeting notes"), ShellCommand::Search("meeting notes".into()));
    }

    #[test]
    fn test_wrong_arity_and_unknown_verbs() {
        let err = ShellCommand::parse("rename only-one").unwrap_err();
        assert!(err.starts_with("Wrong arguments for 'rename'"));

        let err = ShellCommand::parse("frobnicate").unwrap_err();
        assert!(err.starts_with("Unknown command"));
    }
}
