//! Use cases
//!
//! Application logic built on top of the ports: the account registry that
//! owns connected accounts, and the per-window file browser.

pub mod account_registry;
pub mod file_browser;
pub mod navigation;

pub use account_registry::{
    decode_accounts, encode_accounts, AccountRegistry, RegistryEvent, ServiceSet,
};
pub use file_browser::{BrowserState, BrowserStatus, FileBrowser, PreviewContent, SearchState};
pub use navigation::NavigationHistory;
