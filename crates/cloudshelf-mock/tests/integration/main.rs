//! Integration tests for cloudshelf-mock
//!
//! Drives the mock provider directly and through the account registry and
//! file browser, with account persistence in a real SQLite settings store.

mod common;

mod test_accounts;
mod test_browsing;
mod test_file_operations;
