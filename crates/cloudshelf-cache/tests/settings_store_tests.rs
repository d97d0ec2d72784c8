//! Integration tests for SqliteSettingsStore
//!
//! Most tests use a fresh in-memory database; the persistence tests use a
//! temporary database file that is reopened.

use cloudshelf_cache::{DatabasePool, SqliteSettingsStore};
use cloudshelf_core::ports::ISettingsStore;

// ============================================================================
// Test helpers
// ============================================================================

async fn setup() -> SqliteSettingsStore {
    let pool = DatabasePool::in_memory()
        .await
        .expect("Failed to create in-memory database");
    SqliteSettingsStore::new(pool.pool().clone())
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_get_missing_key_returns_none() {
    let store = setup().await;
    assert_eq!(store.get("CloudAccounts").await.unwrap(), None);
}

#[tokio::test]
async fn test_set_then_get_returns_blob() {
    let store = setup().await;

    store.set("CloudAccounts", b"[1,2,3]").await.unwrap();

    assert_eq!(
        store.get("CloudAccounts").await.unwrap(),
        Some(b"[1,2,3]".to_vec())
    );
    assert!(store.updated_at("CloudAccounts").await.unwrap().is_some());
}

#[tokio::test]
async fn test_set_replaces_whole_value() {
    let store = setup().await;

    store.set("k", b"a much longer first value").await.unwrap();
    store.set("k", b"short").await.unwrap();

    assert_eq!(store.get("k").await.unwrap(), Some(b"short".to_vec()));
    assert_eq!(store.keys().await.unwrap(), vec!["k".to_string()]);
}

#[tokio::test]
async fn test_binary_values_round_trip_unchanged() {
    let store = setup().await;
    let blob: Vec<u8> = (0..=255).collect();

    store.set("binary", &blob).await.unwrap();

    assert_eq!(store.get("binary").await.unwrap(), Some(blob));
}

#[tokio::test]
async fn test_remove_deletes_and_is_idempotent() {
    let store = setup().await;
    store.set("a", b"1").await.unwrap();
    store.set("b", b"2").await.unwrap();

    store.remove("a").await.unwrap();
    store.remove("a").await.unwrap();

    assert_eq!(store.get("a").await.unwrap(), None);
    assert_eq!(store.keys().await.unwrap(), vec!["b".to_string()]);
}

#[tokio::test]
async fn test_values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.db");

    {
        let store = SqliteSettingsStore::open(&path).await.unwrap();
        store.set("CloudAccounts", b"persisted").await.unwrap();
    }

    let reopened = SqliteSettingsStore::open(&path).await.unwrap();
    assert_eq!(
        reopened.get("CloudAccounts").await.unwrap(),
        Some(b"persisted".to_vec())
    );
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.db");

    DatabasePool::new(&path).await.unwrap();
    DatabasePool::new(&path).await.unwrap();
}
