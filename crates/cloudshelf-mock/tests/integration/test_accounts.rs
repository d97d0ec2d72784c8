//! Account registry scenarios with SQLite-backed persistence

use std::sync::Arc;

use cloudshelf_core::domain::{CloudError, CloudPath, ServiceType};
use cloudshelf_core::ports::ICloudService;
use cloudshelf_mock::seed::SEEDED_USED_SPACE;
use cloudshelf_mock::{MockFailure, MockOperation};

use crate::common::{file_store, harness, harness_with_store};

#[tokio::test]
async fn test_reconnecting_same_email_keeps_one_account() {
    let h = harness().await;

    let first = h.registry.connect(ServiceType::Dropbox).await.unwrap();
    let second = h.registry.connect(ServiceType::Dropbox).await.unwrap();

    let accounts = h.registry.accounts();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].id(), second.id());
    assert_ne!(first.id(), second.id());
    assert_eq!(accounts[0].email(), "user@example.com");
}

#[tokio::test]
async fn test_each_provider_gets_its_own_account() {
    let h = harness().await;

    for service in ServiceType::ALL {
        h.registry.connect(service).await.unwrap();
    }

    let services: Vec<ServiceType> = h
        .registry
        .accounts()
        .iter()
        .map(|a| a.service_type())
        .collect();
    assert_eq!(services, ServiceType::ALL.to_vec());
}

#[tokio::test]
async fn test_accounts_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("settings.db");

    let connected = {
        let h = harness_with_store(file_store(&db).await).await;
        let a = h.registry.connect(ServiceType::GoogleDrive).await.unwrap();
        let b = h.registry.connect(ServiceType::OneDrive).await.unwrap();
        vec![a, b]
    };

    let restarted = harness_with_store(file_store(&db).await).await;
    let loaded = restarted.registry.accounts();

    assert_eq!(loaded, connected);
    assert_eq!(loaded[0].used_space(), Some(SEEDED_USED_SPACE));
}

#[tokio::test]
async fn test_disconnect_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("settings.db");

    {
        let h = harness_with_store(file_store(&db).await).await;
        let account = h.registry.connect(ServiceType::Dropbox).await.unwrap();
        h.registry.connect(ServiceType::OneDrive).await.unwrap();
        h.registry.disconnect(&account).await.unwrap();
    }

    let restarted = harness_with_store(file_store(&db).await).await;
    let accounts = restarted.registry.accounts();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].service_type(), ServiceType::OneDrive);
}

#[tokio::test]
async fn test_refresh_reflects_new_usage() {
    let h = harness().await;
    let account = h.registry.connect(ServiceType::Dropbox).await.unwrap();

    h.service(ServiceType::Dropbox)
        .upload_file(&[7; 1000], "blob.bin", &CloudPath::root())
        .await
        .unwrap();
    let refreshed = h.registry.refresh(&account).await.unwrap();

    assert_eq!(refreshed.id(), account.id());
    assert_eq!(refreshed.used_space(), Some(SEEDED_USED_SPACE + 1000));
    assert_eq!(
        h.registry.account(account.id()).unwrap().used_space(),
        Some(SEEDED_USED_SPACE + 1000)
    );
}

#[tokio::test]
async fn test_failed_authentication_stores_nothing() {
    let h = harness().await;
    h.service(ServiceType::Dropbox)
        .fail_next(
            MockOperation::Authenticate,
            MockFailure::AuthenticationFailed("consent denied".into()),
        )
        .await;

    let err = h.registry.connect(ServiceType::Dropbox).await.unwrap_err();

    assert!(matches!(err, CloudError::AuthenticationFailed(reason) if reason == "consent denied"));
    assert!(h.registry.accounts().is_empty());
    assert!(!h.service(ServiceType::Dropbox).is_authenticated());
}

#[tokio::test]
async fn test_remote_sign_out_failure_still_disconnects() {
    let h = harness().await;
    let account = h.registry.connect(ServiceType::OneDrive).await.unwrap();
    h.service(ServiceType::OneDrive)
        .fail_next(MockOperation::SignOut, MockFailure::Network)
        .await;

    let err = h.registry.disconnect(&account).await.unwrap_err();

    assert!(err.is_network());
    assert!(h.registry.accounts().is_empty());
    assert!(!h.service(ServiceType::OneDrive).is_authenticated());
}

#[tokio::test]
async fn test_adapter_lookup_routes_by_service() {
    let h = harness().await;
    let account = h.registry.connect(ServiceType::ICloudDrive).await.unwrap();

    let adapter = Arc::clone(h.registry.adapter_for(&account));

    assert_eq!(adapter.service_type(), ServiceType::ICloudDrive);
    assert!(adapter.is_authenticated());
    assert!(!h
        .registry
        .adapter_for_type(ServiceType::Dropbox)
        .is_authenticated());
}
