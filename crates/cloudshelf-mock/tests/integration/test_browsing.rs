//! File browser scenarios over the mock provider

use cloudshelf_core::domain::{CloudPath, ServiceType};
use cloudshelf_core::usecases::BrowserStatus;
use cloudshelf_mock::{MockFailure, MockOperation};

use crate::common::{find, harness, names, path};

#[tokio::test]
async fn test_navigate_into_documents_and_back() {
    let h = harness().await;
    let account = h.registry.connect(ServiceType::Dropbox).await.unwrap();
    let browser = h.browser();

    let root = browser.set_account(account).await;
    assert_eq!(names(&root.files), vec!["Documents", "Photos", "Resume.pdf"]);
    assert_eq!(root.status(), BrowserStatus::Idle(CloudPath::root()));

    let docs = browser
        .navigate_to_folder(find(&root.files, "Documents"))
        .await;
    assert_eq!(docs.current_path, path("/Documents"));
    assert_eq!(
        names(&docs.files),
        vec!["Contract.pdf", "Meeting Notes.txt", "Project Proposal.pdf"]
    );

    let back = browser.navigate_back().await;
    assert!(back.current_path.is_root());
    assert_eq!(back.files, root.files);
    assert!(!back.can_go_back());
}

#[tokio::test]
async fn test_upload_through_browser_reloads_directory() {
    let h = harness().await;
    let account = h.registry.connect(ServiceType::OneDrive).await.unwrap();
    let browser = h.browser();
    let root = browser.set_account(account).await;
    browser
        .navigate_to_folder(find(&root.files, "Documents"))
        .await;

    let state = browser.upload_file(b"draft".to_vec(), "new.txt").await;

    let uploaded = find(&state.files, "new.txt");
    assert_eq!(uploaded.size(), 5);
    assert_eq!(uploaded.parent_path(), path("/Documents"));
    assert!(!state.is_loading());
}

#[tokio::test]
async fn test_collision_surfaces_error_and_keeps_listing() {
    let h = harness().await;
    let account = h.registry.connect(ServiceType::Dropbox).await.unwrap();
    let browser = h.browser();
    let before = browser.set_account(account).await;

    let state = browser.create_folder("Photos").await;

    assert_eq!(state.files, before.files);
    assert!(state.error.unwrap().starts_with("Operation failed"));
}

#[tokio::test]
async fn test_injected_network_failure_recovers_on_retry() {
    let h = harness().await;
    let account = h.registry.connect(ServiceType::GoogleDrive).await.unwrap();
    let browser = h.browser();
    browser.set_account(account).await;
    h.service(ServiceType::GoogleDrive)
        .fail_next(MockOperation::ListFiles, MockFailure::Network)
        .await;

    let failed = browser.refresh().await;
    assert!(failed.files.is_empty());
    assert!(matches!(failed.status(), BrowserStatus::Error { .. }));
    assert!(failed.error.unwrap().starts_with("Network error"));

    let retried = browser.refresh().await;
    assert_eq!(retried.files.len(), 3);
    assert!(!retried.show_error());
}

#[tokio::test]
async fn test_preview_only_loads_previewable_files() {
    let h = harness().await;
    let account = h.registry.connect(ServiceType::Dropbox).await.unwrap();
    let browser = h.browser();
    let root = browser.set_account(account).await;

    let state = browser.load_preview(find(&root.files, "Resume.pdf")).await;
    let preview = state.preview.unwrap();
    assert_eq!(preview.data, b"Mock PDF content for Resume.pdf");

    browser.close_preview();
    let docs = browser
        .navigate_to_folder(find(&root.files, "Documents"))
        .await;
    let state = browser
        .load_preview(find(&docs.files, "Meeting Notes.txt"))
        .await;
    assert!(state.preview.is_none());
    assert!(!state.show_error());
}

#[tokio::test]
async fn test_search_from_subfolder_covers_whole_account() {
    let h = harness().await;
    let account = h.registry.connect(ServiceType::Dropbox).await.unwrap();
    let browser = h.browser();
    let root = browser.set_account(account).await;
    browser
        .navigate_to_folder(find(&root.files, "Photos"))
        .await;

    let state = browser.search("notes").await;

    assert_eq!(names(state.visible_files()), vec!["Meeting Notes.txt"]);
    assert_eq!(state.current_path, path("/Photos"));

    let cleared = browser.clear_search();
    assert_eq!(
        names(cleared.visible_files()),
        vec!["Family.png", "Vacation.jpg"]
    );
}

#[tokio::test]
async fn test_disconnected_account_reports_not_authenticated() {
    let h = harness().await;
    let account = h.registry.connect(ServiceType::ICloudDrive).await.unwrap();
    let browser = h.browser();
    browser.set_account(account.clone()).await;

    h.registry.disconnect(&account).await.unwrap();
    let state = browser.refresh().await;

    assert!(state.files.is_empty());
    assert_eq!(state.error.as_deref(), Some("Not authenticated. Please sign in."));
}
