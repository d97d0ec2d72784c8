//! Adapter-level scenarios against the seeded mock namespace

use cloudshelf_core::domain::{CloudError, CloudPath, ServiceType};
use cloudshelf_core::ports::ICloudService;
use cloudshelf_mock::MockCloudService;

use crate::common::{find, names, path, signed_in};

#[tokio::test]
async fn test_seeded_root_and_documents_listing() {
    let service = signed_in(ServiceType::Dropbox).await;

    let root = service.list_files(&CloudPath::root()).await.unwrap();
    assert_eq!(names(&root), vec!["Documents", "Photos", "Resume.pdf"]);
    assert_eq!(root.iter().filter(|f| f.is_folder()).count(), 2);

    let docs = service.list_files(find(&root, "Documents").path()).await.unwrap();
    let mut doc_names = names(&docs);
    doc_names.sort_unstable();
    assert_eq!(
        doc_names,
        vec!["Contract.pdf", "Meeting Notes.txt", "Project Proposal.pdf"]
    );
}

#[tokio::test]
async fn test_upload_appears_in_listing_with_byte_size() {
    let service = signed_in(ServiceType::GoogleDrive).await;
    let data = b"quarterly numbers";

    let uploaded = service
        .upload_file(data, "new.txt", &path("/Documents"))
        .await
        .unwrap();

    let docs = service.list_files(&path("/Documents")).await.unwrap();
    let listed = find(&docs, "new.txt");
    assert_eq!(listed.id(), uploaded.id());
    assert_eq!(listed.size(), data.len() as u64);
    assert!(!listed.is_folder());
    assert_eq!(listed.path(), &path("/Documents/new.txt"));
}

#[tokio::test]
async fn test_rename_keeps_id_and_parent() {
    let service = signed_in(ServiceType::OneDrive).await;
    let docs = service.list_files(&path("/Documents")).await.unwrap();
    let original = find(&docs, "Contract.pdf").clone();

    let renamed = service.rename_file(&original, "renamed.txt").await.unwrap();

    assert_eq!(renamed.id(), original.id());
    assert_eq!(renamed.name(), "renamed.txt");
    assert_eq!(renamed.parent_path(), original.parent_path());

    let after = service.list_files(&path("/Documents")).await.unwrap();
    assert!(names(&after).contains(&"renamed.txt"));
    assert!(!names(&after).contains(&"Contract.pdf"));
}

#[tokio::test]
async fn test_rename_onto_existing_sibling_fails() {
    let service = signed_in(ServiceType::Dropbox).await;
    let docs = service.list_files(&path("/Documents")).await.unwrap();

    let err = service
        .rename_file(find(&docs, "Contract.pdf"), "Meeting Notes.txt")
        .await
        .unwrap_err();

    assert!(matches!(err, CloudError::OperationFailed(_)));
}

#[tokio::test]
async fn test_search_spans_all_folders() {
    let service = signed_in(ServiceType::Dropbox).await;

    let notes = service.search_files("notes").await.unwrap();
    assert_eq!(names(&notes.items), vec!["Meeting Notes.txt"]);
    assert!(!notes.truncated);

    let pdfs = service.search_files("PDF").await.unwrap();
    assert_eq!(
        names(&pdfs.items),
        vec!["Contract.pdf", "Project Proposal.pdf", "Resume.pdf"]
    );
}

#[tokio::test]
async fn test_move_folder_carries_children() {
    let service = signed_in(ServiceType::ICloudDrive).await;
    let archive = service
        .create_folder("Archive", &CloudPath::root())
        .await
        .unwrap();
    let root = service.list_files(&CloudPath::root()).await.unwrap();

    let moved = service
        .move_file(find(&root, "Documents"), archive.path())
        .await
        .unwrap();

    assert_eq!(moved.id(), "folder1");
    assert_eq!(moved.path(), &path("/Archive/Documents"));
    assert_eq!(service.list_files(moved.path()).await.unwrap().len(), 3);
    assert!(matches!(
        service.list_files(&path("/Documents")).await,
        Err(CloudError::FileNotFound)
    ));
}

#[tokio::test]
async fn test_move_folder_into_itself_is_rejected() {
    let service = signed_in(ServiceType::Dropbox).await;
    let root = service.list_files(&CloudPath::root()).await.unwrap();

    let err = service
        .move_file(find(&root, "Documents"), &path("/Documents"))
        .await
        .unwrap_err();

    assert!(matches!(err, CloudError::InvalidPath));
}

#[tokio::test]
async fn test_copy_gets_new_id_and_keeps_original() {
    let service = signed_in(ServiceType::Dropbox).await;
    let root = service.list_files(&CloudPath::root()).await.unwrap();
    let resume = find(&root, "Resume.pdf");

    let copy = service.copy_file(resume, &path("/Photos")).await.unwrap();

    assert_ne!(copy.id(), resume.id());
    assert_eq!(copy.size(), resume.size());
    assert_eq!(copy.path(), &path("/Photos/Resume.pdf"));
    assert!(names(&service.list_files(&CloudPath::root()).await.unwrap()).contains(&"Resume.pdf"));
}

#[tokio::test]
async fn test_delete_folder_removes_descendants() {
    let service = signed_in(ServiceType::Dropbox).await;
    let root = service.list_files(&CloudPath::root()).await.unwrap();

    service.delete_file(find(&root, "Photos")).await.unwrap();

    assert!(service.search_files("jpg").await.unwrap().is_empty());
    assert!(matches!(
        service.delete_file(find(&root, "Photos")).await,
        Err(CloudError::FileNotFound)
    ));
}

#[tokio::test]
async fn test_signed_out_calls_fail_without_side_effects() {
    let service = signed_in(ServiceType::Dropbox).await;
    let before = service.list_files(&path("/Documents")).await.unwrap();
    service.sign_out().await.unwrap();

    let err = service
        .upload_file(b"x", "ghost.txt", &path("/Documents"))
        .await
        .unwrap_err();
    assert!(matches!(err, CloudError::NotAuthenticated));

    service.authenticate().await.unwrap();
    let after = service.list_files(&path("/Documents")).await.unwrap();
    assert_eq!(names(&after), names(&before));
}

#[tokio::test]
async fn test_empty_adapter_has_empty_root() {
    let service = MockCloudService::empty(ServiceType::OneDrive);
    let account = service.authenticate().await.unwrap();

    assert!(service.list_files(&CloudPath::root()).await.unwrap().is_empty());
    assert_eq!(account.used_space(), Some(0));
}
