//! Demo content every seeded mock account starts with

use chrono::{Duration, Utc};

use cloudshelf_core::domain::{CloudFile, CloudPath, DomainError, ServiceType};

use crate::tree::MockTree;

/// Quota reported by every mock account
pub const TOTAL_SPACE: u64 = 15_000_000_000;

/// Usage reported by a freshly seeded account
pub const SEEDED_USED_SPACE: u64 = 5_234_567_890;

/// Host the seeded download and thumbnail links point at; never resolved
const LINK_BASE: &str = "https://mock.cloudshelf.invalid";

struct SeedEntry {
    id: &'static str,
    parent: &'static str,
    name: &'static str,
    /// `None` for folders
    size: Option<u64>,
    mime_type: Option<&'static str>,
    age_days: i64,
}

const SEED: &[SeedEntry] = &[
    SeedEntry { id: "folder1", parent: "", name: "Documents", size: None, mime_type: None, age_days: 30 },
    SeedEntry { id: "folder2", parent: "", name: "Photos", size: None, mime_type: None, age_days: 15 },
    SeedEntry { id: "file1", parent: "", name: "Resume.pdf", size: Some(245_000), mime_type: Some("application/pdf"), age_days: 7 },
    SeedEntry { id: "doc1", parent: "/Documents", name: "Project Proposal.pdf", size: Some(1_245_000), mime_type: Some("application/pdf"), age_days: 5 },
    SeedEntry { id: "doc2", parent: "/Documents", name: "Meeting Notes.txt", size: Some(12_400), mime_type: Some("text/plain"), age_days: 2 },
    SeedEntry { id: "doc3", parent: "/Documents", name: "Contract.pdf", size: Some(856_000), mime_type: Some("application/pdf"), age_days: 10 },
    SeedEntry { id: "photo1", parent: "/Photos", name: "Vacation.jpg", size: Some(2_456_000), mime_type: Some("image/jpeg"), age_days: 20 },
    SeedEntry { id: "photo2", parent: "/Photos", name: "Family.png", size: Some(3_245_000), mime_type: Some("image/png"), age_days: 25 },
];

pub(crate) fn seeded_tree(service_type: ServiceType) -> Result<MockTree, DomainError> {
    let now = Utc::now();
    let mut tree = MockTree::default();

    for entry in SEED {
        let parent = CloudPath::new(entry.parent)?;
        let file = match entry.size {
            Some(size) => CloudFile::new_file(entry.id, &parent, entry.name, size, service_type)?,
            None => CloudFile::new_folder(entry.id, &parent, entry.name, service_type)?,
        };
        let file = file.with_modified_date(now - Duration::days(entry.age_days));
        let file = match entry.mime_type {
            Some(mime) => file.with_mime_type(mime),
            None => file,
        };
        let file = if file.is_folder() {
            file
        } else {
            file.with_download_url(format!("{LINK_BASE}/download/{}", entry.id))
        };
        let file = if file.is_image() {
            file.with_thumbnail_url(format!("{LINK_BASE}/thumbnail/{}", entry.id))
        } else {
            file
        };
        tree.seed(file);
    }

    Ok(tree)
}

/// Placeholder bytes served for seeded files that were never uploaded
pub(crate) fn placeholder_content(file: &CloudFile) -> Vec<u8> {
    let text = if file.is_pdf() {
        format!("Mock PDF content for {}", file.name())
    } else if file.is_image() {
        format!("Mock image data for {}", file.name())
    } else {
        format!("Mock file content for {}", file.name())
    };
    text.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_layout() {
        let tree = seeded_tree(ServiceType::OneDrive).unwrap();
        let root: Vec<String> = tree
            .children(&CloudPath::root())
            .unwrap()
            .iter()
            .map(|f| f.name().to_string())
            .collect();

        assert_eq!(tree.len(), 8);
        assert_eq!(root, vec!["Documents", "Photos", "Resume.pdf"]);
        assert_eq!(tree.children(&CloudPath::new("/Documents").unwrap()).unwrap().len(), 3);
        assert_eq!(tree.children(&CloudPath::new("/Photos").unwrap()).unwrap().len(), 2);
    }

    #[test]
    fn test_seed_metadata() {
        let tree = seeded_tree(ServiceType::Dropbox).unwrap();
        let photos = tree.children(&CloudPath::new("/Photos").unwrap()).unwrap();
        let vacation = photos.iter().find(|f| f.id() == "photo1").unwrap();

        assert_eq!(vacation.size(), 2_456_000);
        assert_eq!(vacation.mime_type(), Some("image/jpeg"));
        assert_eq!(vacation.service_type(), ServiceType::Dropbox);
        assert!((Utc::now() - vacation.modified_date()).num_days() >= 19);
    }

    #[test]
    fn test_seed_links() {
        let tree = seeded_tree(ServiceType::ICloudDrive).unwrap();
        let root = tree.children(&CloudPath::root()).unwrap();
        let photos = tree.children(&CloudPath::new("/Photos").unwrap()).unwrap();

        let documents = root.iter().find(|f| f.id() == "folder1").unwrap();
        assert_eq!(documents.download_url(), None);

        let resume = root.iter().find(|f| f.id() == "file1").unwrap();
        assert_eq!(resume.download_url(), Some("https://mock.cloudshelf.invalid/download/file1"));
        assert_eq!(resume.thumbnail_url(), None);

        let family = photos.iter().find(|f| f.id() == "photo2").unwrap();
        assert_eq!(family.thumbnail_url(), Some("https://mock.cloudshelf.invalid/thumbnail/photo2"));
    }

    #[test]
    fn test_placeholder_content_by_kind() {
        let root = CloudPath::root();
        let pdf = CloudFile::new_file("1", &root, "a.pdf", 1, ServiceType::Dropbox).unwrap();
        let img = CloudFile::new_file("2", &root, "b.PNG", 1, ServiceType::Dropbox).unwrap();
        let txt = CloudFile::new_file("3", &root, "c.txt", 1, ServiceType::Dropbox).unwrap();

        assert_eq!(placeholder_content(&pdf), b"Mock PDF content for a.pdf");
        assert_eq!(placeholder_content(&img), b"Mock image data for b.PNG");
        assert_eq!(placeholder_content(&txt), b"Mock file content for c.txt");
    }
}
