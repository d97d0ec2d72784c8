//! CloudFile domain entity
//!
//! A CloudFile is an immutable snapshot of one file or folder inside one
//! provider's namespace. State changes (rename, move, copy) never mutate a
//! value in place; they produce a new value instead.

use std::hash::{Hash, Hasher};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    errors::DomainError,
    format::format_bytes,
    newtypes::{validate_name, CloudPath},
    service_type::ServiceType,
};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "heic", "webp"];
const DOCUMENT_EXTENSIONS: &[&str] = &["doc", "docx", "txt", "rtf", "pages"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "m4v"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "aac", "m4a", "flac"];

/// Classification of an entry, derived purely from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Folder,
    Image,
    Pdf,
    Document,
    Video,
    Audio,
    Other,
}

impl FileKind {
    /// Symbol name used by graphical front ends
    pub fn icon_name(&self) -> &'static str {
        match self {
            FileKind::Folder => "folder.fill",
            FileKind::Image => "photo.fill",
            FileKind::Pdf => "doc.fill",
            FileKind::Document => "doc.text.fill",
            FileKind::Video => "video.fill",
            FileKind::Audio => "music.note",
            FileKind::Other => "doc",
        }
    }
}

/// Represents a file or folder in cloud storage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudFile {
    id: String,
    name: String,
    path: CloudPath,
    size: u64,
    modified_date: DateTime<Utc>,
    service_type: ServiceType,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    download_url: Option<String>,
    is_folder: bool,
}

impl CloudFile {
    /// Creates a file entry named `name` inside `parent`
    ///
    /// # Errors
    /// Returns `DomainError::InvalidName` if `name` is not a valid entry name
    pub fn new_file(
        id: impl Into<String>,
        parent: &CloudPath,
        name: &str,
        size: u64,
        service_type: ServiceType,
    ) -> Result<Self, DomainError> {
        Self::build(id.into(), parent, name, size, service_type, false)
    }

    /// Creates a folder entry named `name` inside `parent`
    ///
    /// # Errors
    /// Returns `DomainError::InvalidName` if `name` is not a valid entry name
    pub fn new_folder(
        id: impl Into<String>,
        parent: &CloudPath,
        name: &str,
        service_type: ServiceType,
    ) -> Result<Self, DomainError> {
        Self::build(id.into(), parent, name, 0, service_type, true)
    }

    fn build(
        id: String,
        parent: &CloudPath,
        name: &str,
        size: u64,
        service_type: ServiceType,
        is_folder: bool,
    ) -> Result<Self, DomainError> {
        validate_name(name)?;
        Ok(Self {
            id,
            name: name.to_string(),
            path: parent.join(name)?,
            size: if is_folder { 0 } else { size },
            modified_date: Utc::now(),
            service_type,
            mime_type: None,
            thumbnail_url: None,
            download_url: None,
            is_folder,
        })
    }

    /// Sets the modification timestamp
    #[must_use]
    pub fn with_modified_date(mut self, modified: DateTime<Utc>) -> Self {
        self.modified_date = modified;
        self
    }

    /// Sets the MIME type
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Sets the thumbnail URL
    #[must_use]
    pub fn with_thumbnail_url(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    /// Sets the direct download URL
    #[must_use]
    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }

    // --- Getters ---

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &CloudPath {
        &self.path
    }

    /// Size in bytes (always 0 for folders)
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn modified_date(&self) -> DateTime<Utc> {
        self.modified_date
    }

    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }

    pub fn download_url(&self) -> Option<&str> {
        self.download_url.as_deref()
    }

    pub fn is_folder(&self) -> bool {
        self.is_folder
    }

    /// Path of the folder containing this entry
    pub fn parent_path(&self) -> CloudPath {
        self.path.parent().unwrap_or_default()
    }

    // --- Classification ---

    /// Lowercase extension of the name, empty if there is none
    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default()
    }

    /// Classification by extension (folders are always [`FileKind::Folder`])
    pub fn kind(&self) -> FileKind {
        if self.is_folder {
            return FileKind::Folder;
        }
        let ext = self.extension();
        let ext = ext.as_str();
        if IMAGE_EXTENSIONS.contains(&ext) {
            FileKind::Image
        } else if ext == "pdf" {
            FileKind::Pdf
        } else if DOCUMENT_EXTENSIONS.contains(&ext) {
            FileKind::Document
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            FileKind::Video
        } else if AUDIO_EXTENSIONS.contains(&ext) {
            FileKind::Audio
        } else {
            FileKind::Other
        }
    }

    pub fn is_image(&self) -> bool {
        IMAGE_EXTENSIONS.contains(&self.extension().as_str())
    }

    pub fn is_pdf(&self) -> bool {
        self.extension() == "pdf"
    }

    pub fn is_document(&self) -> bool {
        DOCUMENT_EXTENSIONS.contains(&self.extension().as_str())
    }

    pub fn is_video(&self) -> bool {
        VIDEO_EXTENSIONS.contains(&self.extension().as_str())
    }

    pub fn is_audio(&self) -> bool {
        AUDIO_EXTENSIONS.contains(&self.extension().as_str())
    }

    /// True if the file can be shown inline (images and PDFs)
    pub fn can_preview(&self) -> bool {
        self.is_image() || self.is_pdf()
    }

    pub fn icon_name(&self) -> &'static str {
        self.kind().icon_name()
    }

    pub fn formatted_size(&self) -> String {
        format_bytes(self.size)
    }

    // --- Value transforms ---

    /// Returns this entry under a new name in the same folder, keeping its id
    ///
    /// # Errors
    /// Returns `DomainError::InvalidName` if `new_name` is not valid
    pub fn renamed(&self, new_name: &str) -> Result<Self, DomainError> {
        validate_name(new_name)?;
        Ok(Self {
            name: new_name.to_string(),
            path: self.parent_path().join(new_name)?,
            modified_date: Utc::now(),
            ..self.clone()
        })
    }

    /// Returns this entry relocated under `destination`, keeping its id
    ///
    /// # Errors
    /// Returns `DomainError::InvalidName` if the current name cannot be joined
    pub fn moved_to(&self, destination: &CloudPath) -> Result<Self, DomainError> {
        Ok(Self {
            path: destination.join(&self.name)?,
            modified_date: Utc::now(),
            ..self.clone()
        })
    }

    /// Returns a duplicate of this entry under `destination` with a new id
    ///
    /// # Errors
    /// Returns `DomainError::InvalidName` if the current name cannot be joined
    pub fn copied_to(
        &self,
        destination: &CloudPath,
        new_id: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id: new_id.into(),
            path: destination.join(&self.name)?,
            modified_date: Utc::now(),
            ..self.clone()
        })
    }

    /// Returns this entry with its path re-rooted from `from` to `to`
    ///
    /// Used when an ancestor folder is renamed or moved. Returns `None` when
    /// `from` is not an ancestor of (or equal to) this entry's path.
    pub fn rebased(&self, from: &CloudPath, to: &CloudPath) -> Option<Self> {
        let path = self.path.rebase(from, to)?;
        Some(Self {
            path,
            ..self.clone()
        })
    }

    /// Returns this entry with a different id (used when duplicating trees)
    #[must_use]
    pub fn with_id(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..self.clone()
        }
    }
}

impl PartialEq for CloudFile {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.service_type == other.service_type
    }
}

impl Eq for CloudFile {}

impl Hash for CloudFile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.service_type.hash(state);
    }
}
