//! Failure injection for the mock provider

use std::fmt;

use thiserror::Error;

use cloudshelf_core::domain::CloudError;

/// Every adapter operation a failure can be scheduled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    Authenticate,
    SignOut,
    GetAccountInfo,
    ListFiles,
    DownloadFile,
    GetPreviewUrl,
    CreateFolder,
    DeleteFile,
    RenameFile,
    MoveFile,
    CopyFile,
    UploadFile,
    SearchFiles,
}

impl MockOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authenticate => "authenticate",
            Self::SignOut => "sign_out",
            Self::GetAccountInfo => "get_account_info",
            Self::ListFiles => "list_files",
            Self::DownloadFile => "download_file",
            Self::GetPreviewUrl => "get_preview_url",
            Self::CreateFolder => "create_folder",
            Self::DeleteFile => "delete_file",
            Self::RenameFile => "rename_file",
            Self::MoveFile => "move_file",
            Self::CopyFile => "copy_file",
            Self::UploadFile => "upload_file",
            Self::SearchFiles => "search_files",
        }
    }
}

impl fmt::Display for MockOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport failure reported by an injected [`MockFailure::Network`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("simulated network failure during {operation}")]
pub struct SimulatedOutage {
    pub operation: MockOperation,
}

/// A failure to return from the next call of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    Network,
    AuthenticationFailed(String),
    NotFound,
    PermissionDenied,
    QuotaExceeded,
    OperationFailed(String),
}

impl MockFailure {
    pub fn into_error(self, operation: MockOperation) -> CloudError {
        match self {
            Self::Network => CloudError::network(SimulatedOutage { operation }),
            Self::AuthenticationFailed(reason) => CloudError::AuthenticationFailed(reason),
            Self::NotFound => CloudError::FileNotFound,
            Self::PermissionDenied => CloudError::PermissionDenied,
            Self::QuotaExceeded => CloudError::QuotaExceeded,
            Self::OperationFailed(reason) => CloudError::OperationFailed(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_failure_names_operation() {
        let err = MockFailure::Network.into_error(MockOperation::UploadFile);
        assert!(err.is_network());
        assert_eq!(
            err.to_string(),
            "Network error: simulated network failure during upload_file"
        );
    }

    #[test]
    fn test_failures_map_to_taxonomy() {
        let op = MockOperation::DeleteFile;
        assert!(matches!(MockFailure::NotFound.into_error(op), CloudError::FileNotFound));
        assert!(matches!(
            MockFailure::PermissionDenied.into_error(op),
            CloudError::PermissionDenied
        ));
        assert!(matches!(
            MockFailure::OperationFailed("busy".into()).into_error(op),
            CloudError::OperationFailed(m) if m == "busy"
        ));
    }
}
