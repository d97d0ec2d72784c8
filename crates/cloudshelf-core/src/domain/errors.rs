//! Domain error types
//!
//! This module defines two error families:
//! - [`DomainError`] for validation failures when constructing domain values
//! - [`CloudError`] the taxonomy every provider operation reports through

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when constructing or validating domain values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid path format or content
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Invalid file or folder name
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Unknown cloud service identifier
    #[error("Unknown service type: {0}")]
    UnknownServiceType(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

/// Errors surfaced by cloud storage providers
///
/// Every operation of [`crate::ports::ICloudService`] fails with exactly one
/// of these kinds. Adapters never report partial success. The `Display`
/// output is the human-readable message shown to the user.
#[derive(Debug, Error)]
pub enum CloudError {
    /// Operation attempted without a valid session
    #[error("Not authenticated. Please sign in.")]
    NotAuthenticated,

    /// The authentication flow itself failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Transport-level failure (including timeouts)
    #[error("Network error: {0}")]
    NetworkError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Target file or folder does not exist
    #[error("File or folder not found.")]
    FileNotFound,

    /// The provider rejected the operation for authorization reasons
    #[error("Permission denied.")]
    PermissionDenied,

    /// Provider-specific business-rule rejection (e.g. a name collision)
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    /// Malformed path or name argument
    #[error("Invalid file path.")]
    InvalidPath,

    /// A write would exceed the storage quota
    #[error("Storage quota exceeded.")]
    QuotaExceeded,
}

impl CloudError {
    /// Wraps any transport error as a [`CloudError::NetworkError`]
    pub fn network<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CloudError::NetworkError(Box::new(err))
    }

    /// Builds the network error reported when an adapter call exceeds its deadline
    pub fn timed_out(operation: &'static str, after: Duration) -> Self {
        CloudError::network(OperationTimedOut { operation, after })
    }

    /// Returns true if this error was caused by a missing session
    pub fn is_not_authenticated(&self) -> bool {
        matches!(self, CloudError::NotAuthenticated)
    }

    /// Returns true for transport-level failures
    pub fn is_network(&self) -> bool {
        matches!(self, CloudError::NetworkError(_))
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            CloudError::NotAuthenticated => "not_authenticated",
            CloudError::AuthenticationFailed(_) => "authentication_failed",
            CloudError::NetworkError(_) => "network_error",
            CloudError::FileNotFound => "file_not_found",
            CloudError::PermissionDenied => "permission_denied",
            CloudError::OperationFailed(_) => "operation_failed",
            CloudError::InvalidPath => "invalid_path",
            CloudError::QuotaExceeded => "quota_exceeded",
        }
    }
}

impl From<DomainError> for CloudError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidPath(_) | DomainError::InvalidName(_) => CloudError::InvalidPath,
            other => CloudError::OperationFailed(other.to_string()),
        }
    }
}

/// Source error of a timed-out adapter call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{operation} timed out after {after:?}")]
pub struct OperationTimedOut {
    /// Name of the adapter operation that timed out
    pub operation: &'static str,
    /// The deadline that was exceeded
    pub after: Duration,
}
