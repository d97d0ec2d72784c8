//! Domain entities and business logic
//!
//! This module contains the core value types for Cloudshelf:
//! - Supported providers ([`ServiceType`])
//! - Validated provider paths ([`CloudPath`])
//! - Connected accounts ([`CloudAccount`])
//! - File and folder entries ([`CloudFile`])
//! - Domain and provider error types

pub mod account;
pub mod cloud_file;
pub mod errors;
pub mod format;
pub mod newtypes;
pub mod service_type;

// Re-export commonly used types
pub use account::CloudAccount;
pub use cloud_file::{CloudFile, FileKind};
pub use errors::{CloudError, DomainError, OperationTimedOut};
pub use format::format_bytes;
pub use newtypes::{validate_name, CloudPath};
pub use service_type::ServiceType;
