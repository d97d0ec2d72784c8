//! Cloudshelf Mock - in-memory storage provider
//!
//! Implements the `ICloudService` port without any network access. Every
//! instance starts with the same small demo namespace (two folders and a
//! handful of documents and photos) and supports failure injection and
//! simulated latency so the browsing logic can be exercised end to end.
//!
//! ## Modules
//!
//! - [`service`] - `MockCloudService`, the adapter itself
//! - [`failure`] - scheduled failures (`MockOperation`, `MockFailure`)
//! - [`seed`] - the demo namespace and quota figures

use std::sync::Arc;

use cloudshelf_core::config::MockConfig;
use cloudshelf_core::domain::DomainError;
use cloudshelf_core::ports::ICloudService;
use cloudshelf_core::usecases::ServiceSet;

pub mod failure;
pub mod seed;
pub mod service;
mod tree;

pub use failure::{MockFailure, MockOperation, SimulatedOutage};
pub use service::MockCloudService;

/// Binds a seeded mock adapter to every provider
pub fn mock_services(config: &MockConfig) -> Result<ServiceSet, DomainError> {
    ServiceSet::from_fn(|service_type| {
        Arc::new(MockCloudService::with_config(service_type, config.clone())) as Arc<dyn ICloudService>
    })
}
