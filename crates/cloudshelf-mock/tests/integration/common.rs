//! Shared helpers for the mock provider integration tests

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use cloudshelf_cache::{DatabasePool, SqliteSettingsStore};
use cloudshelf_core::config::{BrowserConfig, TimeoutConfig, DEFAULT_ACCOUNTS_KEY};
use cloudshelf_core::domain::{CloudFile, CloudPath, ServiceType};
use cloudshelf_core::ports::{ICloudService, ISettingsStore};
use cloudshelf_core::usecases::{AccountRegistry, FileBrowser, ServiceSet};
use cloudshelf_mock::MockCloudService;

/// Registry over one seeded mock adapter per provider
pub struct Harness {
    pub registry: Arc<AccountRegistry>,
    pub services: HashMap<ServiceType, Arc<MockCloudService>>,
}

impl Harness {
    pub fn service(&self, service_type: ServiceType) -> &Arc<MockCloudService> {
        &self.services[&service_type]
    }

    pub fn browser(&self) -> FileBrowser {
        FileBrowser::new(
            Arc::clone(&self.registry),
            BrowserConfig::default(),
            TimeoutConfig::default(),
        )
    }
}

pub async fn harness_with_store(store: Arc<dyn ISettingsStore>) -> Harness {
    let services: HashMap<ServiceType, Arc<MockCloudService>> = ServiceType::ALL
        .iter()
        .map(|t| (*t, Arc::new(MockCloudService::new(*t))))
        .collect();
    let set = ServiceSet::from_fn(|t| Arc::clone(&services[&t]) as Arc<dyn ICloudService>)
        .expect("mock adapters report their own service type");
    let registry = AccountRegistry::load(
        set,
        store,
        DEFAULT_ACCOUNTS_KEY,
        TimeoutConfig::default(),
    )
    .await;

    Harness {
        registry: Arc::new(registry),
        services,
    }
}

/// Harness backed by a fresh in-memory SQLite store
pub async fn harness() -> Harness {
    let pool = DatabasePool::in_memory()
        .await
        .expect("Failed to create in-memory database");
    harness_with_store(Arc::new(SqliteSettingsStore::new(pool.pool().clone()))).await
}

pub async fn file_store(path: &Path) -> Arc<dyn ISettingsStore> {
    Arc::new(
        SqliteSettingsStore::open(path)
            .await
            .expect("Failed to open settings database"),
    )
}

/// A seeded adapter with an established session
pub async fn signed_in(service_type: ServiceType) -> MockCloudService {
    let service = MockCloudService::new(service_type);
    service.authenticate().await.expect("authenticate failed");
    service
}

pub fn path(p: &str) -> CloudPath {
    CloudPath::new(p).expect("valid test path")
}

pub fn names(files: &[CloudFile]) -> Vec<&str> {
    files.iter().map(CloudFile::name).collect()
}

pub fn find<'a>(files: &'a [CloudFile], name: &str) -> &'a CloudFile {
    files
        .iter()
        .find(|f| f.name() == name)
        .unwrap_or_else(|| panic!("{name} not in listing"))
}
