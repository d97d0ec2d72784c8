//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the core depends on,
//! but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`ICloudService`] - Storage provider operations (one adapter per provider)
//! - [`ISettingsStore`] - Key/value persistence for registry state

pub mod cloud_service;
pub mod settings_store;

pub use cloud_service::{with_timeout, ICloudService, SearchResults};
pub use settings_store::ISettingsStore;
