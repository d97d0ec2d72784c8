//! Cloudshelf Core - Domain model and browsing logic
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `CloudAccount`, `CloudFile`, `ServiceType`, `CloudPath`
//! - **Error taxonomy** - `CloudError` returned by every provider operation
//! - **Port definitions** - `ICloudService` for storage providers, `ISettingsStore` for persistence
//! - **Use cases** - `AccountRegistry` (connected accounts) and `FileBrowser` (per-account navigation)
//!
//! # Architecture
//!
//! The domain module contains pure value types with no I/O.
//! Ports define trait interfaces that adapter crates implement
//! (`cloudshelf-mock` for providers, `cloudshelf-cache` for settings).
//! Use cases orchestrate provider adapters through the port interfaces and
//! publish their state to whatever presentation layer is attached.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
