//! CloudAccount domain entity
//!
//! This module defines the CloudAccount entity which represents one
//! authenticated connection between Cloudshelf and a user identity on
//! one cloud storage provider.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{format::format_bytes, service_type::ServiceType};

/// Represents a connected cloud storage account
///
/// Two accounts are equal when both their `id` and `service_type` match.
/// The registry additionally keeps at most one account per
/// `(service_type, email)` pair, see [`CloudAccount::same_identity`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudAccount {
    /// Provider-assigned or locally generated identifier
    id: String,
    /// Provider this account belongs to
    service_type: ServiceType,
    /// Account email address
    email: String,
    /// Display name from the provider profile
    display_name: String,
    /// Whether the connection is currently established
    is_connected: bool,
    /// When the account was connected
    connected_date: DateTime<Utc>,
    /// Last time account information was refreshed
    #[serde(default)]
    last_sync_date: Option<DateTime<Utc>>,
    /// Total storage quota in bytes
    #[serde(default)]
    total_space: Option<u64>,
    /// Used storage in bytes
    #[serde(default)]
    used_space: Option<u64>,
}

impl CloudAccount {
    /// Creates a newly connected account with no quota information
    pub fn new(
        id: impl Into<String>,
        service_type: ServiceType,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            service_type,
            email: email.into(),
            display_name: display_name.into(),
            is_connected: true,
            connected_date: Utc::now(),
            last_sync_date: None,
            total_space: None,
            used_space: None,
        }
    }

    /// Sets the quota information
    #[must_use]
    pub fn with_quota(mut self, used: u64, total: u64) -> Self {
        self.used_space = Some(used);
        self.total_space = Some(total);
        self
    }

    /// Sets the connection timestamp (for reconstitution)
    #[must_use]
    pub fn with_connected_date(mut self, connected_date: DateTime<Utc>) -> Self {
        self.connected_date = connected_date;
        self
    }

    /// Sets the last sync timestamp
    #[must_use]
    pub fn with_last_sync_date(mut self, last_sync: DateTime<Utc>) -> Self {
        self.last_sync_date = Some(last_sync);
        self
    }

    // --- Getters ---

    /// Returns the account identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the provider this account belongs to
    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    /// Returns the account email address
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the display name
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns true if the account is connected
    pub fn is_connected(&self) -> bool {
        self.is_connected
    }

    /// Returns when the account was connected
    pub fn connected_date(&self) -> DateTime<Utc> {
        self.connected_date
    }

    /// Returns the last refresh timestamp if any
    pub fn last_sync_date(&self) -> Option<DateTime<Utc>> {
        self.last_sync_date
    }

    /// Returns the total quota in bytes, if known
    pub fn total_space(&self) -> Option<u64> {
        self.total_space
    }

    /// Returns the used storage in bytes, if known
    pub fn used_space(&self) -> Option<u64> {
        self.used_space
    }

    // --- Derived values ---

    /// Remaining bytes (`None` unless both quota values are known)
    pub fn available_space(&self) -> Option<u64> {
        let total = self.total_space?;
        let used = self.used_space?;
        Some(total.saturating_sub(used))
    }

    /// Fraction of the quota in use, between 0.0 and 1.0 for sane quotas
    ///
    /// Undefined (`None`) when the total is unknown or zero, or the used
    /// amount is unknown.
    pub fn usage_percentage(&self) -> Option<f64> {
        let total = self.total_space.filter(|t| *t > 0)?;
        let used = self.used_space?;
        Some(used as f64 / total as f64)
    }

    /// Used storage formatted for display
    pub fn formatted_used_space(&self) -> Option<String> {
        self.used_space.map(format_bytes)
    }

    /// Total quota formatted for display
    pub fn formatted_total_space(&self) -> Option<String> {
        self.total_space.map(format_bytes)
    }

    /// Returns true if `other` is the same provider identity (service + email)
    pub fn same_identity(&self, other: &CloudAccount) -> bool {
        self.service_type == other.service_type && self.email == other.email
    }

    // --- State mutations ---

    /// Updates the quota information
    pub fn update_quota(&mut self, used: u64, total: u64) {
        self.used_space = Some(used);
        self.total_space = Some(total);
    }

    /// Records a refresh of the account information
    pub fn record_sync(&mut self, timestamp: DateTime<Utc>) {
        self.last_sync_date = Some(timestamp);
    }

    /// Marks the account as disconnected
    pub fn mark_disconnected(&mut self) {
        self.is_connected = false;
    }
}

impl PartialEq for CloudAccount {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.service_type == other.service_type
    }
}

impl Eq for CloudAccount {}

impl Hash for CloudAccount {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.service_type.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn create_test_account() -> CloudAccount {
        CloudAccount::new(
            "account123",
            ServiceType::Dropbox,
            "test@example.com",
            "Test User",
        )
    }

    #[test]
    fn test_new_account() {
        let account = create_test_account();

        assert_eq!(account.id(), "account123");
        assert_eq!(account.service_type(), ServiceType::Dropbox);
        assert_eq!(account.email(), "test@example.com");
        assert_eq!(account.display_name(), "Test User");
        assert!(account.is_connected());
        assert!(account.last_sync_date().is_none());
        assert!(account.total_space().is_none());
    }

    #[test]
    fn test_usage_percentage_exact() {
        let account = create_test_account().with_quota(5_000_000_000, 10_000_000_000);
        assert_eq!(account.usage_percentage(), Some(0.5));
        assert_eq!(account.available_space(), Some(5_000_000_000));
    }

    #[test]
    fn test_usage_percentage_undefined_without_total() {
        let account = create_test_account();
        assert!(account.usage_percentage().is_none());
        assert!(account.available_space().is_none());

        let zero_total = create_test_account().with_quota(0, 0);
        assert!(zero_total.usage_percentage().is_none());
        assert_eq!(zero_total.available_space(), Some(0));
    }

    #[test]
    fn test_formatted_space() {
        let account = create_test_account().with_quota(5_234_567_890, 15_000_000_000);
        assert_eq!(account.formatted_used_space().as_deref(), Some("5.23 GB"));
        assert_eq!(account.formatted_total_space().as_deref(), Some("15.00 GB"));
        assert!(create_test_account().formatted_used_space().is_none());
    }

    #[test]
    fn test_equality_uses_id_and_service() {
        let a = create_test_account();
        let mut b = create_test_account().with_quota(1, 2);
        b.mark_disconnected();
        assert_eq!(a, b);

        let other_service =
            CloudAccount::new("account123", ServiceType::OneDrive, "test@example.com", "Test");
        assert_ne!(a, other_service);

        let set: HashSet<CloudAccount> = [a, b, other_service].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_same_identity() {
        let a = create_test_account();
        let reconnected =
            CloudAccount::new("fresh-id", ServiceType::Dropbox, "test@example.com", "Test User");
        let other_email =
            CloudAccount::new("fresh-id", ServiceType::Dropbox, "other@example.com", "Other");

        assert!(a.same_identity(&reconnected));
        assert!(!a.same_identity(&other_email));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let account = create_test_account()
            .with_quota(5, 10)
            .with_last_sync_date(Utc::now());
        let json = serde_json::to_string(&account).unwrap();
        assert!(json.contains("\"serviceType\":\"Dropbox\""));

        let deserialized: CloudAccount = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, account);
        assert_eq!(deserialized.email(), account.email());
        assert_eq!(deserialized.used_space(), Some(5));
        assert_eq!(deserialized.last_sync_date(), account.last_sync_date());
    }

    #[test]
    fn test_deserialize_with_missing_optional_fields() {
        let json = r#"{
            "id": "abc",
            "serviceType": "OneDrive",
            "email": "a@b.c",
            "displayName": "A",
            "isConnected": true,
            "connectedDate": "2026-01-01T00:00:00Z"
        }"#;
        let account: CloudAccount = serde_json::from_str(json).unwrap();
        assert!(account.total_space().is_none());
        assert!(account.last_sync_date().is_none());
    }
}
