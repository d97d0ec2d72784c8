//! Supported cloud storage providers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// The cloud storage providers Cloudshelf can connect to
///
/// Serialized with the provider's display name so persisted account
/// records stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ServiceType {
    #[serde(rename = "Dropbox")]
    Dropbox,
    #[serde(rename = "Google Drive")]
    GoogleDrive,
    #[serde(rename = "OneDrive")]
    OneDrive,
    #[serde(rename = "iCloud Drive")]
    ICloudDrive,
}

impl ServiceType {
    /// Every supported provider, in display order
    pub const ALL: [ServiceType; 4] = [
        ServiceType::Dropbox,
        ServiceType::GoogleDrive,
        ServiceType::OneDrive,
        ServiceType::ICloudDrive,
    ];

    /// Human-readable provider name
    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceType::Dropbox => "Dropbox",
            ServiceType::GoogleDrive => "Google Drive",
            ServiceType::OneDrive => "OneDrive",
            ServiceType::ICloudDrive => "iCloud Drive",
        }
    }

    /// Short identifier used on the command line
    pub fn slug(&self) -> &'static str {
        match self {
            ServiceType::Dropbox => "dropbox",
            ServiceType::GoogleDrive => "google-drive",
            ServiceType::OneDrive => "onedrive",
            ServiceType::ICloudDrive => "icloud",
        }
    }

    /// Symbol name used by graphical front ends
    pub fn icon_name(&self) -> &'static str {
        match self {
            ServiceType::Dropbox => "folder.fill.badge.gearshape",
            ServiceType::GoogleDrive => "externaldrive.fill",
            ServiceType::OneDrive => "cloud.fill",
            ServiceType::ICloudDrive => "icloud.fill",
        }
    }

    /// Brand color as `#RRGGBB`
    pub fn color_hex(&self) -> &'static str {
        match self {
            ServiceType::Dropbox => "#0061FF",
            ServiceType::GoogleDrive => "#4285F4",
            ServiceType::OneDrive => "#0078D4",
            ServiceType::ICloudDrive => "#3B99FC",
        }
    }

    /// Stable position of this provider in [`ServiceType::ALL`]
    pub(crate) fn index(&self) -> usize {
        match self {
            ServiceType::Dropbox => 0,
            ServiceType::GoogleDrive => 1,
            ServiceType::OneDrive => 2,
            ServiceType::ICloudDrive => 3,
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ServiceType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();

        match normalized.as_str() {
            "dropbox" => Ok(ServiceType::Dropbox),
            "googledrive" | "gdrive" | "google" => Ok(ServiceType::GoogleDrive),
            "onedrive" => Ok(ServiceType::OneDrive),
            "icloud" | "iclouddrive" => Ok(ServiceType::ICloudDrive),
            _ => Err(DomainError::UnknownServiceType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slugs_and_names() {
        assert_eq!("dropbox".parse::<ServiceType>(), Ok(ServiceType::Dropbox));
        assert_eq!("Google Drive".parse::<ServiceType>(), Ok(ServiceType::GoogleDrive));
        assert_eq!("gdrive".parse::<ServiceType>(), Ok(ServiceType::GoogleDrive));
        assert_eq!("OneDrive".parse::<ServiceType>(), Ok(ServiceType::OneDrive));
        assert_eq!("icloud-drive".parse::<ServiceType>(), Ok(ServiceType::ICloudDrive));
        assert!("box".parse::<ServiceType>().is_err());
    }

    #[test]
    fn test_slug_round_trips_for_every_service() {
        for service in ServiceType::ALL {
            assert_eq!(service.slug().parse::<ServiceType>(), Ok(service));
            assert_eq!(ServiceType::ALL[service.index()], service);
        }
    }

    #[test]
    fn test_serializes_with_display_name() {
        let json = serde_json::to_string(&ServiceType::ICloudDrive).unwrap();
        assert_eq!(json, "\"iCloud Drive\"");

        let parsed: ServiceType = serde_json::from_str("\"Google Drive\"").unwrap();
        assert_eq!(parsed, ServiceType::GoogleDrive);
    }

    #[test]
    fn test_presentation_metadata() {
        assert_eq!(ServiceType::Dropbox.color_hex(), "#0061FF");
        assert_eq!(ServiceType::OneDrive.icon_name(), "cloud.fill");
        assert_eq!(ServiceType::GoogleDrive.to_string(), "Google Drive");
    }
}
