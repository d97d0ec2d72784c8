//! Domain newtypes with validation
//!
//! This module provides the strongly-typed path used to address entries in a
//! provider's namespace, plus the shared name validation rules.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// An absolute, slash-separated path inside one provider's namespace
///
/// The empty string is the root. Every other path starts with `/` and has
/// no trailing slash, e.g. `"/Documents/Contract.pdf"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CloudPath(String);

impl CloudPath {
    /// Create a new CloudPath
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` if the path is not rooted at `/`,
    /// ends with `/`, or contains empty, `.` or `..` components.
    pub fn new(path: impl Into<String>) -> Result<Self, DomainError> {
        let path = path.into();
        if path.is_empty() {
            return Ok(Self::root());
        }

        let Some(rest) = path.strip_prefix('/') else {
            return Err(DomainError::InvalidPath(format!(
                "Path must be empty or start with '/': {path}"
            )));
        };

        for component in rest.split('/') {
            validate_name(component)
                .map_err(|_| DomainError::InvalidPath(format!("Invalid component in {path}")))?;
        }

        Ok(Self(path))
    }

    /// The root path (`""`)
    #[must_use]
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Returns true if this is the root path
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a single name component
    ///
    /// # Errors
    /// Returns `DomainError::InvalidName` if `name` is not a valid entry name
    pub fn join(&self, name: &str) -> Result<Self, DomainError> {
        validate_name(name)?;
        Ok(Self(format!("{}/{name}", self.0)))
    }

    /// Get the parent path (`None` for the root)
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        self.0.rfind('/').map(|idx| Self(self.0[..idx].to_string()))
    }

    /// Get the last component (`None` for the root)
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.0.rsplit('/').next()
    }

    /// Returns true if `other` lies strictly below this path
    #[must_use]
    pub fn is_ancestor_of(&self, other: &CloudPath) -> bool {
        if self.is_root() {
            return !other.is_root();
        }
        other
            .0
            .strip_prefix(self.0.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Replace the `from` prefix of this path with `to`
    ///
    /// Returns `None` if `from` is neither this path nor one of its ancestors.
    #[must_use]
    pub fn rebase(&self, from: &CloudPath, to: &CloudPath) -> Option<Self> {
        if self == from {
            return Some(to.clone());
        }
        if !from.is_ancestor_of(self) {
            return None;
        }
        let rest = &self.0[from.0.len()..];
        Some(Self(format!("{}{rest}", to.0)))
    }

    /// Number of components (0 for the root)
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.0.matches('/').count()
        }
    }
}

impl Display for CloudPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "/")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for CloudPath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CloudPath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CloudPath> for String {
    fn from(path: CloudPath) -> Self {
        path.0
    }
}

/// Validate a single file or folder name
///
/// # Errors
/// Returns `DomainError::InvalidName` if the name is empty, contains `/`,
/// or is one of the reserved names `.` and `..`.
pub fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.is_empty() {
        return Err(DomainError::InvalidName("name cannot be empty".to_string()));
    }
    if name.contains('/') {
        return Err(DomainError::InvalidName(format!(
            "name cannot contain '/': {name}"
        )));
    }
    if name == "." || name == ".." {
        return Err(DomainError::InvalidName(format!("reserved name: {name}")));
    }
    Ok(())
}
