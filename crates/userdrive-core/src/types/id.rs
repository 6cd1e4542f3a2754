//! Validated user identifier.
//!
//! A user id doubles as the directory name of that user's tree, so it is
//! checked to be exactly one safe path segment before any path is built
//! from it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Longest accepted user id, in bytes.
pub const MAX_USER_ID_LEN: usize = 128;

/// Identifier of a user and of that user's storage subtree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Parse and validate a user id.
    pub fn parse(raw: impl Into<String>) -> Result<Self, AppError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(AppError::validation("userId is required"));
        }
        if raw.len() > MAX_USER_ID_LEN {
            return Err(AppError::validation("userId is too long"));
        }
        if raw == "." || raw == ".." || raw.contains(['/', '\\', '\0']) {
            return Err(AppError::invalid_path("Invalid userId"));
        }
        Ok(Self(raw))
    }

    /// Return the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> String {
        id.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_accepts_object_id_style() {
        let id = UserId::parse("65f1c2a9e4b0a1b2c3d4e5f6").expect("valid id");
        assert_eq!(id.as_str(), "65f1c2a9e4b0a1b2c3d4e5f6");
    }

    #[test]
    fn test_rejects_traversal_segments() {
        for raw in ["..", ".", "a/b", "a\\b", "../etc"] {
            let err = UserId::parse(raw).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidPath, "{raw}");
        }
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(UserId::parse("").unwrap_err().kind, ErrorKind::Validation);
    }

    #[test]
    fn test_serde_validates() {
        let ok: UserId = serde_json::from_str("\"alice\"").expect("deserialize");
        assert_eq!(ok.to_string(), "alice");
        assert!(serde_json::from_str::<UserId>("\"..\"").is_err());
    }
}
