//! JWT claims carried by every request token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use userdrive_core::error::AppError;
use userdrive_core::types::UserId;

/// Claims payload embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the user id.
    pub sub: String,
    /// Username for display and logging.
    pub username: String,
    /// Whether the caller may act on other users' trees.
    #[serde(default)]
    pub is_admin: bool,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// The validated user id from the subject claim.
    ///
    /// A token whose subject cannot be used as a directory name is treated
    /// as an invalid credential.
    pub fn user_id(&self) -> Result<UserId, AppError> {
        UserId::parse(&self.sub)
            .map_err(|_| AppError::unauthorized("Token subject is not a valid user id"))
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Checks whether this token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use userdrive_core::error::ErrorKind;

    fn claims(sub: &str) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: sub.to_string(),
            username: "alice".to_string(),
            is_admin: false,
            iat: now,
            exp: now + 60,
        }
    }

    #[test]
    fn test_user_id_from_subject() {
        assert_eq!(claims("u-1").user_id().unwrap().as_str(), "u-1");
        assert!(!claims("u-1").is_expired());
    }

    #[test]
    fn test_traversal_subject_is_unauthorized() {
        let err = claims("../other").user_id().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }
}
