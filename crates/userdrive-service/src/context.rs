//! Request context carrying the authenticated caller.

use tracing::warn;

use userdrive_core::error::AppError;
use userdrive_core::types::UserId;

/// Context for the current authenticated request.
///
/// Built by the API layer from validated token claims and passed into
/// service methods so that every operation knows who is acting.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The authenticated user's id.
    pub user_id: UserId,
    /// The username (convenience field from token claims).
    pub username: String,
    /// Whether the caller may operate on other users' trees.
    pub is_admin: bool,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId, username: String, is_admin: bool) -> Self {
        Self {
            user_id,
            username,
            is_admin,
        }
    }

    /// The tree a request targets: the caller's own when `requested` is
    /// absent or empty, otherwise the named user's (admins only).
    pub fn owner(&self, requested: Option<&str>) -> Result<UserId, AppError> {
        let owner = match requested.map(str::trim).filter(|s| !s.is_empty()) {
            None => self.user_id.clone(),
            Some(raw) => UserId::parse(raw)?,
        };
        self.authorize(&owner)?;
        Ok(owner)
    }

    /// Checks that the caller may act on `owner`'s tree.
    pub fn authorize(&self, owner: &UserId) -> Result<(), AppError> {
        if *owner == self.user_id || self.is_admin {
            return Ok(());
        }
        warn!(
            caller = %self.user_id,
            username = %self.username,
            owner = %owner,
            "Denied access to another user's tree"
        );
        Err(AppError::forbidden("You may only access your own files"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use userdrive_core::error::ErrorKind;

    fn ctx(id: &str, is_admin: bool) -> RequestContext {
        RequestContext::new(UserId::parse(id).unwrap(), id.to_string(), is_admin)
    }

    #[test]
    fn test_owner_defaults_to_caller() {
        let ctx = ctx("alice", false);
        assert_eq!(ctx.owner(None).unwrap().as_str(), "alice");
        assert_eq!(ctx.owner(Some("  ")).unwrap().as_str(), "alice");
        assert_eq!(ctx.owner(Some("alice")).unwrap().as_str(), "alice");
    }

    #[test]
    fn test_other_tree_requires_admin() {
        let err = ctx("alice", false).owner(Some("bob")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        assert_eq!(
            ctx("root", true).owner(Some("bob")).unwrap().as_str(),
            "bob"
        );
    }

    #[test]
    fn test_owner_id_is_validated() {
        let err = ctx("root", true).owner(Some("../bob")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPath);
    }
}
