//! Resolved caller identity
//!
//! The access gate turns a bearer credential into a `UserInfo`. The version
//! control engine only ever sees `UserInfo::id`, an opaque string key.

use serde::{Deserialize, Serialize};

/// Identity used for callers when route protection is disabled and no
/// credential was presented
pub const ANONYMOUS_ID: &str = "anonymous";

/// Caller identity resolved from a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    /// Realm roles in token order, without duplicates
    pub roles: Vec<String>,
}

impl UserInfo {
    /// Build an identity, dropping repeated roles while keeping their order
    pub fn new(
        id: impl Into<String>,
        username: Option<String>,
        email: Option<String>,
        roles: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for role in roles {
            if !unique.contains(&role) {
                unique.push(role);
            }
        }
        Self {
            id: id.into(),
            username,
            email,
            roles: unique,
        }
    }

    /// The identity assumed for unauthenticated callers on unprotected routes
    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_ID, None, None, Vec::new())
    }

    pub fn is_anonymous(&self) -> bool {
        self.id == ANONYMOUS_ID
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }

    /// Whether this caller created the resource
    pub fn is_owner(&self, resource_owner: &str) -> bool {
        self.id == resource_owner
    }

    /// Display name: username, then email, then `anonymous`
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(ANONYMOUS_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_are_deduplicated_in_order() {
        let user = UserInfo::new(
            "u1",
            None,
            None,
            vec![
                "teacher".to_string(),
                "admin".to_string(),
                "teacher".to_string(),
            ],
        );
        assert_eq!(user.roles, vec!["teacher", "admin"]);
        assert!(user.has_role("admin"));
        assert!(user.has_any_role(&["student", "teacher"]));
        assert!(!user.has_role("student"));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let with_email = UserInfo::new("u1", None, Some("a@example.com".to_string()), vec![]);
        assert_eq!(with_email.display_name(), "a@example.com");

        let anonymous = UserInfo::anonymous();
        assert!(anonymous.is_anonymous());
        assert_eq!(anonymous.display_name(), "anonymous");
    }

    #[test]
    fn test_is_owner() {
        let user = UserInfo::new("u1", None, None, vec![]);
        assert!(user.is_owner("u1"));
        assert!(!user.is_owner("u2"));
    }
}
