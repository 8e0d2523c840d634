//! Access gate
//!
//! Turns the `Authorization` header of a request into an identity. Whether a
//! request without a usable token is rejected depends on the protection mode.

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::backend::auth::sessions::{AuthError, TokenVerifier};
use crate::backend::error::BackendError;
use crate::backend::server::config::AuthConfig;
use crate::shared::UserInfo;

/// Role that always counts as admin, whatever `admin_role` is configured to
pub const REALM_ADMIN_ROLE: &str = "realm-admin";

/// Bearer token gate shared by all routes
#[derive(Clone)]
pub struct AccessGate {
    verifier: Arc<TokenVerifier>,
    protection_enabled: bool,
    admin_role: String,
    teacher_role: String,
}

/// Extract the token of a `Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl AccessGate {
    pub fn new(verifier: TokenVerifier, config: &AuthConfig) -> Self {
        tracing::debug!(
            verifies_signatures = verifier.verifies_signatures(),
            admin_role = %config.admin_role,
            teacher_role = %config.teacher_role,
            "Building access gate"
        );
        Self {
            verifier: Arc::new(verifier),
            protection_enabled: config.protection_enabled,
            admin_role: config.admin_role.clone(),
            teacher_role: config.teacher_role.clone(),
        }
    }

    /// Build the gate, verifying signatures when a realm public key is set
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let verifier = match &config.realm_public_key {
            Some(key) => TokenVerifier::from_realm_public_key(key)?,
            None => {
                tracing::warn!("No realm public key configured; bearer token signatures are not verified");
                TokenVerifier::unverified()
            }
        };
        Ok(Self::new(verifier, config))
    }

    pub fn protection_enabled(&self) -> bool {
        self.protection_enabled
    }

    /// Identity carried by the request, if any
    ///
    /// In protected mode a missing or invalid token is `Unauthenticated`.
    /// Otherwise both resolve to `None`.
    pub fn resolve(&self, headers: &HeaderMap) -> Result<Option<UserInfo>, BackendError> {
        let Some(token) = bearer_token(headers) else {
            if self.protection_enabled {
                return Err(BackendError::unauthenticated("Missing bearer token"));
            }
            return Ok(None);
        };

        let user = match self.verifier.verify(token) {
            Ok(claims) => claims.into_user_info(),
            Err(e) => {
                tracing::warn!("Rejected bearer token: {}", e);
                None
            }
        };

        match user {
            Some(user) => Ok(Some(user)),
            None if self.protection_enabled => {
                Err(BackendError::unauthenticated("Invalid or expired token"))
            }
            None => Ok(None),
        }
    }

    pub fn is_admin(&self, user: &UserInfo) -> bool {
        user.has_any_role(&[self.admin_role.as_str(), REALM_ADMIN_ROLE])
    }

    pub fn is_teacher(&self, user: &UserInfo) -> bool {
        user.has_role(&self.teacher_role)
    }

    pub fn is_teacher_or_admin(&self, user: &UserInfo) -> bool {
        self.is_teacher(user) || self.is_admin(user)
    }

    /// Owners and admins may access a resource
    pub fn can_access(&self, user: &UserInfo, resource_owner: &str) -> bool {
        user.is_owner(resource_owner) || self.is_admin(user)
    }

    /// `Forbidden` unless the caller satisfies the role requirement
    pub fn authorize(&self, user: &UserInfo, requirement: RoleRequirement) -> Result<(), BackendError> {
        let allowed = match requirement {
            RoleRequirement::Teacher => self.is_teacher(user),
            RoleRequirement::TeacherOrAdmin => self.is_teacher_or_admin(user),
            RoleRequirement::Admin => self.is_admin(user),
        };
        if allowed {
            return Ok(());
        }
        tracing::warn!(user_id = %user.id, ?requirement, "Role check failed");
        Err(BackendError::forbidden(requirement.denial_message()))
    }
}

/// Role a route layer demands of its callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRequirement {
    Teacher,
    TeacherOrAdmin,
    Admin,
}

impl RoleRequirement {
    fn denial_message(self) -> &'static str {
        match self {
            Self::Teacher => "Forbidden: Teacher role required",
            Self::TeacherOrAdmin => "Forbidden: Teacher or Admin role required",
            Self::Admin => "Forbidden: Admin role required",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::sessions::{Claims, RealmAccess};
    use assert_matches::assert_matches;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn gate(protection_enabled: bool) -> AccessGate {
        let config = AuthConfig {
            protection_enabled,
            ..AuthConfig::default()
        };
        AccessGate::from_config(&config).unwrap()
    }

    fn headers_with(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    fn token(sub: &str, roles: &[&str]) -> String {
        let claims = Claims {
            sub: Some(sub.to_string()),
            realm_access: Some(RealmAccess {
                roles: roles.iter().map(|r| r.to_string()).collect(),
            }),
            exp: 4_102_444_800,
            ..Default::default()
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"dev")).unwrap()
    }

    #[test]
    fn test_unprotected_without_token() {
        assert_eq!(gate(false).resolve(&HeaderMap::new()).unwrap(), None);
    }

    #[test]
    fn test_unprotected_ignores_invalid_token() {
        let resolved = gate(false).resolve(&headers_with("garbage")).unwrap();
        assert_eq!(resolved, None);
    }

    #[test]
    fn test_protected_requires_token() {
        let result = gate(true).resolve(&HeaderMap::new());
        assert_matches!(result, Err(BackendError::Unauthenticated { .. }));

        let result = gate(true).resolve(&headers_with("garbage"));
        assert_matches!(result, Err(BackendError::Unauthenticated { .. }));
    }

    #[test]
    fn test_non_bearer_scheme_is_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_matches!(
            gate(true).resolve(&headers),
            Err(BackendError::Unauthenticated { .. })
        );
    }

    #[test]
    fn test_resolves_identity_and_roles() {
        let gate = gate(true);
        let user = gate
            .resolve(&headers_with(&token("user-7", &["teacher"])))
            .unwrap()
            .unwrap();
        assert_eq!(user.id, "user-7");
        assert!(gate.is_teacher(&user));
        assert!(!gate.is_admin(&user));
        assert!(gate.is_teacher_or_admin(&user));
        assert!(gate.can_access(&user, "user-7"));
        assert!(!gate.can_access(&user, "user-8"));
    }

    #[test]
    fn test_realm_admin_counts_as_admin() {
        let gate = gate(false);
        let user = UserInfo::new("root", None, None, vec![REALM_ADMIN_ROLE.to_string()]);
        assert!(gate.is_admin(&user));

        assert!(gate.can_access(&user, "someone-else"));

        let student = UserInfo::new("s", None, None, vec!["student".to_string()]);
        assert!(!gate.is_teacher_or_admin(&student));
    }

    #[test]
    fn test_authorize_by_requirement() {
        let gate = gate(false);
        let teacher = UserInfo::new("t", None, None, vec!["teacher".to_string()]);
        let admin = UserInfo::new("a", None, None, vec!["admin".to_string()]);

        assert!(gate.authorize(&teacher, RoleRequirement::Teacher).is_ok());
        assert!(gate.authorize(&teacher, RoleRequirement::TeacherOrAdmin).is_ok());
        assert!(gate.authorize(&admin, RoleRequirement::TeacherOrAdmin).is_ok());
        assert!(gate.authorize(&admin, RoleRequirement::Admin).is_ok());

        let err = gate.authorize(&teacher, RoleRequirement::Admin).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
        assert_eq!(err.to_string(), "Forbidden: Admin role required");

        assert_matches!(
            gate.authorize(&UserInfo::anonymous(), RoleRequirement::Teacher),
            Err(BackendError::Forbidden { .. })
        );
    }
}
