/**
 * Authentication Handler Types
 *
 * Response bodies of the identity endpoints.
 */

use serde::{Deserialize, Serialize};

use crate::shared::UserInfo;

/// Response of `GET /auth/check`
///
/// `user` is `null` when no identity could be resolved.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthCheckResponse {
    pub authenticated: bool,
    /// Whether the server rejects requests without a valid token
    pub protection_enabled: bool,
    pub user: Option<UserInfo>,
}

/// Response of `GET /auth/user`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserResponse {
    /// Opaque identity key, as recorded in `created_by` / `updated_by`
    pub id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    /// Realm roles, in token order
    pub roles: Vec<String>,
    pub is_admin: bool,
    pub is_teacher: bool,
}
