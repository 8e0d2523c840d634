/**
 * Current User Handler
 *
 * This module implements `GET /auth/user`, which returns the identity
 * resolved from the bearer token together with its role flags.
 *
 * # Authentication
 *
 * Runs behind the identity middleware. With route protection disabled the
 * middleware lets anonymous callers through, so this handler rejects them
 * itself.
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::gate::AccessGate;
use crate::backend::auth::handlers::types::UserResponse;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;

/// Get current user handler
///
/// # Errors
///
/// * `401 Unauthorized` - If no identity was resolved from the request
///
/// # Example Response
///
/// ```json
/// {
///   "id": "0f1c2d3e-...",
///   "username": "ada",
///   "email": "ada@example.com",
///   "roles": ["teacher"],
///   "is_admin": false,
///   "is_teacher": true
/// }
/// ```
pub async fn current_user(
    State(gate): State<AccessGate>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserResponse>, BackendError> {
    if user.is_anonymous() {
        return Err(BackendError::unauthenticated("Not authenticated"));
    }

    Ok(Json(UserResponse {
        is_admin: gate.is_admin(&user),
        is_teacher: gate.is_teacher(&user),
        id: user.id,
        username: user.username,
        email: user.email,
        roles: user.roles,
    }))
}
