//! `GET /auth/check` reports whether the request carries a usable identity.
//! It never fails, whatever the protection mode.

use axum::{extract::State, response::Json};

use crate::backend::auth::gate::AccessGate;
use crate::backend::auth::handlers::types::AuthCheckResponse;
use crate::backend::middleware::MaybeUser;

pub async fn auth_check(
    State(gate): State<AccessGate>,
    MaybeUser(user): MaybeUser,
) -> Json<AuthCheckResponse> {
    Json(AuthCheckResponse {
        authenticated: user.is_some(),
        protection_enabled: gate.protection_enabled(),
        user,
    })
}
