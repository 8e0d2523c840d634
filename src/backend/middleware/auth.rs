/**
 * Authentication Middleware
 *
 * This module resolves the caller identity of each request through the
 * access gate and attaches it to the request extensions, where the
 * `AuthUser` and `MaybeUser` extractors pick it up.
 *
 * - `require_identity` guards routes that act on behalf of a caller. In
 *   protected mode it rejects requests without a valid token; otherwise
 *   such callers continue as `anonymous`.
 * - `optional_identity` never rejects. It attaches an identity only when a
 *   valid token was presented.
 * - `require_role` runs after `require_identity` and answers 403 when the
 *   attached identity lacks the route's role.
 */

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::backend::auth::{AccessGate, RoleRequirement};
use crate::backend::error::BackendError;
use crate::shared::UserInfo;

/// Identity middleware for protected routes
///
/// Returns 401 if protection is enabled and the token is missing or invalid.
pub async fn require_identity(
    State(gate): State<AccessGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let user = gate
        .resolve(request.headers())?
        .unwrap_or_else(UserInfo::anonymous);

    tracing::debug!(user_id = %user.id, "Resolved caller identity: {}", user.display_name());
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Identity middleware for routes that merely report on the caller
pub async fn optional_identity(
    State(gate): State<AccessGate>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Ok(Some(user)) = gate.resolve(request.headers()) {
        request.extensions_mut().insert(user);
    }
    next.run(request).await
}

/// Role guard, layered inside `require_identity`
///
/// ```rust,ignore
/// let admin_routes = Router::new()
///     .route("/admin", get(handler))
///     .route_layer(from_fn_with_state((gate, RoleRequirement::Admin), require_role))
///     .route_layer(from_fn_with_state(state.clone(), require_identity));
/// ```
pub async fn require_role(
    State((gate, requirement)): State<(AccessGate, RoleRequirement)>,
    request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let user = request
        .extensions()
        .get::<UserInfo>()
        .ok_or_else(|| BackendError::unauthenticated("Not authenticated"))?;
    gate.authorize(user, requirement)?;
    Ok(next.run(request).await)
}

/// Axum extractor for the identity attached by `require_identity`
#[derive(Clone, Debug)]
pub struct AuthUser(pub UserInfo);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<UserInfo>().cloned().ok_or_else(|| {
            tracing::warn!("UserInfo not found in request extensions");
            BackendError::unauthenticated("Not authenticated")
        })?;
        Ok(AuthUser(user))
    }
}

/// Axum extractor for an identity that may be absent
#[derive(Clone, Debug)]
pub struct MaybeUser(pub Option<UserInfo>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<UserInfo>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn parts_with(user: Option<UserInfo>) -> Parts {
        let mut request = HttpRequest::builder()
            .uri("http://example.com")
            .body(())
            .unwrap();
        if let Some(user) = user {
            request.extensions_mut().insert(user);
        }
        request.into_parts().0
    }

    #[tokio::test]
    async fn test_auth_user_from_extensions() {
        let mut parts = parts_with(Some(UserInfo::new("u-1", None, None, Vec::new())));
        let AuthUser(user) = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.id, "u-1");
    }

    #[tokio::test]
    async fn test_auth_user_missing() {
        let mut parts = parts_with(None);
        let result = AuthUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(BackendError::Unauthenticated { .. })));
    }

    mod role_guard {
        use super::*;
        use crate::backend::server::config::AuthConfig;
        use axum::{body::Body, http::StatusCode, middleware::from_fn_with_state, routing::get, Router};
        use tower::ServiceExt;

        fn guarded(requirement: RoleRequirement, user: Option<UserInfo>) -> Router {
            let gate = AccessGate::from_config(&AuthConfig::default()).unwrap();
            let router = Router::new()
                .route("/guarded", get(|| async { "ok" }))
                .route_layer(from_fn_with_state((gate, requirement), require_role));
            match user {
                Some(user) => router.layer(axum::Extension(user)),
                None => router,
            }
        }

        async fn status(router: Router) -> StatusCode {
            let request = HttpRequest::builder()
                .uri("/guarded")
                .body(Body::empty())
                .unwrap();
            router.oneshot(request).await.unwrap().status()
        }

        fn user(roles: &[&str]) -> Option<UserInfo> {
            Some(UserInfo::new(
                "u-1",
                None,
                None,
                roles.iter().map(|r| r.to_string()).collect::<Vec<_>>(),
            ))
        }

        #[tokio::test]
        async fn test_matching_role_passes() {
            let router = guarded(RoleRequirement::Teacher, user(&["teacher"]));
            assert_eq!(status(router).await, StatusCode::OK);

            let router = guarded(RoleRequirement::TeacherOrAdmin, user(&["admin"]));
            assert_eq!(status(router).await, StatusCode::OK);
        }

        #[tokio::test]
        async fn test_missing_role_is_forbidden() {
            let router = guarded(RoleRequirement::Admin, user(&["teacher"]));
            assert_eq!(status(router).await, StatusCode::FORBIDDEN);

            let router = guarded(RoleRequirement::Teacher, Some(UserInfo::anonymous()));
            assert_eq!(status(router).await, StatusCode::FORBIDDEN);
        }

        #[tokio::test]
        async fn test_without_identity_layer_is_unauthenticated() {
            let router = guarded(RoleRequirement::Teacher, None);
            assert_eq!(status(router).await, StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn test_maybe_user() {
        let mut parts = parts_with(None);
        let MaybeUser(user) = MaybeUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(user.is_none());

        let mut parts = parts_with(Some(UserInfo::anonymous()));
        let MaybeUser(user) = MaybeUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(user.unwrap().is_anonymous());
    }
}
