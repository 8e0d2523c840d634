/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route groups into a single Axum router and applies the cross-cutting
 * layers.
 *
 * # Layers
 *
 * - Request tracing
 * - CORS for the configured frontend origins, with credentials
 * - 50 MiB request body limit, since experiment content can be large
 */

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::backend::error::BackendError;
use crate::backend::routes::api_routes::{optional_auth_routes, protected_routes, public_routes};
use crate::backend::server::state::AppState;

pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// CORS layer allowing the configured origins; unparsable origins are skipped
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}

/// Create the Axum router with all routes configured
///
/// Unknown routes fall back to a JSON 404.
pub fn create_router(app_state: AppState) -> Router<()> {
    let origins = app_state.config.cors_origins();

    Router::new()
        .merge(public_routes())
        .merge(optional_auth_routes(&app_state))
        .merge(protected_routes(&app_state))
        .fallback(|| async { BackendError::not_found("Route not found") })
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer(&origins))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
