//! Custom assertion helpers
//!
//! Error responses share one body shape, `{"error": ..., "status": ...}`.
//! These helpers check status and body together so failures show both.

use axum::http::StatusCode;
use axum_test::TestResponse;
use serde_json::Value;

/// Assert an error response and return its body
pub fn assert_error(response: &TestResponse, status: StatusCode) -> Value {
    let body: Value = response.json();
    assert_eq!(
        response.status_code(),
        status,
        "unexpected status, body: {}",
        body
    );
    assert_eq!(body["status"], status.as_u16(), "body: {}", body);
    assert!(body["error"].is_string(), "missing error message: {}", body);
    body
}

/// Assert a success status and return the JSON body
pub fn assert_json(response: &TestResponse, status: StatusCode) -> Value {
    assert_eq!(
        response.status_code(),
        status,
        "unexpected status, body: {}",
        response.text()
    );
    response.json()
}

/// Assert that a string contains a substring
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        assert!(
            $haystack.contains($needle),
            "Expected '{}' to contain '{}'",
            $haystack,
            $needle
        );
    };
}
