//! Authentication test helpers
//!
//! Tokens are minted with HS256 and an arbitrary secret. The server decodes
//! them without signature verification because no realm key is configured
//! in tests.

use jsonwebtoken::{encode, EncodingKey, Header};
use std::time::{SystemTime, UNIX_EPOCH};
use xpcollab::backend::auth::sessions::{Claims, RealmAccess};

/// Generate a token for `sub` carrying the given realm roles
pub fn generate_test_token(sub: &str, roles: &[&str]) -> String {
    let exp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_secs()
        + 3600;
    let claims = Claims {
        sub: Some(sub.to_string()),
        preferred_username: Some(format!("{}-name", sub)),
        email: Some(format!("{}@example.com", sub)),
        realm_access: Some(RealmAccess {
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }),
        exp,
        ..Default::default()
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("Failed to generate test token")
}

/// Token whose `exp` lies in the past
pub fn generate_expired_token(sub: &str) -> String {
    let claims = Claims {
        sub: Some(sub.to_string()),
        exp: 1_000_000,
        ..Default::default()
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("Failed to generate test token")
}
