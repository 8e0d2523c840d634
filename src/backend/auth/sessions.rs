/**
 * Bearer Token Verification
 *
 * This module decodes the bearer tokens issued by the identity provider
 * (a Keycloak realm) into `Claims`.
 *
 * # Verification Modes
 *
 * - With a realm public key, tokens must carry a valid RS256 signature.
 * - Without one, tokens are decoded without signature verification. This is
 *   meant for local development against an identity provider whose key has
 *   not been configured yet.
 *
 * Expiry is enforced in both modes. The audience claim is not checked.
 */

use jsonwebtoken::dangerous::insecure_decode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, get_current_timestamp, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::UserInfo;

/// Token verification errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// The configured realm public key could not be parsed
    #[error("Invalid realm public key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),

    /// Signature, expiry or structure check failed
    #[error("Invalid token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
}

/// Realm role assignment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Claims read from an identity provider token
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm_access: Option<RealmAccess>,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

impl Claims {
    /// Resolve an identity. The id is taken from `sub`, then `sid`, then
    /// `preferred_username`, then `email`; `None` if all are absent.
    pub fn into_user_info(self) -> Option<UserInfo> {
        let id = self
            .sub
            .clone()
            .or_else(|| self.sid.clone())
            .or_else(|| self.preferred_username.clone())
            .or_else(|| self.email.clone())
            .filter(|id| !id.is_empty())?;
        let roles = self.realm_access.map(|access| access.roles).unwrap_or_default();
        Some(UserInfo::new(id, self.preferred_username, self.email, roles))
    }
}

/// Decodes bearer tokens with or without signature verification
pub struct TokenVerifier {
    /// Realm public key; `None` decodes without checking signatures
    key: Option<DecodingKey>,
    validation: Validation,
}

impl TokenVerifier {
    /// Verify RS256 signatures against the realm public key. The key is the
    /// base64 body without PEM armor, as Keycloak displays it.
    pub fn from_realm_public_key(key_body: &str) -> Result<Self, AuthError> {
        let pem = format!(
            "-----BEGIN PUBLIC KEY-----\n{}\n-----END PUBLIC KEY-----",
            key_body.trim()
        );
        let key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(AuthError::InvalidKey)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_aud = false;
        Ok(Self {
            key: Some(key),
            validation,
        })
    }

    /// Decode tokens without checking their signature
    pub fn unverified() -> Self {
        Self {
            key: None,
            validation: Validation::new(Algorithm::RS256),
        }
    }

    pub fn verifies_signatures(&self) -> bool {
        self.key.is_some()
    }

    /// Decode and validate a token
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let Some(key) = &self.key else {
            return self.decode_unverified(token);
        };
        let data = decode::<Claims>(token, key, &self.validation).map_err(AuthError::InvalidToken)?;
        Ok(data.claims)
    }

    /// Any algorithm is accepted here; only the expiry is checked, with the
    /// same leeway as verified decoding.
    fn decode_unverified(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = insecure_decode::<Claims>(token)
            .map_err(AuthError::InvalidToken)?
            .claims;
        if claims.exp.saturating_add(self.validation.leeway) < get_current_timestamp() {
            return Err(AuthError::InvalidToken(ErrorKind::ExpiredSignature.into()));
        }
        Ok(claims)
    }
}
