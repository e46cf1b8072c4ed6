//! Stateless session tokens: HS256-signed JWTs bound to a username.
//!
//! Tokens are self-contained; nothing is persisted. A token is accepted iff
//! its signature verifies against the process-wide secret and its expiry is
//! in the future. Resolving the embedded username to a live account happens
//! at the request boundary (see `auth::extract`), not here.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
}

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username the session belongs to.
    pub sub: String,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Expiry, Unix seconds.
    pub exp: i64,
}

/// Issues and verifies session tokens with a fixed forward expiry window.
///
/// Pure in-process construction: `issue` and `verify` perform no I/O, so the
/// service stays clonable and cheap to share across request handlers.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Produce a signed credential for `username`, valid for the configured
    /// window starting now.
    pub fn issue(&self, username: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| AuthError::Malformed)
    }

    /// Check signature and expiry, returning the embedded claims.
    ///
    /// Expiry is enforced with zero leeway: a token one second past its
    /// window is already `Expired`.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("unit-test-secret", 3600)
    }

    #[test]
    fn issued_token_verifies_until_expiry() {
        let svc = service();
        let token = svc.issue("alice").unwrap();

        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn expired_token_is_rejected() {
        // A negative window produces a token already past its expiry.
        let svc = TokenService::new("unit-test-secret", -10);
        let token = svc.issue("alice").unwrap();

        assert_eq!(svc.verify(&token).unwrap_err(), AuthError::Expired);
    }

    #[test]
    fn foreign_secret_is_rejected_as_invalid_signature() {
        let token = service().issue("alice").unwrap();
        let other = TokenService::new("a-different-secret", 3600);

        assert_eq!(other.verify(&token).unwrap_err(), AuthError::InvalidSignature);
    }

    #[test]
    fn truncated_token_is_malformed() {
        let svc = service();
        let token = svc.issue("alice").unwrap();
        let truncated = &token[..token.len() / 2];

        // Cutting a JWT in half destroys its structure before the signature
        // is ever checked.
        assert_eq!(svc.verify(truncated).unwrap_err(), AuthError::Malformed);
    }

    #[test]
    fn garbage_token_is_malformed() {
        assert_eq!(service().verify("not-a-jwt").unwrap_err(), AuthError::Malformed);
    }
}
