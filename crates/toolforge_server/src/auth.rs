//! Static API key authentication.
//!
//! Keys are accepted from `Authorization: Bearer <key>` or `X-API-Key`,
//! and compared in constant time.

use http::HeaderMap;
use http::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

/// Alternate header carrying the key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Authentication failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No key was presented
    #[error("Missing API key")]
    Missing,
    /// The presented key is wrong
    #[error("Invalid API key")]
    Invalid,
}

/// Compare two strings without an early exit on the first difference
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Pull the presented key out of the request headers
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            let (scheme, token) = value.split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
        });
    bearer.or_else(|| {
        headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
    })
}

/// API key check shared by the protected routes
#[derive(Debug, Clone, Default)]
pub struct ApiKeyAuth {
    key: Option<SecretString>,
}

impl ApiKeyAuth {
    /// Authenticator for an optional key; `None` lets every request through
    #[must_use]
    pub fn new(key: Option<SecretString>) -> Self {
        Self { key }
    }

    /// Whether a key is configured
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    /// Check the request headers
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when a key is configured and the request does
    /// not present it
    pub fn check(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let Some(expected) = &self.key else {
            return Ok(());
        };
        let presented = presented_key(headers).ok_or(AuthError::Missing)?;
        if constant_time_eq(presented, expected.expose_secret()) {
            Ok(())
        } else {
            Err(AuthError::Invalid)
        }
    }
}
