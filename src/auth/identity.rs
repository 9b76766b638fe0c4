//! Credential validation seam used by the request gate.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use serde::Serialize;
use thiserror::Error;

use crate::auth::UserRole;

/// Identity resolved from a request credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Stable user ID.
    pub subject: String,
    pub username: String,
    pub role: UserRole,
}

/// Why a credential could not be resolved to an identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("no credential presented")]
    MissingCredential,
    #[error("credential is not a bearer token")]
    MalformedCredential,
    #[error("credential rejected: {0}")]
    InvalidCredential(String),
}

/// Resolves the credential carried by a request into an identity.
///
/// Implementations only look at the request itself; nothing is remembered
/// between calls.
pub trait CredentialValidator: Send + Sync {
    fn validate(&self, headers: &HeaderMap) -> Result<Identity, AuthFailure>;
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthFailure> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthFailure::MissingCredential)?
        .to_str()
        .map_err(|_| AuthFailure::MalformedCredential)?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or(AuthFailure::MalformedCredential)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthFailure::MalformedCredential);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthFailure::MalformedCredential);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def")), Ok("abc.def"));
        assert_eq!(bearer_token(&headers_with("bearer abc")), Ok("abc"));
    }

    #[test]
    fn test_missing_and_malformed() {
        assert_eq!(
            bearer_token(&HeaderMap::new()),
            Err(AuthFailure::MissingCredential)
        );
        assert_eq!(
            bearer_token(&headers_with("Basic dXNlcjpwYXNz")),
            Err(AuthFailure::MalformedCredential)
        );
        assert_eq!(
            bearer_token(&headers_with("Bearer ")),
            Err(AuthFailure::MalformedCredential)
        );
        assert_eq!(
            bearer_token(&headers_with("token-without-scheme")),
            Err(AuthFailure::MalformedCredential)
        );
    }
}
