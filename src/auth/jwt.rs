//! JWT bearer tokens for chat clients.

use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{bearer_token, AuthFailure, CredentialValidator, Identity};
use crate::error::{GatewayError, GatewayResult};

/// JWT claims for authenticated users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,
    pub username: String,
    pub role: UserRole,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at time (Unix timestamp).
    pub iat: i64,
    pub iss: String,
}

/// User roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Admin,
}

/// JWT token manager.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    /// Token validity duration in hours.
    token_duration_hours: i64,
}

impl JwtManager {
    /// Create a new JWT manager with the given secret.
    pub fn new(secret: &str, issuer: String, token_duration_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            token_duration_hours,
        }
    }

    pub fn token_duration_hours(&self) -> i64 {
        self.token_duration_hours
    }

    /// Generate a JWT token for a user.
    pub fn generate_token(
        &self,
        user_id: &str,
        username: &str,
        role: UserRole,
    ) -> GatewayResult<String> {
        self.generate_token_at(user_id, username, role, Utc::now().timestamp())
    }

    fn generate_token_at(
        &self,
        user_id: &str,
        username: &str,
        role: UserRole,
        issued_at: i64,
    ) -> GatewayResult<String> {
        let exp = Duration::try_hours(self.token_duration_hours)
            .and_then(|lifetime| issued_at.checked_add(lifetime.num_seconds()))
            .ok_or_else(|| {
                GatewayError::Internal(format!(
                    "Token lifetime of {} hours is out of range",
                    self.token_duration_hours
                ))
            })?;

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role,
            exp,
            iat: issued_at,
            iss: self.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| GatewayError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a JWT token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthFailure> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let token_data: TokenData<Claims> =
            decode(token, &self.decoding_key, &validation).map_err(|e| {
                tracing::debug!(error = %e, "JWT validation failed");
                AuthFailure::InvalidCredential(e.to_string())
            })?;

        Ok(token_data.claims)
    }
}

impl CredentialValidator for JwtManager {
    fn validate(&self, headers: &HeaderMap) -> Result<Identity, AuthFailure> {
        let claims = self.validate_token(bearer_token(headers)?)?;
        Ok(Identity {
            subject: claims.sub,
            username: claims.username,
            role: claims.role,
        })
    }
}
