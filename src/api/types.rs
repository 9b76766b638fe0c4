//! API request and response types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{Identity, UserRole};
use crate::gate::{AccessPolicy, SessionPolicy};

// ==================== Actuator ====================

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `UP` while the process serves requests.
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Build and security summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    /// Patterns admitted without a credential, in evaluation order.
    pub public_paths: Vec<String>,
    /// Policy for every path no public pattern matches.
    pub default_policy: AccessPolicy,
    pub session: SessionPolicy,
    pub csrf: String,
}

// ==================== Authentication ====================

/// Login request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// JWT to send as `Authorization: Bearer <token>`.
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// User information.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub role: UserRole,
}

impl From<Identity> for UserInfo {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.subject,
            username: identity.username,
            role: identity.role,
        }
    }
}
