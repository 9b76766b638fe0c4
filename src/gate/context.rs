//! Per-request gate outcome, handed to downstream handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::Identity;
use crate::error::GatewayError;
use crate::gate::AccessPolicy;

/// Created when a request enters the gate, dropped with the request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub policy: AccessPolicy,
    /// Only set on protected routes; public routes never resolve credentials.
    pub identity: Option<Identity>,
}

impl RequestContext {
    pub fn public() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            policy: AccessPolicy::Public,
            identity: None,
        }
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            policy: AccessPolicy::RequiresAuth,
            identity: Some(identity),
        }
    }
}

/// Extractor for the identity the gate attached to this request.
///
/// Rejects with 401 when the request passed the gate without one, i.e. a
/// handler mounted under a public prefix asked for a user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .and_then(|ctx| ctx.identity.clone())
            .map(CurrentUser)
            .ok_or_else(|| GatewayError::unauthenticated("Authentication required"))
    }
}
