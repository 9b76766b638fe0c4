//! Request gate.
//!
//! Every request is classified by path against an immutable [`RouteTable`].
//! Public routes pass straight through; everything else needs a credential
//! that the configured [`CredentialValidator`] resolves to an identity.
//! The gate keeps no session: each decision depends on the request alone.

mod context;
mod middleware;
mod rules;

use std::sync::Arc;

use axum::http::{HeaderName, Method};
use serde::Serialize;
use utoipa::ToSchema;

pub use context::*;
pub use middleware::*;
pub use rules::*;

use crate::auth::CredentialValidator;
use crate::config::GateSettings;
use crate::error::{GatewayError, GatewayResult};

/// Session handling. Only stateless operation is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionPolicy {
    /// No session is created or read; `Set-Cookie` never leaves the gate.
    Stateless,
}

/// Cross-site request forgery handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsrfPolicy {
    /// Bearer-token clients are not exposed to cookie-riding requests.
    Disabled,
    /// State-changing protected requests must carry this header.
    RequireHeader(HeaderName),
}

impl CsrfPolicy {
    /// The header a request must carry to pass, if any.
    pub fn required_header(&self, method: &Method) -> Option<&HeaderName> {
        match self {
            CsrfPolicy::Disabled => None,
            CsrfPolicy::RequireHeader(name) => {
                let safe = matches!(
                    *method,
                    Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
                );
                (!safe).then_some(name)
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            CsrfPolicy::Disabled => "disabled".to_string(),
            CsrfPolicy::RequireHeader(name) => format!("require_header:{name}"),
        }
    }
}

/// Process-wide gate configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub routes: RouteTable,
    pub session: SessionPolicy,
    pub csrf: CsrfPolicy,
}

impl GateConfig {
    pub fn from_settings(settings: &GateSettings) -> GatewayResult<Self> {
        let routes = RouteTable::with_public_paths(settings.public_paths.as_slice())?;
        let csrf = match settings.csrf_header.as_deref() {
            None => CsrfPolicy::Disabled,
            Some(name) => CsrfPolicy::RequireHeader(HeaderName::try_from(name).map_err(|e| {
                GatewayError::Config(format!("invalid csrf_header '{name}': {e}"))
            })?),
        };

        Ok(Self {
            routes,
            session: SessionPolicy::Stateless,
            csrf,
        })
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            routes: RouteTable::default(),
            session: SessionPolicy::Stateless,
            csrf: CsrfPolicy::Disabled,
        }
    }
}

/// State handed to [`request_gate`]. Cloned per request; nothing inside is
/// mutable.
#[derive(Clone)]
pub struct GateState {
    pub config: Arc<GateConfig>,
    pub validator: Arc<dyn CredentialValidator>,
}

impl GateState {
    pub fn new(config: GateConfig, validator: Arc<dyn CredentialValidator>) -> Self {
        Self {
            config: Arc::new(config),
            validator,
        }
    }
}
