//! Admission middleware for axum.

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::Response,
};

use crate::auth::AuthFailure;
use crate::error::GatewayError;
use crate::gate::{AccessPolicy, GateState, RequestContext, SessionPolicy};

/// Classify the request, resolve its identity when the route needs one,
/// then hand it on with a [`RequestContext`] attached.
pub async fn request_gate(
    State(gate): State<GateState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, GatewayError> {
    let path = request.uri().path();
    if !super::is_normalized(path) {
        tracing::warn!(method = %request.method(), path = %path, "Rejected non-normalized path");
        return Err(GatewayError::BadRequest {
            code: "MALFORMED_PATH",
            message: "Request path must be normalized".to_string(),
        });
    }

    let context = match gate.config.routes.classify(path) {
        AccessPolicy::Public => RequestContext::public(),
        AccessPolicy::RequiresAuth => {
            let identity = gate.validator.validate(request.headers()).map_err(|failure| {
                tracing::debug!(
                    method = %request.method(),
                    path = %request.uri().path(),
                    reason = %failure,
                    "Rejected unauthenticated request"
                );
                match failure {
                    AuthFailure::MissingCredential => {
                        GatewayError::unauthenticated("Authentication required")
                    }
                    AuthFailure::MalformedCredential | AuthFailure::InvalidCredential(_) => {
                        GatewayError::invalid_credentials("Invalid or expired token")
                    }
                }
            })?;

            if let Some(header) = gate.config.csrf.required_header(request.method()) {
                if !request.headers().contains_key(header) {
                    tracing::warn!(
                        method = %request.method(),
                        path = %request.uri().path(),
                        header = %header,
                        "Rejected state-changing request without CSRF header"
                    );
                    return Err(GatewayError::Forbidden {
                        code: "CSRF_HEADER_MISSING",
                        message: format!("Missing required header {header}"),
                    });
                }
            }

            RequestContext::authenticated(identity)
        }
    };

    tracing::debug!(
        request_id = %context.request_id,
        policy = ?context.policy,
        subject = context.identity.as_ref().map(|i| i.subject.as_str()),
        "Request admitted"
    );
    request.extensions_mut().insert(context);

    let mut response = next.run(request).await;

    match gate.config.session {
        SessionPolicy::Stateless => {
            if response.headers().contains_key(SET_COOKIE) {
                tracing::warn!("Dropping Set-Cookie from response under stateless session policy");
                response.headers_mut().remove(SET_COOKIE);
            }
        }
    }

    Ok(response)
}
