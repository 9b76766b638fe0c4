//! HTTP request handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::Uri,
    Json,
};

use crate::api::types::*;
use crate::error::{GatewayError, GatewayResult};
use crate::gate::CurrentUser;
use crate::AppState;

// ==================== Actuator Endpoints ====================

/// Liveness check.
///
/// GET /actuator/health
#[utoipa::path(
    get,
    path = "/actuator/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "actuator"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Build information and the active gate configuration.
///
/// GET /actuator/info
#[utoipa::path(
    get,
    path = "/actuator/info",
    responses(
        (status = 200, description = "Service information", body = InfoResponse)
    ),
    tag = "actuator"
)]
pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        public_paths: state.gate.routes.public_patterns(),
        default_policy: state.gate.routes.fallback(),
        session: state.gate.session,
        csrf: state.gate.csrf.describe(),
    })
}

// ==================== Authentication Endpoints ====================

/// Exchange username and password for a bearer token.
///
/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Malformed request body"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> GatewayResult<Json<LoginResponse>> {
    let Json(request) = payload?;
    let user = state
        .user_store
        .authenticate(&request.username, &request.password)
        .ok_or_else(|| {
            tracing::warn!(username = %request.username, "Failed login attempt");
            GatewayError::invalid_credentials("Invalid username or password")
        })?;

    let token = state
        .jwt_manager
        .generate_token(&user.id, &user.username, user.role)?;

    tracing::info!(
        user_id = %user.id,
        username = %user.username,
        role = ?user.role,
        "User logged in"
    );

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_manager.token_duration_hours().saturating_mul(3600),
        user: UserInfo {
            id: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
        },
    }))
}

// ==================== User Endpoints ====================

/// Identity resolved from the bearer token.
///
/// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user info", body = UserInfo),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_current_user(CurrentUser(identity): CurrentUser) -> Json<UserInfo> {
    Json(identity.into())
}

pub async fn not_found(uri: Uri) -> GatewayError {
    GatewayError::NotFound(format!("No route for {}", uri.path()))
}
