//! Route definitions for the API.

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::{handlers, ws};
use crate::gate::{request_gate, GateState};
use crate::AppState;

/// Security scheme modifier for OpenAPI.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health_check,
        handlers::info,
        handlers::login,
        handlers::get_current_user,
    ),
    components(schemas(
        crate::api::types::HealthResponse,
        crate::api::types::InfoResponse,
        crate::api::types::LoginRequest,
        crate::api::types::LoginResponse,
        crate::api::types::UserInfo,
        crate::auth::UserRole,
        crate::gate::AccessPolicy,
        crate::gate::SessionPolicy,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "actuator", description = "Health and status endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "Authenticated user endpoints")
    ),
    info(
        title = "Chattingo Gateway API",
        version = "0.1.0",
        description = "Stateless bearer-token gate in front of the Chattingo chat backend",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the API router with the request gate in front of every route.
///
/// The gate wraps the fallback too, so unknown paths outside the public
/// prefixes answer 401 rather than 404 to anonymous callers.
pub fn build_router(state: AppState, gate: GateState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Actuator
        .route("/actuator/health", get(handlers::health_check))
        .route("/actuator/info", get(handlers::info))
        .route(
            "/actuator/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        // Auth
        .route("/api/auth/login", post(handlers::login))
        // Users
        .route("/api/users/me", get(handlers::get_current_user))
        // WebSocket
        .route("/ws/chat", get(ws::chat_socket))
        .fallback(handlers::not_found)
        .with_state(state)
        // Middleware
        .layer(middleware::from_fn_with_state(gate, request_gate))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{
            header::{AUTHORIZATION, CONTENT_TYPE},
            Method, Request, StatusCode,
        },
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::{hash_password, ConfiguredUser, JwtManager, UserRole, UserStore};
    use crate::gate::GateConfig;

    fn app() -> Router {
        let jwt_manager = JwtManager::new("router-test-secret", "chattingo".to_string(), 2);
        let user_store = UserStore::new(vec![ConfiguredUser {
            id: "u1".to_string(),
            username: "alice".to_string(),
            password_hash: hash_password("password123"),
            role: UserRole::User,
        }]);
        let gate = GateState::new(GateConfig::default(), Arc::new(jwt_manager.clone()));
        let state = AppState {
            jwt_manager,
            user_store,
            gate: gate.config.clone(),
        };
        build_router(state, gate)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn login_request(username: &str, password: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "username": username, "password": password }).to_string(),
            ))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let response = app().oneshot(get("/actuator/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "UP");
    }

    #[tokio::test]
    async fn test_info_reports_gate_configuration() {
        let response = app().oneshot(get("/actuator/info")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(
            body["public_paths"],
            json!(["/actuator/**", "/api/auth/**", "/ws/**"])
        );
        assert_eq!(body["default_policy"], "requires_auth");
        assert_eq!(body["session"], "stateless");
        assert_eq!(body["csrf"], "disabled");
    }

    #[tokio::test]
    async fn test_openapi_document_is_public() {
        let response = app().oneshot(get("/actuator/openapi.json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["paths"]["/api/auth/login"].is_object());
    }

    #[tokio::test]
    async fn test_websocket_upgrade_is_not_gated() {
        let response = app().oneshot(get("/ws/chat")).await.unwrap();
        // Not a real upgrade, so the extractor refuses it, but the gate let it through.
        assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
        assert_ne!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_websocket_echo_over_tcp_without_credentials() {
        use futures::{SinkExt, StreamExt};
        use std::time::Duration;
        use tokio_tungstenite::{connect_async, tungstenite::Message};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app()).await });

        let (mut socket, response) = connect_async(format!("ws://{addr}/ws/chat"))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 101);
        assert!(response.headers().get("set-cookie").is_none());

        socket.send(Message::Ping(b"hb".to_vec().into())).await.unwrap();
        socket.send(Message::text("hello")).await.unwrap();

        let mut ponged = false;
        let echoed = tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(frame) = socket.next().await {
                match frame.unwrap() {
                    Message::Pong(payload) => {
                        assert_eq!(&payload[..], b"hb");
                        ponged = true;
                    }
                    Message::Text(text) => return text.as_str().to_string(),
                    other => panic!("unexpected frame: {other:?}"),
                }
            }
            panic!("socket closed before the echo arrived");
        })
        .await
        .unwrap();

        assert_eq!(echoed, "hello");
        assert!(ponged);
        socket.close(None).await.unwrap();
    }

    #[tokio::test]
    async fn test_login_with_malformed_body_is_a_json_400() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "INVALID_BODY");

        let missing_field = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "username": "alice" }).to_string()))
            .unwrap();
        let response = app().oneshot(missing_field).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "INVALID_BODY");
    }

    #[tokio::test]
    async fn test_anonymous_request_to_protected_path() {
        for uri in ["/api/messages", "/api/users/me", "/swagger-ui"] {
            let response = app().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(json_body(response).await["code"], "UNAUTHENTICATED");
        }
    }

    #[tokio::test]
    async fn test_login_then_access_protected_route() {
        let app = app();

        let response = app
            .clone()
            .oneshot(login_request("alice", "password123"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("set-cookie").is_none());

        let body = json_body(response).await;
        assert_eq!(body["token_type"], "Bearer");
        assert_eq!(body["expires_in"], 7200);
        assert_eq!(body["user"]["id"], "u1");
        let token = body["token"].as_str().unwrap().to_string();

        let me = Request::builder()
            .uri("/api/users/me")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(me).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["id"], "u1");
        assert_eq!(body["username"], "alice");
        assert_eq!(body["role"], "user");

        // Admitted by the gate, then no route matches.
        let messages = Request::builder()
            .uri("/api/messages")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(messages).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let response = app()
            .oneshot(login_request("alice", "nope"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["code"], "INVALID_CREDENTIALS");
    }
}
