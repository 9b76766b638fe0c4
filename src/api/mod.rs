//! HTTP API layer for the Chattingo gateway.
//!
//! Actuator, login, current-user and WebSocket endpoints, all mounted
//! behind the request gate.

pub mod handlers;
mod routes;
mod types;
mod ws;

pub use routes::build_router;
