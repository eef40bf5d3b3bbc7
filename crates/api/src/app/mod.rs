//! HTTP API application wiring (Axum router + authorization layers).
//!
//! - `routes/`: HTTP routes + handlers, each route with its guard
//! - `dto.rs`: response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use backoffice_auth::{RoleRepository, TokenVerifier};

use crate::config::ApiConfig;
use crate::middleware::{self, AuthState};

pub mod dto;
pub mod errors;
pub mod routes;

/// Auth state for a loaded configuration.
pub fn auth_state(config: &ApiConfig, repository: Arc<dyn RoleRepository>) -> AuthState {
    let verifier = TokenVerifier::hs256(config.jwt_secret.as_deref().map(str::as_bytes));
    if !verifier.is_configured() {
        tracing::warn!("JWT_SECRET not set; protected routes will answer 500");
    }
    AuthState::new(verifier, repository, config.request_timeout)
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(auth: AuthState) -> Router {
    let protected = routes::router().layer(from_fn_with_state(auth, middleware::auth_middleware));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
