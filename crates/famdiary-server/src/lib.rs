//! famdiary session server.
//!
//! Serves the two cookie-session endpoints the front-end relies on:
//!
//! - `GET /api/auth/me`: who the credential cookie belongs to
//! - `POST /api/auth/logout`: clear the credential cookie
//!
//! The server never issues credentials. It verifies the HS256 token an
//! upstream identity provider placed in the `family_token` cookie.

pub mod config;
pub mod handlers;
pub mod telemetry;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use famdiary_core::auth::{CookieSettings, CredentialVerifier, TokenVerifier};

pub use config::{ConfigError, Environment, ServerConfig};

pub const ME_ROUTE: &str = "/api/auth/me";
pub const LOGOUT_ROUTE: &str = "/api/auth/logout";

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn CredentialVerifier>,
    pub cookies: CookieSettings,
}

impl AppState {
    pub fn new(verifier: Arc<dyn CredentialVerifier>, cookies: CookieSettings) -> Self {
        Self { verifier, cookies }
    }

    /// HS256 verification with the configured secret; `Secure` cookies only
    /// in production.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            Arc::new(TokenVerifier::new(config.jwt_secret.as_bytes())),
            CookieSettings::new(config.environment.is_production()),
        )
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(ME_ROUTE, get(handlers::me))
        .route(LOGOUT_ROUTE, post(handlers::logout))
        .with_state(state)
}
