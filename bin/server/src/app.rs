//! HTTP routing for the parlour server.

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::catalog;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Sign-in surface
        .route("/auth/providers", get(auth::providers))
        .route("/auth/sign-in", get(auth::providers))
        // Sign-in flows
        .route("/auth/callback/guest", post(auth::guest_callback))
        .route("/auth/signin/{provider}", get(auth::oauth_signin))
        .route("/auth/callback/{provider}", get(auth::oauth_callback))
        // Session
        .route("/auth/session", get(auth::session))
        .route("/auth/signout", get(auth::signout))
        // Content
        .route("/api/games", get(catalog::games))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
