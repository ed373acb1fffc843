//! Authentication module for the parlour server.
//!
//! This module provides:
//! - Guest sign-in and OAuth sign-in (Discord, GitHub, Google)
//! - Signed session cookies (stateless; nothing is stored server-side)
//! - A session extractor for Axum routes
//!
//! # Session Model
//!
//! A sign-in from any provider produces an [`Identity`](parlour_identity::Identity),
//! which is turned into a signed session token and stored in the session
//! cookie. Every request re-verifies the cookie and projects it into a
//! [`SessionView`](parlour_identity::SessionView). The token is never
//! rewritten; signing in again replaces it.

pub mod middleware;
pub mod oauth;
pub mod routes;

use crate::config::{ServerConfig, SessionConfig};
use parlour_identity::{AuthConfigurator, ConfigurationError};
use rootcause::Report;

pub use middleware::OptionalSession;
pub use oauth::{OAuthClient, OAuthClients};
pub use routes::{guest_callback, oauth_callback, oauth_signin, providers, session, signout};

/// Session cookie name.
pub const SESSION_COOKIE: &str = "parlour_session";

/// Cookie holding OAuth flow state between sign-in and callback.
pub const OAUTH_STATE_COOKIE: &str = "parlour_oauth_state";

/// Shared application state.
pub struct AppState {
    /// Provider registry, guest authorization and session tokens.
    pub auth: AuthConfigurator,
    /// OAuth clients for the registered OAuth providers.
    pub oauth_clients: OAuthClients,
    /// HTTP client for token exchange and profile requests.
    pub http_client: reqwest::Client,
    /// Session configuration.
    pub session_config: SessionConfig,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        auth: AuthConfigurator,
        oauth_clients: OAuthClients,
        http_client: reqwest::Client,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            auth,
            oauth_clients,
            http_client,
            session_config,
        }
    }

    /// Builds the application state from server configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] report if the signing secret is blank,
    /// the session lifetime is out of range, an OAuth redirect URI cannot be
    /// built, or the HTTP client fails to initialize. All of these are fatal
    /// at startup.
    pub fn from_config(config: &ServerConfig) -> Result<Self, Report<ConfigurationError>> {
        let secret = config.signing_secret()?;
        let lifetime = parlour_identity::session_lifetime(config.session.max_age_minutes)?;
        let auth = AuthConfigurator::new(&config.provider_settings(), &secret)
            .with_session_lifetime(lifetime);
        let oauth_clients = OAuthClients::from_registry(auth.registry(), &config.app_url)?;

        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ConfigurationError::HttpClient {
                reason: e.to_string(),
            })?;

        Ok(Self::new(
            auth,
            oauth_clients,
            http_client,
            config.session.clone(),
        ))
    }
}
