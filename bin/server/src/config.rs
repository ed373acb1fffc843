//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables.
//!
//! Provider credentials are read flat (`GITHUB_ID`, `GITHUB_SECRET`, ...) and
//! resolved into a [`ProviderSettings`] once at startup. Values are kept as
//! strings; an empty variable counts as unset.

use parlour_identity::{ConfigurationError, ProviderSettings, SigningSecret};
use rootcause::Report;
use serde::Deserialize;

/// Server configuration.
#[derive(Clone, Deserialize)]
pub struct ServerConfig {
    /// Secret session tokens are signed with. Required.
    pub auth_secret: String,

    /// Public base URL, used to build OAuth redirect URIs.
    #[serde(default = "default_app_url")]
    pub app_url: String,

    /// Address to listen on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default)]
    pub discord_client_id: Option<String>,
    #[serde(default)]
    pub discord_client_secret: Option<String>,
    #[serde(default)]
    pub github_id: Option<String>,
    #[serde(default)]
    pub github_secret: Option<String>,
    #[serde(default)]
    pub google_client_id: Option<String>,
    #[serde(default)]
    pub google_client_secret: Option<String>,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session token lifetime in minutes.
    #[serde(default = "default_max_age_minutes")]
    pub max_age_minutes: i64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

fn default_app_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_max_age_minutes() -> i64 {
    parlour_identity::DEFAULT_SESSION_LIFETIME_MINUTES
}

fn default_secure_cookies() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_age_minutes: default_max_age_minutes(),
            secure_cookies: default_secure_cookies(),
        }
    }
}

/// Environment source: `__` nests (`SESSION__MAX_AGE_MINUTES`), empty
/// values are dropped.
fn environment() -> config::Environment {
    config::Environment::default()
        .separator("__")
        .ignore_empty(true)
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_builder(config::Config::builder().add_source(environment()))
    }

    /// Loads configuration from an arbitrary config builder.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, config::ConfigError> {
        builder.build()?.try_deserialize()
    }

    /// Resolves the provider credentials.
    #[must_use]
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings::new()
            .discord(
                self.discord_client_id.clone(),
                self.discord_client_secret.clone(),
            )
            .github(self.github_id.clone(), self.github_secret.clone())
            .google(
                self.google_client_id.clone(),
                self.google_client_secret.clone(),
            )
    }

    /// Validates the signing secret.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::EmptySigningSecret`] for a blank secret.
    pub fn signing_secret(&self) -> Result<SigningSecret, Report<ConfigurationError>> {
        SigningSecret::new(self.auth_secret.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlour_identity::ProviderKind;

    fn load(json: &str) -> Result<ServerConfig, config::ConfigError> {
        ServerConfig::from_builder(
            config::Config::builder()
                .add_source(config::File::from_str(json, config::FileFormat::Json)),
        )
    }

    fn load_env(vars: &[(&str, &str)]) -> Result<ServerConfig, config::ConfigError> {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_builder(
            config::Config::builder().add_source(environment().source(Some(map))),
        )
    }

    #[test]
    fn session_config_has_correct_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.max_age_minutes, 30 * 24 * 60);
        assert!(config.secure_cookies);
    }

    #[test]
    fn missing_auth_secret_fails_to_load() {
        assert!(load("{}").is_err());
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = load(r#"{ "auth_secret": "s3cret" }"#).expect("load");
        assert_eq!(config.app_url, "http://localhost:3000");
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert!(config.signing_secret().is_ok());
        assert_eq!(
            parlour_identity::build_provider_list(&config.provider_settings()).len(),
            1
        );
    }

    #[test]
    fn blank_auth_secret_is_rejected() {
        let config = load(r#"{ "auth_secret": "" }"#).expect("load");
        assert!(config.signing_secret().is_err());
    }

    #[test]
    fn provider_settings_follow_credential_pairs() {
        let config = load(
            r#"{
                "auth_secret": "s3cret",
                "github_id": "gh-id",
                "github_secret": "gh-secret",
                "discord_client_id": "1234",
                "google_client_id": "g-id",
                "google_client_secret": ""
            }"#,
        )
        .expect("load");

        let settings = config.provider_settings();
        assert!(settings.credentials(ProviderKind::GitHub).is_some());
        assert!(settings.credentials(ProviderKind::Discord).is_none());
        assert!(settings.credentials(ProviderKind::Google).is_none());
    }

    #[test]
    fn nested_session_config_loads() {
        let config = load(
            r#"{
                "auth_secret": "s3cret",
                "session": { "max_age_minutes": 15, "secure_cookies": false }
            }"#,
        )
        .expect("load");
        assert_eq!(config.session.max_age_minutes, 15);
        assert!(!config.session.secure_cookies);
    }

    #[test]
    fn env_values_are_kept_verbatim() {
        let config = load_env(&[
            ("AUTH_SECRET", "0042"),
            ("GITHUB_ID", "007"),
            ("GITHUB_SECRET", "1e3"),
            ("DISCORD_CLIENT_ID", "true"),
            ("DISCORD_CLIENT_SECRET", "12.50"),
        ])
        .expect("load");
        assert_eq!(config.auth_secret, "0042");
        assert_eq!(config.github_id.as_deref(), Some("007"));
        assert_eq!(config.github_secret.as_deref(), Some("1e3"));
        assert_eq!(config.discord_client_id.as_deref(), Some("true"));
        assert_eq!(config.discord_client_secret.as_deref(), Some("12.50"));
    }

    #[test]
    fn env_session_values_are_parsed() {
        let config = load_env(&[
            ("AUTH_SECRET", "s3cret"),
            ("SESSION__MAX_AGE_MINUTES", "15"),
            ("SESSION__SECURE_COOKIES", "false"),
        ])
        .expect("load");
        assert_eq!(config.session.max_age_minutes, 15);
        assert!(!config.session.secure_cookies);
    }

    #[test]
    fn empty_env_values_fall_back_to_defaults() {
        let config = load_env(&[
            ("AUTH_SECRET", "s3cret"),
            ("APP_URL", ""),
            ("BIND_ADDR", ""),
            ("SESSION__MAX_AGE_MINUTES", ""),
            ("GITHUB_ID", ""),
            ("GITHUB_SECRET", "gh-secret"),
        ])
        .expect("load");
        assert_eq!(config.app_url, "http://localhost:3000");
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(
            config.session.max_age_minutes,
            parlour_identity::DEFAULT_SESSION_LIFETIME_MINUTES
        );
        assert!(config.github_id.is_none());
        assert!(
            config
                .provider_settings()
                .credentials(ProviderKind::GitHub)
                .is_none()
        );
    }

    #[test]
    fn empty_env_auth_secret_is_missing() {
        assert!(load_env(&[("AUTH_SECRET", "")]).is_err());
        assert!(load_env(&[]).is_err());
    }
}
