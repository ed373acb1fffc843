//! The identity/session configurator.
//!
//! [`AuthConfigurator`] decides which sign-in methods are available and how a
//! successful authorization from any of them becomes a long-lived session.
//! It is built once at startup from resolved settings and shared immutably.

use chrono::{Duration, Utc};
use parlour_core::{GuestIdAllocator, RandomGuestIds, Result};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::{ConfigurationError, TokenError};
use crate::identity::Identity;
use crate::provider::{ProviderDescriptor, ProviderRegistry, ProviderSettings};
use crate::session::{self, SessionToken, SessionView};
use crate::signing::{SigningSecret, TokenSigner};

/// Default session lifetime: 30 days.
pub const DEFAULT_SESSION_LIFETIME_MINUTES: i64 = 30 * 24 * 60;

/// Longest accepted session lifetime: 366 days.
pub const MAX_SESSION_LIFETIME_MINUTES: i64 = 366 * 24 * 60;

/// Checks a configured session lifetime.
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidSessionLifetime`] unless `minutes` is
/// positive and at most [`MAX_SESSION_LIFETIME_MINUTES`].
pub fn session_lifetime(minutes: i64) -> Result<Duration, ConfigurationError> {
    if !(1..=MAX_SESSION_LIFETIME_MINUTES).contains(&minutes) {
        return Err(ConfigurationError::InvalidSessionLifetime { minutes }.into());
    }
    Duration::try_minutes(minutes)
        .ok_or_else(|| ConfigurationError::InvalidSessionLifetime { minutes }.into())
}

/// Builds provider lists, authorizes guests and shapes session tokens.
#[derive(Debug, Clone)]
pub struct AuthConfigurator {
    registry: ProviderRegistry,
    guest_ids: Arc<dyn GuestIdAllocator>,
    signer: TokenSigner,
    session_lifetime: Duration,
}

impl AuthConfigurator {
    /// Creates a configurator with random guest ids and the default session
    /// lifetime.
    #[must_use]
    pub fn new(settings: &ProviderSettings, secret: &SigningSecret) -> Self {
        let registry = ProviderRegistry::from_settings(settings);
        debug!(providers = ?registry.kinds(), "built provider registry");
        Self {
            registry,
            guest_ids: Arc::new(RandomGuestIds),
            signer: TokenSigner::new(secret),
            session_lifetime: Duration::minutes(DEFAULT_SESSION_LIFETIME_MINUTES),
        }
    }

    /// Replaces the guest id allocator.
    #[must_use]
    pub fn with_guest_ids(mut self, guest_ids: Arc<dyn GuestIdAllocator>) -> Self {
        self.guest_ids = guest_ids;
        self
    }

    /// Sets how long issued sessions stay valid.
    #[must_use]
    pub fn with_session_lifetime(mut self, lifetime: Duration) -> Self {
        self.session_lifetime = lifetime;
        self
    }

    /// Returns the provider registry.
    #[must_use]
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Returns the enabled providers in registration order.
    #[must_use]
    pub fn build_provider_list(&self) -> &[ProviderDescriptor] {
        self.registry.providers()
    }

    /// Returns the session lifetime.
    #[must_use]
    pub fn session_lifetime(&self) -> Duration {
        self.session_lifetime
    }

    /// Authorizes a guest.
    ///
    /// Always succeeds. Every call allocates a fresh id, so two calls with
    /// the same nickname yield two different identities.
    #[instrument(skip_all)]
    pub fn authorize_guest(&self, nickname: Option<&str>) -> Identity {
        let identity = Identity::guest(self.guest_ids.allocate(), nickname);
        debug!(guest_id = %identity.id(), "authorized guest");
        identity
    }

    /// Stamps the identity's role onto the token. See [`session::enrich_token`].
    #[must_use]
    pub fn enrich_token(&self, token: SessionToken, identity: Option<&Identity>) -> SessionToken {
        session::enrich_token(token, identity)
    }

    /// Derives the visible session. See [`session::project_session`].
    #[must_use]
    pub fn project_session(&self, token: &SessionToken) -> SessionView {
        session::project_session(token)
    }

    /// Builds the session token for a sign-in by `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::ExpiryOutOfRange`] if the session lifetime
    /// pushes the expiry past the representable range.
    pub fn issue_token(&self, identity: &Identity) -> Result<SessionToken, TokenError> {
        let token = SessionToken::for_identity(identity, Utc::now(), self.session_lifetime)?;
        Ok(self.enrich_token(token, Some(identity)))
    }

    /// Issues and signs the session token for a sign-in by `identity`.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] report if the token cannot be built or
    /// signed.
    pub fn sign_in(&self, identity: &Identity) -> Result<String, TokenError> {
        let token = self.issue_token(identity)?;
        let encoded = self.signer.encode(&token)?;
        debug!(subject = %identity.id(), role = %identity.role(), "issued session token");
        Ok(encoded)
    }

    /// Verifies a signed session token and runs it through enrichment, as
    /// every request does.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] report if the token is invalid or expired.
    pub fn read_session(&self, encoded: &str) -> Result<SessionToken, TokenError> {
        let token = self.signer.decode(encoded)?;
        Ok(self.enrich_token(token, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderKind;
    use crate::role::Role;
    use parlour_core::{IdentityId, SequentialGuestIds};

    fn secret() -> SigningSecret {
        SigningSecret::new("parlour-test-secret".to_string()).expect("secret")
    }

    fn configurator() -> AuthConfigurator {
        AuthConfigurator::new(&ProviderSettings::new(), &secret())
    }

    #[test]
    fn guest_is_always_registered() {
        let kinds: Vec<ProviderKind> = configurator()
            .build_provider_list()
            .iter()
            .map(ProviderDescriptor::kind)
            .collect();
        assert_eq!(kinds, vec![ProviderKind::Guest]);
    }

    #[test]
    fn authorize_guest_normalizes_nickname() {
        let auth = configurator();
        for (input, expected) in [
            (Some("  Chip "), "Chip"),
            (Some(""), "Guest"),
            (Some(" \t "), "Guest"),
            (None, "Guest"),
        ] {
            assert_eq!(auth.authorize_guest(input).display_name(), expected);
        }
    }

    #[test]
    fn authorize_guest_ids_have_guest_shape() {
        let auth = configurator();
        let first = auth.authorize_guest(Some("Chip"));
        let second = auth.authorize_guest(Some("Chip"));
        assert!(IdentityId::parse_guest(first.id().as_str()).is_ok());
        assert!(IdentityId::parse_guest(second.id().as_str()).is_ok());
        assert_eq!(first.role(), Role::Guest);
    }

    #[test]
    fn authorize_guest_uses_injected_allocator() {
        let auth = configurator().with_guest_ids(Arc::new(SequentialGuestIds::new()));
        assert_eq!(auth.authorize_guest(None).id().as_str(), "guest-00000000");
        assert_eq!(auth.authorize_guest(None).id().as_str(), "guest-00000001");
    }

    #[test]
    fn issued_token_carries_identity_role() {
        let auth = configurator();
        let identity = Identity::authenticated(
            IdentityId::for_provider("github", "42"),
            "Octo".to_string(),
        );
        let token = auth.issue_token(&identity).expect("issue");
        assert_eq!(token.role(), Some(Role::Authenticated));
        assert_eq!(token.subject(), Some(identity.id()));
    }

    #[test]
    fn sign_in_then_read_round_trips_session() {
        let auth = configurator().with_session_lifetime(Duration::minutes(10));
        let identity = auth.authorize_guest(Some("Lou"));
        let encoded = auth.sign_in(&identity).expect("sign in");

        let token = auth.read_session(&encoded).expect("read session");
        let view = auth.project_session(&token);
        assert_eq!(view.user.id, identity.id().as_str());
        assert_eq!(view.user.role, Role::Guest);
        assert_eq!(view.user.name.as_deref(), Some("Lou"));
        assert_eq!(token.expires_at() - token.issued_at(), 600);
    }

    #[test]
    fn session_lifetime_accepts_sane_values() {
        assert_eq!(session_lifetime(15).expect("lifetime"), Duration::minutes(15));
        assert_eq!(
            session_lifetime(DEFAULT_SESSION_LIFETIME_MINUTES).expect("lifetime"),
            Duration::days(30)
        );
        assert!(session_lifetime(MAX_SESSION_LIFETIME_MINUTES).is_ok());
    }

    #[test]
    fn session_lifetime_rejects_out_of_range_values() {
        for minutes in [
            0,
            -5,
            MAX_SESSION_LIFETIME_MINUTES + 1,
            1_000_000_000_000,
            i64::MAX,
            i64::MIN,
        ] {
            let err = session_lifetime(minutes).expect_err("should be rejected");
            assert!(err.to_string().contains("invalid session lifetime"), "{minutes}");
        }
    }

    #[test]
    fn sign_in_with_overflowing_lifetime_is_an_error() {
        let auth = configurator().with_session_lifetime(Duration::MAX);
        let err = auth
            .sign_in(&auth.authorize_guest(None))
            .expect_err("should not panic or sign");
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn read_session_rejects_foreign_tokens() {
        let other = AuthConfigurator::new(
            &ProviderSettings::new(),
            &SigningSecret::new("someone-else".to_string()).expect("secret"),
        );
        let encoded = other
            .sign_in(&other.authorize_guest(None))
            .expect("sign in");
        assert!(configurator().read_session(&encoded).is_err());
    }
}
