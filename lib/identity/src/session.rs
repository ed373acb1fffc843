//! Session tokens and the session view derived from them.
//!
//! A session token is created once at sign-in and then only read; a new
//! sign-in replaces it wholesale. Two callbacks shape it:
//! - [`enrich_token`] runs on every authentication event and stamps the
//!   identity's role onto the token.
//! - [`project_session`] derives the externally visible [`SessionView`].

use chrono::{DateTime, Duration, Utc};
use parlour_core::{IdentityId, Result};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;
use crate::identity::Identity;
use crate::role::Role;

/// Subject reported for a token that carries none.
pub const ANONYMOUS_SUBJECT: &str = "guest";

/// Claims carried by a signed session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    /// Identity id the session belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<IdentityId>,
    /// Role stamped by [`enrich_token`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
    /// Display name at sign-in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    /// Issued-at, seconds since the epoch.
    iat: i64,
    /// Expiry, seconds since the epoch.
    exp: i64,
}

impl SessionToken {
    /// Creates a token with no subject and no role.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::ExpiryOutOfRange`] if `issued_at + lifetime`
    /// overflows.
    pub fn new(issued_at: DateTime<Utc>, lifetime: Duration) -> Result<Self, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(lifetime)
            .ok_or(TokenError::ExpiryOutOfRange)?;
        Ok(Self {
            sub: None,
            role: None,
            name: None,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    /// Creates the token for a freshly authorized identity.
    ///
    /// The role is left unset; [`enrich_token`] stamps it.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::ExpiryOutOfRange`] if the expiry overflows.
    pub fn for_identity(
        identity: &Identity,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, TokenError> {
        Ok(Self::new(issued_at, lifetime)?
            .with_subject(identity.id().clone())
            .with_name(identity.display_name().to_string()))
    }

    /// Sets the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: IdentityId) -> Self {
        self.sub = Some(subject);
        self
    }

    /// Sets the role.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    /// Returns the subject, if any.
    #[must_use]
    pub fn subject(&self) -> Option<&IdentityId> {
        self.sub.as_ref()
    }

    /// Returns the stored role, if any.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Returns the display name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns when the token was issued.
    #[must_use]
    pub fn issued_at(&self) -> i64 {
        self.iat
    }

    /// Returns when the token expires.
    #[must_use]
    pub fn expires_at(&self) -> i64 {
        self.exp
    }

    /// Returns true if the token has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// Stamps the identity's role onto the token.
///
/// `identity` is present only on the authentication event that created the
/// session; on every later read the token comes back untouched.
#[must_use]
pub fn enrich_token(token: SessionToken, identity: Option<&Identity>) -> SessionToken {
    match identity {
        Some(identity) => token.with_role(identity.role()),
        None => token,
    }
}

/// The user part of a session view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Externally visible session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub user: SessionUser,
}

/// Projects a token into the session view.
///
/// A missing subject reads as `"guest"` and a missing role as
/// [`Role::Guest`]. Never fails.
#[must_use]
pub fn project_session(token: &SessionToken) -> SessionView {
    SessionView {
        user: SessionUser {
            id: token
                .subject()
                .map_or_else(|| ANONYMOUS_SUBJECT.to_string(), ToString::to_string),
            role: token.role().unwrap_or_default(),
            name: token.name().map(str::to_string),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> SessionToken {
        SessionToken::new(Utc::now(), Duration::days(30)).expect("token")
    }

    #[test]
    fn projects_subject_and_role() {
        let token = token()
            .with_subject(IdentityId::from("u1"))
            .with_role(Role::Authenticated);
        let view = project_session(&token);
        assert_eq!(view.user.id, "u1");
        assert_eq!(view.user.role, Role::Authenticated);
    }

    #[test]
    fn projects_empty_token_as_guest() {
        let view = project_session(&token());
        assert_eq!(view.user.id, "guest");
        assert_eq!(view.user.role, Role::Guest);
        assert!(view.user.name.is_none());
    }

    #[test]
    fn empty_subject_is_not_replaced() {
        let view = project_session(&token().with_subject(IdentityId::from("")));
        assert_eq!(view.user.id, "");
    }

    #[test]
    fn projected_view_json_shape() {
        let token = token()
            .with_subject(IdentityId::from("u1"))
            .with_role(Role::Authenticated);
        let json = serde_json::to_value(project_session(&token)).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({ "user": { "id": "u1", "role": "authenticated" } })
        );
    }

    #[test]
    fn enrich_overwrites_prior_role() {
        let identity = Identity::guest(IdentityId::from("guest-00000000"), None);
        let token = token().with_role(Role::Authenticated);
        let enriched = enrich_token(token, Some(&identity));
        assert_eq!(enriched.role(), Some(Role::Guest));
    }

    #[test]
    fn enrich_without_identity_is_identity_function() {
        let token = token()
            .with_subject(IdentityId::from("github-1"))
            .with_role(Role::Authenticated);
        assert_eq!(enrich_token(token.clone(), None), token);
    }

    #[test]
    fn for_identity_sets_subject_and_name() {
        let identity = Identity::guest(IdentityId::from("guest-0000000a"), Some("Ace"));
        let issued = Utc::now();
        let token =
            SessionToken::for_identity(&identity, issued, Duration::hours(1)).expect("token");
        assert_eq!(token.subject(), Some(identity.id()));
        assert_eq!(token.name(), Some("Ace"));
        assert_eq!(token.role(), None);
        assert_eq!(token.expires_at() - token.issued_at(), 3600);
    }

    #[test]
    fn expiry_check() {
        let issued = Utc::now();
        let token = SessionToken::new(issued, Duration::minutes(5)).expect("token");
        assert!(!token.is_expired_at(issued));
        assert!(token.is_expired_at(issued + Duration::minutes(5)));
    }

    #[test]
    fn overflowing_expiry_is_an_error() {
        let err = SessionToken::new(Utc::now(), Duration::MAX).expect_err("should overflow");
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn missing_claims_deserialize_as_none() {
        let token: SessionToken =
            serde_json::from_str(r#"{ "iat": 1, "exp": 2 }"#).expect("deserialize");
        assert!(token.subject().is_none());
        assert!(token.role().is_none());
    }
}
