//! Identity produced by a successful authorization.
//!
//! An identity is what a sign-in method hands to the session layer: who the
//! visitor is, what to call them, and which role their session carries.
//! Identities are immutable once created.

use parlour_core::IdentityId;
use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Display name given to guests who did not pick a nickname.
pub const DEFAULT_GUEST_NAME: &str = "Guest";

/// Trims a submitted nickname, substituting [`DEFAULT_GUEST_NAME`] when
/// nothing is left.
///
/// A missing field and a whitespace-only field are treated the same.
#[must_use]
pub fn normalize_nickname(submitted: Option<&str>) -> String {
    match submitted.map(str::trim) {
        Some(nickname) if !nickname.is_empty() => nickname.to_string(),
        _ => DEFAULT_GUEST_NAME.to_string(),
    }
}

/// An authorized identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Identity id, becomes the session subject.
    id: IdentityId,
    /// Name shown to other players.
    display_name: String,
    /// Role fixed at creation.
    role: Role,
}

impl Identity {
    /// Creates a guest identity, normalizing the submitted nickname.
    #[must_use]
    pub fn guest(id: IdentityId, nickname: Option<&str>) -> Self {
        Self {
            id,
            display_name: normalize_nickname(nickname),
            role: Role::Guest,
        }
    }

    /// Creates an identity vouched for by an OAuth provider.
    #[must_use]
    pub fn authenticated(id: IdentityId, display_name: String) -> Self {
        Self {
            id,
            display_name,
            role: Role::Authenticated,
        }
    }

    /// Returns the identity id.
    #[must_use]
    pub fn id(&self) -> &IdentityId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }
}
