//! Session roles.
//!
//! Every issued session carries exactly one role. Guests get `Guest`,
//! anyone who signed in through an OAuth provider gets `Authenticated`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role carried by an identity and its session token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Visitor who continued as a guest.
    #[default]
    Guest,
    /// User vouched for by an OAuth provider.
    Authenticated,
}

impl Role {
    /// Returns the wire name of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Authenticated => "authenticated",
        }
    }

    /// Returns true if this is the guest role.
    #[must_use]
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
