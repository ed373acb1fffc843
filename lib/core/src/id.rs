//! Identity identifiers and guest id allocation.
//!
//! Identity ids are opaque strings. OAuth identities are namespaced by the
//! provider that vouched for them (`github-1234`), guest identities use the
//! `guest-` prefix followed by an eight character lowercase alphanumeric
//! suffix (`guest-k3x9q0ab`).

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix shared by every guest identity id.
pub const GUEST_PREFIX: &str = "guest";

/// Number of characters in a guest id suffix.
pub const GUEST_SUFFIX_LEN: usize = 8;

/// Alphabet guest suffixes are drawn from.
const SUFFIX_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Number of distinct suffixes (36^8).
const SUFFIX_SPACE: u64 = 36u64.pow(GUEST_SUFFIX_LEN as u32);

/// Error returned when parsing an id from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of id that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Unique identifier for a signed-in identity.
///
/// This is the value carried as the subject of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(String);

impl IdentityId {
    /// Creates an id from an arbitrary string.
    #[must_use]
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Creates the id of an identity vouched for by an OAuth provider.
    #[must_use]
    pub fn for_provider(provider: &str, account: &str) -> Self {
        Self(format!("{provider}-{account}"))
    }

    /// Parses a guest id, rejecting anything not of the form `guest-[a-z0-9]{8}`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseIdError`] describing the first mismatch.
    pub fn parse_guest(s: &str) -> Result<Self, ParseIdError> {
        let err = |reason: &str| ParseIdError {
            id_type: "GuestId",
            reason: reason.to_string(),
        };

        let suffix = s
            .strip_prefix(GUEST_PREFIX)
            .and_then(|rest| rest.strip_prefix('-'))
            .ok_or_else(|| err("missing guest- prefix"))?;

        if suffix.len() != GUEST_SUFFIX_LEN {
            return Err(err("suffix must be 8 characters"));
        }
        if !suffix
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
        {
            return Err(err("suffix must be lowercase alphanumeric"));
        }

        Ok(Self(s.to_string()))
    }

    /// Builds a guest id from a raw suffix value.
    fn guest_from_index(mut index: u64) -> Self {
        let mut suffix = [b'0'; GUEST_SUFFIX_LEN];
        for slot in suffix.iter_mut().rev() {
            *slot = SUFFIX_ALPHABET[(index % 36) as usize];
            index /= 36;
        }
        let suffix: String = suffix.iter().map(|&b| char::from(b)).collect();
        Self(format!("{GUEST_PREFIX}-{suffix}"))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this id has the guest shape.
    #[must_use]
    pub fn is_guest(&self) -> bool {
        Self::parse_guest(&self.0).is_ok()
    }

    /// Consumes the id, returning the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for IdentityId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseIdError {
                id_type: "IdentityId",
                reason: "empty id".to_string(),
            });
        }
        Ok(Self(s.to_string()))
    }
}

impl From<String> for IdentityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for IdentityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<IdentityId> for String {
    fn from(id: IdentityId) -> Self {
        id.0
    }
}

/// Source of fresh guest identity ids.
///
/// Allocation never checks for collisions and never retries.
pub trait GuestIdAllocator: Send + Sync + fmt::Debug {
    /// Returns a new id of the form `guest-[a-z0-9]{8}`.
    fn allocate(&self) -> IdentityId;
}

/// Allocates guest ids with a random suffix from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGuestIds;

impl GuestIdAllocator for RandomGuestIds {
    fn allocate(&self) -> IdentityId {
        let index = rand::rng().random_range(0..SUFFIX_SPACE);
        IdentityId::guest_from_index(index)
    }
}

/// Allocates guest ids from a counter.
///
/// The suffix is the counter rendered in base 36, zero padded. The counter
/// wraps after 36^8 allocations.
#[derive(Debug, Default)]
pub struct SequentialGuestIds {
    next: AtomicU64,
}

impl SequentialGuestIds {
    /// Creates an allocator whose first id has suffix `00000000`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator starting from the given counter value.
    #[must_use]
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start % SUFFIX_SPACE),
        }
    }
}

impl GuestIdAllocator for SequentialGuestIds {
    fn allocate(&self) -> IdentityId {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        IdentityId::guest_from_index(index % SUFFIX_SPACE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_have_guest_shape() {
        let allocator = RandomGuestIds;
        for _ in 0..100 {
            let id = allocator.allocate();
            assert!(id.as_str().starts_with("guest-"));
            assert_eq!(id.as_str().len(), "guest-".len() + GUEST_SUFFIX_LEN);
            assert!(id.is_guest(), "unexpected shape: {id}");
        }
    }

    #[test]
    fn sequential_ids_count_in_base_36() {
        let allocator = SequentialGuestIds::new();
        assert_eq!(allocator.allocate().as_str(), "guest-00000000");
        assert_eq!(allocator.allocate().as_str(), "guest-00000001");

        let allocator = SequentialGuestIds::starting_at(35);
        assert_eq!(allocator.allocate().as_str(), "guest-0000000z");
        assert_eq!(allocator.allocate().as_str(), "guest-00000010");
    }

    #[test]
    fn sequential_ids_wrap_at_suffix_space() {
        let allocator = SequentialGuestIds::starting_at(SUFFIX_SPACE - 1);
        assert_eq!(allocator.allocate().as_str(), "guest-zzzzzzzz");
        assert_eq!(allocator.allocate().as_str(), "guest-00000000");
    }

    #[test]
    fn parse_guest_accepts_valid_ids() {
        let id = IdentityId::parse_guest("guest-a1b2c3d4").expect("should parse");
        assert_eq!(id.as_str(), "guest-a1b2c3d4");
    }

    #[test]
    fn parse_guest_rejects_bad_shapes() {
        for bad in [
            "guest-ABCDEFGH",
            "guest-abc",
            "guest-abcdefghi",
            "guest_abcdefgh",
            "visitor-abcdefgh",
            "guest-abcd-fgh",
            "",
        ] {
            let err = IdentityId::parse_guest(bad).expect_err(bad);
            assert_eq!(err.id_type, "GuestId");
        }
    }

    #[test]
    fn provider_ids_are_namespaced() {
        let id = IdentityId::for_provider("github", "583231");
        assert_eq!(id.as_str(), "github-583231");
        assert!(!id.is_guest());
    }

    #[test]
    fn from_str_rejects_empty() {
        let result: Result<IdentityId, _> = "".parse();
        assert!(result.is_err());
        let id: IdentityId = "u1".parse().expect("should parse");
        assert_eq!(id.to_string(), "u1");
    }

    #[test]
    fn id_serde_is_transparent() {
        let id = IdentityId::from("guest-0000abcd");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"guest-0000abcd\"");
    }
}
