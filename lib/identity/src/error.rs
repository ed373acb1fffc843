//! Error types for the identity crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `ConfigurationError`: startup-time configuration problems (fatal)
//! - `TokenError`: session token signing and verification failures

use std::fmt;

/// Errors in the identity configuration.
///
/// These are detected at startup and should stop the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The session signing secret is empty or whitespace.
    EmptySigningSecret,
    /// A configured URL could not be parsed.
    InvalidUrl { name: String, reason: String },
    /// The outbound HTTP client could not be created.
    HttpClient { reason: String },
    /// The session lifetime is not positive or exceeds the allowed maximum.
    InvalidSessionLifetime { minutes: i64 },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySigningSecret => {
                write!(f, "session signing secret must not be empty")
            }
            Self::InvalidUrl { name, reason } => {
                write!(f, "invalid {name}: {reason}")
            }
            Self::HttpClient { reason } => {
                write!(f, "failed to create HTTP client: {reason}")
            }
            Self::InvalidSessionLifetime { minutes } => {
                write!(f, "invalid session lifetime: {minutes} minutes")
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// Errors from signing or verifying session tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token could not be encoded.
    Encode { reason: String },
    /// The token is malformed or its signature does not verify.
    Invalid { reason: String },
    /// The token has expired.
    Expired,
    /// Issue time plus lifetime does not fit in a timestamp.
    ExpiryOutOfRange,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode { reason } => write!(f, "failed to encode session token: {reason}"),
            Self::Invalid { reason } => write!(f, "invalid session token: {reason}"),
            Self::Expired => write!(f, "session token has expired"),
            Self::ExpiryOutOfRange => write!(f, "session token expiry is out of range"),
        }
    }
}

impl std::error::Error for TokenError {}
