//! Session token signing.
//!
//! Tokens are HS256 JWTs keyed by the deployment's signing secret. Expiry is
//! enforced here, with no leeway.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use parlour_core::Result;
use std::fmt;

use crate::error::{ConfigurationError, TokenError};
use crate::session::SessionToken;

/// The secret session tokens are signed with.
#[derive(Clone)]
pub struct SigningSecret(String);

impl SigningSecret {
    /// Wraps a signing secret.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::EmptySigningSecret`] if the secret is
    /// empty or whitespace only.
    pub fn new(secret: String) -> Result<Self, ConfigurationError> {
        if secret.trim().is_empty() {
            return Err(ConfigurationError::EmptySigningSecret.into());
        }
        Ok(Self(secret))
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Signs and verifies session tokens.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    /// Creates a signer for the given secret.
    #[must_use]
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Encodes and signs a token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encode`] if serialization or signing fails.
    pub fn encode(&self, token: &SessionToken) -> Result<String, TokenError> {
        let encoded = jsonwebtoken::encode(&Header::new(Algorithm::HS256), token, &self.encoding)
            .map_err(|e| TokenError::Encode {
                reason: e.to_string(),
            })?;
        Ok(encoded)
    }

    /// Verifies and decodes a token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Expired`] for an expired token and
    /// [`TokenError::Invalid`] for anything that does not verify.
    pub fn decode(&self, encoded: &str) -> Result<SessionToken, TokenError> {
        let data = jsonwebtoken::decode::<SessionToken>(encoded, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid {
                    reason: e.to_string(),
                },
            })?;
        Ok(data.claims)
    }
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;
    use chrono::{Duration, Utc};
    use parlour_core::IdentityId;

    fn signer(secret: &str) -> TokenSigner {
        TokenSigner::new(&SigningSecret::new(secret.to_string()).expect("secret"))
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(SigningSecret::new(String::new()).is_err());
        assert!(SigningSecret::new("   ".to_string()).is_err());
        assert!(SigningSecret::new("s3cret".to_string()).is_ok());
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = SigningSecret::new("s3cret".to_string()).expect("secret");
        assert!(!format!("{secret:?}").contains("s3cret"));
    }

    #[test]
    fn signed_token_verifies() {
        let signer = signer("parlour-secret");
        let token = SessionToken::new(Utc::now(), Duration::hours(1))
            .expect("token")
            .with_subject(IdentityId::from("guest-0000abcd"))
            .with_role(Role::Guest);

        let encoded = signer.encode(&token).expect("encode");
        let decoded = signer.decode(&encoded).expect("decode");
        assert_eq!(decoded, token);
    }

    #[test]
    fn token_from_other_secret_is_invalid() {
        let token = SessionToken::new(Utc::now(), Duration::hours(1)).expect("token");
        let encoded = signer("one").encode(&token).expect("encode");
        let err = signer("two").decode(&encoded).expect_err("should not verify");
        assert!(err.to_string().contains("invalid session token"));
    }

    #[test]
    fn expired_token_is_rejected() {
        let signer = signer("parlour-secret");
        let token = SessionToken::new(Utc::now() - Duration::hours(2), Duration::hours(1))
            .expect("token");
        let encoded = signer.encode(&token).expect("encode");
        let err = signer.decode(&encoded).expect_err("should be expired");
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(signer("parlour-secret").decode("not.a.jwt").is_err());
    }
}
