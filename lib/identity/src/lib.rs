//! Identity and session configuration for Chip's Parlour.
//!
//! This crate provides:
//! - The provider registry (`ProviderRegistry`, `build_provider_list`)
//! - Guest authorization (`AuthConfigurator::authorize_guest`)
//! - Session tokens and their two callbacks (`enrich_token`, `project_session`)
//! - Token signing (`TokenSigner`, `SigningSecret`)
//!
//! # Provider Model
//!
//! Discord, GitHub and Google are registered only when both their client id
//! and secret are configured. The guest provider is always registered, last.
//!
//! # Example
//!
//! ```
//! use parlour_identity::{AuthConfigurator, ProviderKind, ProviderSettings, Role, SigningSecret};
//!
//! let settings = ProviderSettings::new()
//!     .github(Some("gh-id".to_string()), Some("gh-secret".to_string()));
//! let secret = SigningSecret::new("change-me".to_string()).expect("secret");
//! let auth = AuthConfigurator::new(&settings, &secret);
//!
//! assert_eq!(auth.registry().kinds(), vec![ProviderKind::GitHub, ProviderKind::Guest]);
//!
//! let guest = auth.authorize_guest(Some("  Lucky Lou "));
//! assert_eq!(guest.display_name(), "Lucky Lou");
//!
//! let encoded = auth.sign_in(&guest).expect("sign in");
//! let session = auth.project_session(&auth.read_session(&encoded).expect("verify"));
//! assert_eq!(session.user.id, guest.id().as_str());
//! assert_eq!(session.user.role, Role::Guest);
//! ```

pub mod auth;
pub mod error;
pub mod identity;
pub mod provider;
pub mod role;
pub mod session;
pub mod signing;

// Re-export main types at crate root
pub use auth::{
    AuthConfigurator, DEFAULT_SESSION_LIFETIME_MINUTES, MAX_SESSION_LIFETIME_MINUTES,
    session_lifetime,
};
pub use error::{ConfigurationError, TokenError};
pub use identity::{DEFAULT_GUEST_NAME, Identity, normalize_nickname};
pub use provider::{
    OAuthCredentials, ProviderDescriptor, ProviderKind, ProviderRegistry, ProviderSettings,
    SignInOption, UnknownProvider, build_provider_list,
};
pub use role::Role;
pub use session::{
    ANONYMOUS_SUBJECT, SessionToken, SessionUser, SessionView, enrich_token, project_session,
};
pub use signing::{SigningSecret, TokenSigner};
