//! Sign-in providers and the provider registry.
//!
//! The registry is built once from resolved [`ProviderSettings`]. Each OAuth
//! provider is registered only when both halves of its credential pair are
//! configured; the guest provider is always registered, and always last.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A sign-in method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Discord,
    GitHub,
    Google,
    Guest,
}

impl ProviderKind {
    /// Registration order.
    pub const REGISTRATION_ORDER: [Self; 4] = [Self::Discord, Self::GitHub, Self::Google, Self::Guest];

    /// Order in which the sign-in surface lists its actions.
    pub const DISPLAY_ORDER: [Self; 4] = [Self::Discord, Self::Google, Self::GitHub, Self::Guest];

    /// Returns the provider id used in routes and identity ids.
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Self::Discord => "discord",
            Self::GitHub => "github",
            Self::Google => "google",
            Self::Guest => "guest",
        }
    }

    /// Returns the human-readable provider name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Discord => "Discord",
            Self::GitHub => "GitHub",
            Self::Google => "Google",
            Self::Guest => "Guest",
        }
    }

    /// Returns true for providers that sign in through an OAuth code flow.
    #[must_use]
    pub fn is_oauth(&self) -> bool {
        !matches!(self, Self::Guest)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error returned for an unknown provider id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProvider(pub String);

impl fmt::Display for UnknownProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown provider: {}", self.0)
    }
}

impl std::error::Error for UnknownProvider {}

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::REGISTRATION_ORDER
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

/// A complete OAuth client credential pair.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    client_id: String,
    client_secret: String,
}

impl OAuthCredentials {
    /// Builds a credential pair when both values are present and non-empty.
    #[must_use]
    pub fn from_pair(client_id: Option<&str>, client_secret: Option<&str>) -> Option<Self> {
        match (client_id, client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Some(Self {
                client_id: id.to_string(),
                client_secret: secret.to_string(),
            }),
            _ => None,
        }
    }

    /// Returns the OAuth client id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the OAuth client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Provider configuration as supplied by the environment.
///
/// Values are opaque; only their presence matters to the registry. Empty
/// strings count as absent.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    discord_client_id: Option<String>,
    #[serde(default)]
    discord_client_secret: Option<String>,
    #[serde(default)]
    github_id: Option<String>,
    #[serde(default)]
    github_secret: Option<String>,
    #[serde(default)]
    google_client_id: Option<String>,
    #[serde(default)]
    google_client_secret: Option<String>,
}

impl ProviderSettings {
    /// Creates settings with no OAuth provider configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Discord credential pair.
    #[must_use]
    pub fn discord(mut self, client_id: Option<String>, client_secret: Option<String>) -> Self {
        self.discord_client_id = client_id;
        self.discord_client_secret = client_secret;
        self
    }

    /// Sets the GitHub credential pair.
    #[must_use]
    pub fn github(mut self, client_id: Option<String>, client_secret: Option<String>) -> Self {
        self.github_id = client_id;
        self.github_secret = client_secret;
        self
    }

    /// Sets the Google credential pair.
    #[must_use]
    pub fn google(mut self, client_id: Option<String>, client_secret: Option<String>) -> Self {
        self.google_client_id = client_id;
        self.google_client_secret = client_secret;
        self
    }

    /// Returns the complete credential pair for an OAuth provider, if any.
    #[must_use]
    pub fn credentials(&self, kind: ProviderKind) -> Option<OAuthCredentials> {
        let (id, secret) = match kind {
            ProviderKind::Discord => (&self.discord_client_id, &self.discord_client_secret),
            ProviderKind::GitHub => (&self.github_id, &self.github_secret),
            ProviderKind::Google => (&self.google_client_id, &self.google_client_secret),
            ProviderKind::Guest => return None,
        };
        OAuthCredentials::from_pair(id.as_deref(), secret.as_deref())
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("discord", &self.credentials(ProviderKind::Discord).is_some())
            .field("github", &self.credentials(ProviderKind::GitHub).is_some())
            .field("google", &self.credentials(ProviderKind::Google).is_some())
            .finish()
    }
}

/// A registered sign-in method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    kind: ProviderKind,
    credentials: Option<OAuthCredentials>,
}

impl ProviderDescriptor {
    fn oauth(kind: ProviderKind, credentials: OAuthCredentials) -> Self {
        Self {
            kind,
            credentials: Some(credentials),
        }
    }

    fn guest() -> Self {
        Self {
            kind: ProviderKind::Guest,
            credentials: None,
        }
    }

    /// Returns the provider kind.
    #[must_use]
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Returns the OAuth credentials. Always `None` for the guest provider.
    #[must_use]
    pub fn credentials(&self) -> Option<&OAuthCredentials> {
        self.credentials.as_ref()
    }
}

/// Builds the ordered list of enabled providers.
///
/// Discord, GitHub and Google are included only when fully configured, in
/// that order; guest is always appended last. Pure function of `settings`.
#[must_use]
pub fn build_provider_list(settings: &ProviderSettings) -> Vec<ProviderDescriptor> {
    let mut providers: Vec<ProviderDescriptor> = ProviderKind::REGISTRATION_ORDER
        .into_iter()
        .filter(ProviderKind::is_oauth)
        .filter_map(|kind| {
            settings
                .credentials(kind)
                .map(|credentials| ProviderDescriptor::oauth(kind, credentials))
        })
        .collect();
    providers.push(ProviderDescriptor::guest());
    providers
}

/// One action on the sign-in surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInOption {
    /// Provider id.
    pub id: ProviderKind,
    /// Provider name.
    pub name: String,
    /// Whether the provider is registered.
    pub enabled: bool,
}

/// The set of registered providers.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<ProviderDescriptor>,
}

impl ProviderRegistry {
    /// Builds the registry from resolved settings.
    #[must_use]
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        Self {
            providers: build_provider_list(settings),
        }
    }

    /// Returns the registered providers in registration order.
    #[must_use]
    pub fn providers(&self) -> &[ProviderDescriptor] {
        &self.providers
    }

    /// Returns the registered provider kinds in registration order.
    #[must_use]
    pub fn kinds(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(ProviderDescriptor::kind).collect()
    }

    /// Returns the descriptor for a provider if it is registered.
    #[must_use]
    pub fn get(&self, kind: ProviderKind) -> Option<&ProviderDescriptor> {
        self.providers.iter().find(|p| p.kind == kind)
    }

    /// Returns true if the provider is registered.
    #[must_use]
    pub fn contains(&self, kind: ProviderKind) -> bool {
        self.get(kind).is_some()
    }

    /// Lists every sign-in action in display order, flagging the ones
    /// whose provider is not registered.
    #[must_use]
    pub fn sign_in_options(&self) -> Vec<SignInOption> {
        ProviderKind::DISPLAY_ORDER
            .into_iter()
            .map(|kind| SignInOption {
                id: kind,
                name: kind.name().to_string(),
                enabled: self.contains(kind),
            })
            .collect()
    }
}
