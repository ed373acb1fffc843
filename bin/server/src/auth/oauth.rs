//! OAuth 2.0 code flow for the Discord, GitHub and Google providers.
//!
//! Each registered OAuth provider gets an [`OAuthClient`] with fixed endpoint
//! URLs. The flow is:
//! - `/auth/signin/{provider}` redirects to the provider's consent screen
//! - `/auth/callback/{provider}` exchanges the code and fetches the profile
//!
//! The profile is reduced to an authenticated [`Identity`].

use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
    basic::{BasicClient, BasicTokenResponse},
};
use parlour_core::IdentityId;
use parlour_identity::{
    ConfigurationError, Identity, OAuthCredentials, ProviderKind, ProviderRegistry,
};
use reqwest::header::USER_AGENT;
use rootcause::Report;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// User agent sent with profile requests; GitHub rejects requests without one.
const PROFILE_USER_AGENT: &str = concat!("chips-parlour/", env!("CARGO_PKG_VERSION"));

/// Fixed endpoints for one OAuth provider.
struct Endpoints {
    auth_url: &'static str,
    token_url: &'static str,
    profile_url: &'static str,
    scopes: &'static [&'static str],
}

fn endpoints(kind: ProviderKind) -> Option<Endpoints> {
    match kind {
        ProviderKind::Discord => Some(Endpoints {
            auth_url: "https://discord.com/oauth2/authorize",
            token_url: "https://discord.com/api/oauth2/token",
            profile_url: "https://discord.com/api/users/@me",
            scopes: &["identify"],
        }),
        ProviderKind::GitHub => Some(Endpoints {
            auth_url: "https://github.com/login/oauth/authorize",
            token_url: "https://github.com/login/oauth/access_token",
            profile_url: "https://api.github.com/user",
            scopes: &["read:user"],
        }),
        ProviderKind::Google => Some(Endpoints {
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth",
            token_url: "https://oauth2.googleapis.com/token",
            profile_url: "https://openidconnect.googleapis.com/v1/userinfo",
            scopes: &["openid", "email", "profile"],
        }),
        ProviderKind::Guest => None,
    }
}

/// State stored in a cookie between sign-in and callback.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OAuthFlowState {
    pub provider: ProviderKind,
    pub csrf_token: String,
    pub pkce_verifier: String,
}

/// OAuth client for one provider.
#[derive(Clone)]
pub struct OAuthClient {
    kind: ProviderKind,
    client_id: ClientId,
    client_secret: ClientSecret,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    redirect_url: RedirectUrl,
    profile_url: &'static str,
    scopes: &'static [&'static str],
}

impl OAuthClient {
    /// Creates a client for `kind`, redirecting back to
    /// `{app_url}/auth/callback/{provider}`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidUrl`] if the redirect URI built
    /// from `app_url` does not parse, or if `kind` is not an OAuth provider.
    pub fn new(
        kind: ProviderKind,
        credentials: &OAuthCredentials,
        app_url: &str,
    ) -> Result<Self, Report<ConfigurationError>> {
        let invalid = |name: &str, reason: String| ConfigurationError::InvalidUrl {
            name: name.to_string(),
            reason,
        };

        let endpoints =
            endpoints(kind).ok_or_else(|| invalid("provider", format!("{kind} has no OAuth endpoints")))?;

        let redirect = format!("{}/auth/callback/{}", app_url.trim_end_matches('/'), kind.id());
        let redirect_url =
            RedirectUrl::new(redirect).map_err(|e| invalid("APP_URL", e.to_string()))?;
        let auth_url = AuthUrl::new(endpoints.auth_url.to_string())
            .map_err(|e| invalid("auth URL", e.to_string()))?;
        let token_url = TokenUrl::new(endpoints.token_url.to_string())
            .map_err(|e| invalid("token URL", e.to_string()))?;

        Ok(Self {
            kind,
            client_id: ClientId::new(credentials.client_id().to_string()),
            client_secret: ClientSecret::new(credentials.client_secret().to_string()),
            auth_url,
            token_url,
            redirect_url,
            profile_url: endpoints.profile_url,
            scopes: endpoints.scopes,
        })
    }

    /// Returns the provider this client talks to.
    #[must_use]
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Returns the redirect URI registered for this client.
    #[must_use]
    pub fn redirect_url(&self) -> &str {
        self.redirect_url.as_str()
    }

    /// Generates the authorization URL for the provider's consent screen.
    ///
    /// Returns the URL to redirect the user to, along with flow state to store.
    pub fn authorization_url(&self) -> (String, OAuthFlowState) {
        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_redirect_uri(self.redirect_url.clone());

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge);

        for scope in self.scopes {
            auth_request = auth_request.add_scope(Scope::new((*scope).to_string()));
        }

        let (auth_url, csrf_token) = auth_request.url();

        let state = OAuthFlowState {
            provider: self.kind,
            csrf_token: csrf_token.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        };

        (auth_url.to_string(), state)
    }

    /// Exchanges the authorization code and fetches the user's profile.
    pub async fn authenticate(
        &self,
        http_client: &reqwest::Client,
        code: &str,
        pkce_verifier: &str,
    ) -> Result<Identity, OAuthError> {
        let access_token = self.exchange_code(http_client, code, pkce_verifier).await?;
        let profile = self.fetch_profile(http_client, &access_token).await?;
        Ok(Identity::authenticated(
            IdentityId::for_provider(self.kind.id(), &profile.account_id),
            profile.display_name,
        ))
    }

    async fn exchange_code(
        &self,
        http_client: &reqwest::Client,
        code: &str,
        pkce_verifier: &str,
    ) -> Result<String, OAuthError> {
        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone());

        let token_result: BasicTokenResponse = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
            .request_async(http_client)
            .await
            .map_err(|e| OAuthError::TokenExchange(format!("token exchange failed: {e}")))?;

        Ok(token_result.access_token().secret().clone())
    }

    async fn fetch_profile(
        &self,
        http_client: &reqwest::Client,
        access_token: &str,
    ) -> Result<ProviderProfile, OAuthError> {
        let response = http_client
            .get(self.profile_url)
            .bearer_auth(access_token)
            .header(USER_AGENT, PROFILE_USER_AGENT)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| OAuthError::Profile(format!("profile request failed: {e}")))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OAuthError::Profile(format!("profile body unreadable: {e}")))?;

        ProviderProfile::parse(self.kind, body)
    }
}

impl fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthClient")
            .field("kind", &self.kind)
            .field("redirect_url", &self.redirect_url.as_str())
            .finish_non_exhaustive()
    }
}

/// OAuth clients for every registered OAuth provider.
#[derive(Debug, Clone, Default)]
pub struct OAuthClients {
    clients: HashMap<ProviderKind, OAuthClient>,
}

impl OAuthClients {
    /// Creates a client for each OAuth provider in the registry.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] report if any client is misconfigured.
    pub fn from_registry(
        registry: &ProviderRegistry,
        app_url: &str,
    ) -> Result<Self, Report<ConfigurationError>> {
        let mut clients = HashMap::new();
        for descriptor in registry.providers() {
            if let Some(credentials) = descriptor.credentials() {
                let client = OAuthClient::new(descriptor.kind(), credentials, app_url)?;
                clients.insert(descriptor.kind(), client);
            }
        }
        Ok(Self { clients })
    }

    /// Returns the client for a provider, if registered.
    #[must_use]
    pub fn get(&self, kind: ProviderKind) -> Option<&OAuthClient> {
        self.clients.get(&kind)
    }
}

/// The parts of a provider profile that make up an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub account_id: String,
    pub display_name: String,
}

#[derive(Deserialize)]
struct DiscordUser {
    id: String,
    username: String,
    global_name: Option<String>,
}

#[derive(Deserialize)]
struct GitHubUser {
    id: u64,
    login: String,
    name: Option<String>,
}

#[derive(Deserialize)]
struct GoogleUser {
    sub: String,
    name: Option<String>,
    email: Option<String>,
}

impl ProviderProfile {
    /// Reduces a provider's profile payload to an account id and display name.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Profile`] if the payload lacks the account id.
    pub fn parse(kind: ProviderKind, body: serde_json::Value) -> Result<Self, OAuthError> {
        let malformed = |e: serde_json::Error| OAuthError::Profile(format!("malformed {kind} profile: {e}"));
        let non_blank = |s: Option<String>| s.filter(|s| !s.trim().is_empty());

        match kind {
            ProviderKind::Discord => {
                let user: DiscordUser = serde_json::from_value(body).map_err(malformed)?;
                Ok(Self {
                    display_name: non_blank(user.global_name).unwrap_or(user.username),
                    account_id: user.id,
                })
            }
            ProviderKind::GitHub => {
                let user: GitHubUser = serde_json::from_value(body).map_err(malformed)?;
                Ok(Self {
                    display_name: non_blank(user.name).unwrap_or(user.login),
                    account_id: user.id.to_string(),
                })
            }
            ProviderKind::Google => {
                let user: GoogleUser = serde_json::from_value(body).map_err(malformed)?;
                Ok(Self {
                    display_name: non_blank(user.name)
                        .or(non_blank(user.email))
                        .unwrap_or_else(|| user.sub.clone()),
                    account_id: user.sub,
                })
            }
            ProviderKind::Guest => Err(OAuthError::Profile(
                "guest has no OAuth profile".to_string(),
            )),
        }
    }
}

/// OAuth flow errors.
#[derive(Debug)]
pub enum OAuthError {
    /// Token exchange failed.
    TokenExchange(String),
    /// Profile fetch or parse failed.
    Profile(String),
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenExchange(msg) => write!(f, "OAuth token exchange error: {msg}"),
            Self::Profile(msg) => write!(f, "OAuth profile error: {msg}"),
        }
    }
}

impl std::error::Error for OAuthError {}
