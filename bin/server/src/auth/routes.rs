//! Authentication routes: provider listing, guest and OAuth sign-in,
//! session lookup and sign-out.

use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use parlour_identity::{Identity, ProviderKind, SessionView, SignInOption};
use serde::Deserialize;
use std::sync::Arc;
use time::Duration as TimeDuration;

use super::{
    AppState, OAUTH_STATE_COOKIE, OptionalSession, SESSION_COOKIE, oauth::OAuthFlowState,
};

/// Form submitted by the guest sign-in action.
#[derive(Debug, Deserialize)]
pub struct GuestForm {
    #[serde(default)]
    nickname: Option<String>,
}

/// Query parameters for the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: String,
    state: String,
}

/// Lists every sign-in action, flagging unregistered providers.
pub async fn providers(State(state): State<Arc<AppState>>) -> Json<Vec<SignInOption>> {
    Json(state.auth.registry().sign_in_options())
}

/// Signs a visitor in as a guest.
pub async fn guest_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<GuestForm>,
) -> Result<impl IntoResponse, AuthError> {
    let identity = state.auth.authorize_guest(form.nickname.as_deref());
    let jar = establish_session(&state, jar, &identity)?;
    tracing::info!(subject = %identity.id(), "Guest signed in");
    Ok((jar, Redirect::to("/")))
}

/// Initiates the OAuth flow by redirecting to the provider.
pub async fn oauth_signin(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthError> {
    let kind = oauth_provider(&provider)?;
    let client = state
        .oauth_clients
        .get(kind)
        .ok_or(AuthError::ProviderNotRegistered(kind))?;

    let (auth_url, flow_state) = client.authorization_url();

    let flow_state_json = serde_json::to_string(&flow_state)
        .map_err(|e| AuthError::InvalidAuthState(e.to_string()))?;

    let cookie = Cookie::build((OAUTH_STATE_COOKIE, flow_state_json))
        .path("/")
        .http_only(true)
        .secure(state.session_config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(10));

    Ok((jar.add(cookie), Redirect::to(&auth_url)))
}

/// Handles the OAuth callback after the user consents at the provider.
pub async fn oauth_callback(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthError> {
    let kind = oauth_provider(&provider)?;
    let client = state
        .oauth_clients
        .get(kind)
        .ok_or(AuthError::ProviderNotRegistered(kind))?;

    let flow_state_cookie = jar
        .get(OAUTH_STATE_COOKIE)
        .ok_or(AuthError::MissingAuthState)?;

    let flow_state: OAuthFlowState = serde_json::from_str(flow_state_cookie.value())
        .map_err(|e| AuthError::InvalidAuthState(e.to_string()))?;

    if flow_state.provider != kind || query.state != flow_state.csrf_token {
        return Err(AuthError::CsrfMismatch);
    }

    let identity = client
        .authenticate(&state.http_client, &query.code, &flow_state.pkce_verifier)
        .await
        .map_err(|e| AuthError::Provider(e.to_string()))?;

    let remove_flow_state = Cookie::build((OAUTH_STATE_COOKIE, ""))
        .path("/")
        .max_age(TimeDuration::ZERO);

    let jar = establish_session(&state, jar.add(remove_flow_state), &identity)?;
    tracing::info!(subject = %identity.id(), provider = %kind, "User signed in");

    Ok((jar, Redirect::to("/")))
}

/// Returns the current session, or `null` without one.
pub async fn session(OptionalSession(token): OptionalSession) -> Json<Option<SessionView>> {
    Json(token.as_ref().map(parlour_identity::project_session))
}

/// Signs the user out by clearing the session cookie.
pub async fn signout(jar: CookieJar) -> impl IntoResponse {
    let remove_session = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(TimeDuration::ZERO);

    (jar.add(remove_session), Redirect::to("/"))
}

/// Resolves a route segment to an OAuth provider.
fn oauth_provider(segment: &str) -> Result<ProviderKind, AuthError> {
    match segment.parse::<ProviderKind>() {
        Ok(kind) if kind.is_oauth() => Ok(kind),
        _ => Err(AuthError::UnknownProvider(segment.to_string())),
    }
}

/// Signs a session token for `identity` and stores it in the session cookie.
fn establish_session(
    state: &AppState,
    jar: CookieJar,
    identity: &Identity,
) -> Result<CookieJar, AuthError> {
    let token = state
        .auth
        .sign_in(identity)
        .map_err(|e| AuthError::SessionIssue(e.to_string()))?;

    let session_cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(state.session_config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(
            state.auth.session_lifetime().num_minutes(),
        ));

    Ok(jar.add(session_cookie))
}

/// Authentication errors.
#[derive(Debug)]
pub enum AuthError {
    UnknownProvider(String),
    ProviderNotRegistered(ProviderKind),
    MissingAuthState,
    InvalidAuthState(String),
    CsrfMismatch,
    Provider(String),
    SessionIssue(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::UnknownProvider(provider) => {
                tracing::debug!(provider = %provider, "Unknown sign-in provider");
                (StatusCode::NOT_FOUND, "Unknown provider")
            }
            Self::ProviderNotRegistered(kind) => {
                tracing::debug!(provider = %kind, "Sign-in attempted with unregistered provider");
                (StatusCode::NOT_FOUND, "Provider is not enabled")
            }
            Self::MissingAuthState => (StatusCode::BAD_REQUEST, "Missing auth state"),
            Self::InvalidAuthState(msg) => {
                tracing::warn!("Invalid auth state: {}", msg);
                (StatusCode::BAD_REQUEST, "Invalid auth state")
            }
            Self::CsrfMismatch => (StatusCode::BAD_REQUEST, "CSRF token mismatch"),
            Self::Provider(msg) => {
                tracing::error!("OAuth provider sign-in failed: {}", msg);
                (StatusCode::BAD_GATEWAY, "Authentication failed")
            }
            Self::SessionIssue(msg) => {
                tracing::error!("Failed to issue session: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, message).into_response()
    }
}
