//! Session extractor for Axum.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use parlour_identity::SessionToken;
use std::sync::Arc;

use super::{AppState, SESSION_COOKIE};

/// Extractor for the current session, if any.
///
/// A missing, forged or expired session cookie yields `None`; it is never a
/// request error.
pub struct OptionalSession(pub Option<SessionToken>);

impl<S> FromRequestParts<S> for OptionalSession
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let Some(session_cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(OptionalSession(None));
        };

        match app_state.auth.read_session(session_cookie.value()) {
            Ok(token) => Ok(OptionalSession(Some(token))),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unusable session cookie");
                Ok(OptionalSession(None))
            }
        }
    }
}
