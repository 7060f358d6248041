//! Request gate for protected routes
//!
//! Applied with `route_layer`, so it runs before any protected handler and
//! only for routes that matched.

use crate::session::{removal_cookie, SessionError, SESSION_COOKIE};
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::SignedCookieJar;
use tracing::debug;

/// Session gate middleware
///
/// On success the [`crate::session::ActiveSession`] is added to the request
/// extensions. An expired session is also dropped from the browser.
pub async fn require_session(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string());

    match state.sessions.authorize(token.as_deref()).await {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(SessionError::Expired) => {
            (jar.remove(removal_cookie()), SessionError::Expired).into_response()
        }
        Err(err) => {
            debug!(path = %request.uri().path(), "Rejected unauthenticated request");
            err.into_response()
        }
    }
}
