//! Login, logout and session status handlers

use super::types::{ErrorResponse, LoginRequest, SuccessResponse};
use crate::session::{
    removal_cookie, session_cookie, ActiveSession, SessionStatus, SESSION_COOKIE,
};
use crate::{ApiError, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    Extension,
};
use axum_extra::extract::cookie::SignedCookieJar;

fn current_token(jar: &SignedCookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string())
}

/// Log in with the administrative password
#[utoipa::path(
    post,
    path = "/login",
    tag = "Session",
    summary = "Log in",
    description = "Compare the password with the configured administrative secret and start a session carried by a signed, HTTP-only cookie.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = SuccessResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Invalid password", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(SignedCookieJar, Json<SuccessResponse>), ApiError> {
    let Json(request) = payload?;
    let previous = current_token(&jar);

    let token = state
        .sessions
        .login(&request.password, previous.as_deref())
        .await?;

    let jar = jar.add(session_cookie(token, state.secure_cookies()));
    Ok((jar, Json(SuccessResponse::ok())))
}

/// End the current session
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Session",
    summary = "Log out",
    responses(
        (status = 200, description = "Logged out", body = SuccessResponse),
        (status = 401, description = "Not logged in or session expired", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<ActiveSession>,
    jar: SignedCookieJar,
) -> (SignedCookieJar, Json<SuccessResponse>) {
    state.sessions.logout(&session.token).await;
    (jar.remove(removal_cookie()), Json(SuccessResponse::ok()))
}

/// Report whether the caller holds a live session
#[utoipa::path(
    get,
    path = "/api/session",
    tag = "Session",
    summary = "Session status",
    description = "Read-only; never clears or extends a session.",
    responses(
        (status = 200, description = "Current session state", body = SessionStatus)
    )
)]
pub async fn session_status(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Json<SessionStatus> {
    let token = current_token(&jar);
    Json(state.sessions.status(token.as_deref()).await)
}
