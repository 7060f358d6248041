//! Session guard
//!
//! One administrative secret, any number of browser sessions holding it. Each
//! session is a server-held record keyed by a random token; the token rides in
//! a signed cookie. Expiry is absolute from login and is checked lazily on
//! every protected request.

use crate::error::ApiError;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "docdeck_session";

/// Upper bound on the session lifetime (one year)
pub const MAX_SESSION_TIMEOUT_MINUTES: u64 = 365 * 24 * 60;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Guard failures; each is a per-request 401
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid password")]
    InvalidPassword,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Session expired")]
    Expired,
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::unauthorized(err.to_string())
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

/// Server-held record of one login
#[derive(Debug, Clone, Copy)]
struct Session {
    login_time: DateTime<Utc>,
}

/// A session that passed the guard, placed in request extensions
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub token: String,
    pub login_time: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Read-only view of the caller's session state
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub login_time: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

struct Inner {
    password_digest: [u8; 32],
    timeout: Duration,
    clock: Arc<dyn Clock>,
    sessions: RwLock<HashMap<String, Session>>,
}

/// Owner of all session state; cheap to clone
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    pub fn new(admin_password: &str, timeout_minutes: u64) -> Self {
        Self::with_clock(admin_password, timeout_minutes, Arc::new(SystemClock))
    }

    pub fn with_clock(admin_password: &str, timeout_minutes: u64, clock: Arc<dyn Clock>) -> Self {
        let minutes = timeout_minutes.min(MAX_SESSION_TIMEOUT_MINUTES) as i64;
        Self {
            inner: Arc::new(Inner {
                password_digest: digest(admin_password),
                timeout: Duration::minutes(minutes),
                clock,
                sessions: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Check the secret and open a session, returning its token
    ///
    /// On success any session the caller already held is revoked. A wrong
    /// password changes nothing.
    pub async fn login(
        &self,
        password: &str,
        previous_token: Option<&str>,
    ) -> Result<String, SessionError> {
        if !digests_match(&digest(password), &self.inner.password_digest) {
            warn!("Login failed: invalid password");
            return Err(SessionError::InvalidPassword);
        }

        let token = uuid::Uuid::new_v4().to_string();
        let session = Session {
            login_time: self.inner.clock.now(),
        };

        let mut sessions = self.inner.sessions.write().await;
        if let Some(previous) = previous_token {
            sessions.remove(previous);
        }
        sessions.insert(token.clone(), session);
        info!(active_sessions = sessions.len(), "Login succeeded");
        Ok(token)
    }

    /// Close a session; closing an unknown token is not an error
    pub async fn logout(&self, token: &str) -> bool {
        let removed = self.inner.sessions.write().await.remove(token).is_some();
        info!(removed, "Logout");
        removed
    }

    /// The request gate
    ///
    /// Passes only an existing session whose age does not exceed the timeout.
    /// An expired session is cleared before rejecting, so the next call with
    /// the same token reports `Unauthorized`. Access does not extend the
    /// session.
    pub async fn authorize(&self, token: Option<&str>) -> Result<ActiveSession, SessionError> {
        let token = token.ok_or(SessionError::Unauthorized)?;
        let now = self.inner.clock.now();

        let mut sessions = self.inner.sessions.write().await;
        let session = *sessions.get(token).ok_or(SessionError::Unauthorized)?;

        if now - session.login_time > self.inner.timeout {
            sessions.remove(token);
            info!("Session expired");
            return Err(SessionError::Expired);
        }

        Ok(ActiveSession {
            token: token.to_string(),
            login_time: session.login_time,
            expires_at: session.login_time + self.inner.timeout,
        })
    }

    /// Describe the caller's session without changing it
    pub async fn status(&self, token: Option<&str>) -> SessionStatus {
        let now = self.inner.clock.now();
        let session = match token {
            Some(token) => self.inner.sessions.read().await.get(token).copied(),
            None => None,
        };

        match session {
            Some(session) if now - session.login_time <= self.inner.timeout => SessionStatus {
                authenticated: true,
                login_time: Some(session.login_time),
                expires_at: Some(session.login_time + self.inner.timeout),
            },
            _ => SessionStatus {
                authenticated: false,
                login_time: None,
                expires_at: None,
            },
        }
    }

    /// Drop every expired record, returning how many were removed
    pub async fn sweep_expired(&self) -> usize {
        let now = self.inner.clock.now();
        let timeout = self.inner.timeout;
        let mut sessions = self.inner.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| now - session.login_time <= timeout);
        let removed = before - sessions.len();
        if removed > 0 {
            debug!(removed, "Swept expired sessions");
        }
        removed
    }

    pub async fn active_sessions(&self) -> usize {
        self.inner.sessions.read().await.len()
    }
}

fn digest(secret: &str) -> [u8; 32] {
    Sha256::digest(secret.as_bytes()).into()
}

/// Compare every byte regardless of where the first difference is
fn digests_match(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Cookie carrying a freshly issued token
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie that makes the browser forget the token
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_at(clock: &Arc<ManualClock>) -> SessionManager {
        SessionManager::with_clock("correct horse", 30, clock.clone())
    }

    #[tokio::test]
    async fn test_login_with_correct_password() {
        let clock = Arc::new(ManualClock::default());
        let manager = manager_at(&clock);

        let token = manager.login("correct horse", None).await.unwrap();
        let session = manager.authorize(Some(token.as_str())).await.unwrap();
        assert_eq!(session.login_time, clock.now());
        assert_eq!(session.expires_at, clock.now() + Duration::minutes(30));
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let manager = SessionManager::new("correct horse", 30);

        for attempt in ["", "correct", "correct horse ", "Correct horse"] {
            let err = manager.login(attempt, None).await.unwrap_err();
            assert_eq!(err, SessionError::InvalidPassword);
            assert_eq!(err.to_string(), "Invalid password");
        }
        assert_eq!(manager.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_session() {
        let manager = SessionManager::new("correct horse", 30);
        let token = manager.login("correct horse", None).await.unwrap();

        assert!(manager.login("wrong", Some(token.as_str())).await.is_err());
        assert!(manager.authorize(Some(token.as_str())).await.is_ok());
    }

    #[tokio::test]
    async fn test_relogin_revokes_previous_token() {
        let manager = SessionManager::new("correct horse", 30);
        let first = manager.login("correct horse", None).await.unwrap();
        let second = manager.login("correct horse", Some(first.as_str())).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(
            manager.authorize(Some(first.as_str())).await.unwrap_err(),
            SessionError::Unauthorized
        );
        assert!(manager.authorize(Some(second.as_str())).await.is_ok());
    }

    #[tokio::test]
    async fn test_guard_without_session() {
        let manager = SessionManager::new("correct horse", 30);
        assert_eq!(
            manager.authorize(None).await.unwrap_err(),
            SessionError::Unauthorized
        );
        assert_eq!(
            manager.authorize(Some("forged")).await.unwrap_err(),
            SessionError::Unauthorized
        );
    }

    #[tokio::test]
    async fn test_expiry_is_absolute_and_clears() {
        let clock = Arc::new(ManualClock::default());
        let manager = manager_at(&clock);
        let token = manager.login("correct horse", None).await.unwrap();

        // Access does not slide the window
        clock.advance(Duration::minutes(20));
        assert!(manager.authorize(Some(token.as_str())).await.is_ok());
        clock.advance(Duration::minutes(10));
        assert!(manager.authorize(Some(token.as_str())).await.is_ok());

        clock.advance(Duration::seconds(1));
        assert_eq!(
            manager.authorize(Some(token.as_str())).await.unwrap_err(),
            SessionError::Expired
        );
        assert_eq!(
            manager.authorize(Some(token.as_str())).await.unwrap_err(),
            SessionError::Unauthorized
        );
        assert_eq!(manager.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_logout() {
        let manager = SessionManager::new("correct horse", 30);
        let token = manager.login("correct horse", None).await.unwrap();

        assert!(manager.logout(&token).await);
        assert!(!manager.logout(&token).await);
        assert_eq!(
            manager.authorize(Some(token.as_str())).await.unwrap_err(),
            SessionError::Unauthorized
        );
    }

    #[tokio::test]
    async fn test_status_does_not_mutate() {
        let clock = Arc::new(ManualClock::default());
        let manager = manager_at(&clock);
        let token = manager.login("correct horse", None).await.unwrap();

        assert!(manager.status(Some(token.as_str())).await.authenticated);
        clock.advance(Duration::minutes(31));
        assert!(!manager.status(Some(token.as_str())).await.authenticated);
        assert_eq!(manager.active_sessions().await, 1);
        assert!(!manager.status(None).await.authenticated);
    }

    #[tokio::test]
    async fn test_sweep_expired() {
        let clock = Arc::new(ManualClock::default());
        let manager = manager_at(&clock);
        manager.login("correct horse", None).await.unwrap();
        clock.advance(Duration::minutes(15));
        let fresh = manager.login("correct horse", None).await.unwrap();

        clock.advance(Duration::minutes(16));
        assert_eq!(manager.sweep_expired().await, 1);
        assert_eq!(manager.active_sessions().await, 1);
        assert!(manager.authorize(Some(fresh.as_str())).await.is_ok());
    }

    #[test]
    fn test_digest_comparison() {
        assert!(digests_match(&digest("abc"), &digest("abc")));
        assert!(!digests_match(&digest("abc"), &digest("abd")));
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("token".to_string(), true);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));

        let cookie = session_cookie("token".to_string(), false);
        assert_eq!(cookie.secure(), Some(false));
    }
}
