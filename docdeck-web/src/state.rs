//! Application state shared by every handler

use crate::{session::Clock, SessionManager, WebConfig, WebResult};
use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use docdeck_core::{DocumentStore, StoreGateway};
use sha2::{Digest, Sha512};
use std::sync::Arc;
use tracing::{info, warn};

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: Arc<WebConfig>,
    /// Gateway over the process-wide store client
    pub gateway: StoreGateway,
    /// Session guard
    pub sessions: SessionManager,
    /// Cookie signing key
    cookie_key: Key,
}

impl AppState {
    /// Create a new application state connected to the configured store
    #[cfg(feature = "mongodb")]
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let timeout = std::time::Duration::from_millis(config.store_timeout_ms);
        let store = docdeck_core::MongoStore::connect(&config.mongodb_uri, timeout).await?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    #[cfg(not(feature = "mongodb"))]
    pub async fn new(_config: WebConfig) -> WebResult<Self> {
        Err(crate::WebError::Config(
            "docdeck-web was built without the `mongodb` feature".to_string(),
        ))
    }

    /// Create state over an arbitrary store
    pub fn with_store(config: WebConfig, store: Arc<dyn DocumentStore>) -> Self {
        let sessions = SessionManager::new(&config.admin_password, config.session_timeout_minutes);
        Self::assemble(config, store, sessions)
    }

    /// Create state over an arbitrary store and clock
    pub fn with_store_and_clock(
        config: WebConfig,
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let sessions = SessionManager::with_clock(
            &config.admin_password,
            config.session_timeout_minutes,
            clock,
        );
        Self::assemble(config, store, sessions)
    }

    fn assemble(config: WebConfig, store: Arc<dyn DocumentStore>, sessions: SessionManager) -> Self {
        let cookie_key = cookie_key(config.secret_key.as_deref());
        info!(
            timeout_minutes = config.session_timeout_minutes,
            "Application state initialized"
        );
        Self {
            config: Arc::new(config),
            gateway: StoreGateway::new(store),
            sessions,
            cookie_key,
        }
    }

    /// Whether session cookies carry the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        !self.config.dev_mode
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Stretch arbitrary key material to a full signing key
fn cookie_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) if !secret.is_empty() => Key::from(Sha512::digest(secret.as_bytes()).as_slice()),
        _ => {
            warn!("SECRET_KEY not set; using a random cookie key, sessions end on restart");
            Key::generate()
        }
    }
}
