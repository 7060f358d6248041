//! docdeck web server
//!
//! Browser-facing administrative panel for a document database: a session
//! guard in front of the store gateway, plus the page and assets that drive it.

pub mod config_validator;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod session;
pub mod state;
pub mod templates;

// Re-export main types
pub use error::ApiError;
pub use server::DeckServer;
pub use session::{Clock, ManualClock, SessionError, SessionManager, SystemClock};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Response},
    Router,
};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::error;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        // Root page
        .merge(routes::page_routes())
        // Login / logout
        .merge(routes::auth_routes(state.clone()))
        // API routes
        .nest("/api", routes::api_routes(state.clone()))
        // Static file serving
        .merge(routes::static_routes(&static_dir))
        // Add middleware
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}

/// Turn a handler panic into the uniform 500 envelope
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "Unknown panic".to_string()
    };
    error!(detail = %detail, "Handler panicked");
    ApiError::internal(detail).into_response()
}

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SESSION_TIMEOUT_MINUTES: u64 = 30;
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5000;

/// Configuration for the web server
#[derive(Clone)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Development mode: session cookie without the `Secure` attribute
    pub dev_mode: bool,
    /// Static files directory
    pub static_dir: String,
    /// Document store connection string
    pub mongodb_uri: String,
    /// Server selection timeout for store calls
    pub store_timeout_ms: u64,
    /// The single administrative secret
    pub admin_password: String,
    /// Cookie signing key material; a random key is used when absent
    pub secret_key: Option<String>,
    /// Absolute session lifetime from login
    pub session_timeout_minutes: u64,
    /// Database the UI selects on load
    pub default_db: Option<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            dev_mode: false,
            static_dir: "docdeck-web/static".to_string(),
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            store_timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
            admin_password: String::new(),
            secret_key: None,
            session_timeout_minutes: DEFAULT_SESSION_TIMEOUT_MINUTES,
            default_db: None,
        }
    }
}

impl std::fmt::Debug for WebConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dev_mode", &self.dev_mode)
            .field("static_dir", &self.static_dir)
            .field("mongodb_uri", &"<redacted>")
            .field("store_timeout_ms", &self.store_timeout_ms)
            .field("admin_password", &"<redacted>")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("session_timeout_minutes", &self.session_timeout_minutes)
            .field("default_db", &self.default_db)
            .finish()
    }
}

impl WebConfig {
    /// Load configuration from environment variables
    ///
    /// `MONGODB_URI` and `ADMIN_PASSWORD` are required; everything else has a
    /// default.
    pub fn from_env() -> WebResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> WebResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let mongodb_uri = non_empty("MONGODB_URI").ok_or_else(|| {
            WebError::Config("MONGODB_URI must be set as an environment variable.".to_string())
        })?;
        let admin_password = lookup("ADMIN_PASSWORD")
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                WebError::Config(
                    "ADMIN_PASSWORD must be set as an environment variable.".to_string(),
                )
            })?;

        Ok(Self {
            host: non_empty("HOST").unwrap_or(defaults.host),
            port: parse_var(&non_empty, "PORT")?.unwrap_or(defaults.port),
            dev_mode: parse_var(&non_empty, "DOCDECK_DEV_MODE")?.unwrap_or(defaults.dev_mode),
            static_dir: non_empty("DOCDECK_STATIC_DIR").unwrap_or(defaults.static_dir),
            mongodb_uri,
            store_timeout_ms: parse_var(&non_empty, "MONGODB_TIMEOUT_MS")?
                .unwrap_or(defaults.store_timeout_ms),
            admin_password,
            secret_key: non_empty("SECRET_KEY"),
            session_timeout_minutes: parse_var(&non_empty, "SESSION_TIMEOUT_MINUTES")?
                .unwrap_or(defaults.session_timeout_minutes),
            default_db: non_empty("MONGODB_DB"),
        })
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> WebResult<Option<T>>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| WebError::Config(format!("{} has an invalid value: {}", key, raw))),
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] docdeck_core::DeckError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

/// Initialize logging for the web server
pub fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "docdeck_web={level},docdeck_core={level},tower_http=info",
                    level = level
                )
                .into()
            }),
        )
        .init();
}
