//! docdeck web server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// How often expired session records are swept
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Main docdeck web server
pub struct DeckServer {
    config: WebConfig,
    state: AppState,
}

impl DeckServer {
    /// Create a new server connected to the configured store
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone()).await?;
        Ok(Self { config, state })
    }

    /// Create a server around prepared state
    pub fn with_state(state: AppState) -> Self {
        Self {
            config: (*state.config).clone(),
            state,
        }
    }

    /// Start the web server and run until Ctrl-C
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("Starting docdeck web server");
        info!("Server address: http://{}", address);
        info!("Development mode: {}", self.config.dev_mode);
        if self.config.dev_mode {
            warn!("Session cookies are sent without the Secure attribute");
        }

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        // Expiry is enforced on access; this only reclaims abandoned records
        let sweeper = spawn_session_sweeper(self.state.clone());

        let result = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        sweeper.abort();

        if let Err(e) = result {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        info!("Server shut down gracefully");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

fn spawn_session_sweeper(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            state.sessions.sweep_expired().await;
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Builder for DeckServer
///
/// Starts from a loaded configuration and applies command-line overrides.
pub struct DeckServerBuilder {
    config: WebConfig,
}

impl DeckServerBuilder {
    /// Create a new server builder
    pub fn new(config: WebConfig) -> Self {
        Self { config }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable development mode
    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    /// Set static files directory
    pub fn static_dir<S: Into<String>>(mut self, static_dir: S) -> Self {
        self.config.static_dir = static_dir.into();
        self
    }

    /// Set the session lifetime in minutes
    pub fn session_timeout_minutes(mut self, minutes: u64) -> Self {
        self.config.session_timeout_minutes = minutes;
        self
    }

    /// The configuration as it stands
    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Build the server
    pub async fn build(self) -> WebResult<DeckServer> {
        DeckServer::new(self.config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdeck_core::MemoryStore;
    use std::sync::Arc;

    #[test]
    fn test_server_builder() {
        let builder = DeckServerBuilder::new(WebConfig::default())
            .host("localhost")
            .port(3000)
            .dev_mode(true)
            .static_dir("assets")
            .session_timeout_minutes(5);

        assert_eq!(builder.config().host, "localhost");
        assert_eq!(builder.config().port, 3000);
        assert!(builder.config().dev_mode);
        assert_eq!(builder.config().static_dir, "assets");
        assert_eq!(builder.config().session_timeout_minutes, 5);
    }

    #[test]
    fn test_server_with_state() {
        let config = WebConfig {
            admin_password: "pw".to_string(),
            port: 9000,
            ..WebConfig::default()
        };
        let state = AppState::with_store(config, Arc::new(MemoryStore::new()));
        let server = DeckServer::with_state(state);
        assert_eq!(server.config().port, 9000);
        assert_eq!(server.state().config.port, 9000);
    }
}
