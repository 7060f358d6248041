//! docdeck web server
//!
//! Browser-based administration for a document database.

use anyhow::Context;
use clap::Parser;
use docdeck_web::config_validator::validate_config;
use docdeck_web::server::DeckServerBuilder;
use docdeck_web::{init_logging, WebConfig};
use tracing::info;

/// docdeck - administrative panel for a document database
///
/// `MONGODB_URI` and `ADMIN_PASSWORD` are read from the environment (or a
/// `.env` file); the flags below override the matching variables.
#[derive(Parser, Debug)]
#[command(name = "docdeck-web")]
#[command(about = "Administrative panel for a document database")]
#[command(version)]
struct Args {
    /// Server host to bind to [env: HOST]
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on [env: PORT]
    #[arg(short, long)]
    port: Option<u16>,

    /// Development mode: session cookie usable over plain http
    #[arg(long)]
    dev: bool,

    /// Static files directory [env: DOCDECK_STATIC_DIR]
    #[arg(long)]
    static_dir: Option<String>,

    /// Session lifetime in minutes [env: SESSION_TIMEOUT_MINUTES]
    #[arg(long)]
    session_timeout: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn apply(self, config: WebConfig) -> DeckServerBuilder {
        let mut builder = DeckServerBuilder::new(config);
        if let Some(host) = self.host {
            builder = builder.host(host);
        }
        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        if self.dev {
            builder = builder.dev_mode(true);
        }
        if let Some(static_dir) = self.static_dir {
            builder = builder.static_dir(static_dir);
        }
        if let Some(minutes) = self.session_timeout {
            builder = builder.session_timeout_minutes(minutes);
        }
        builder
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    init_logging(&args.log_level);

    let config = WebConfig::from_env().context("Failed to load configuration")?;
    let builder = args.apply(config);

    validate_config(builder.config()).context("Invalid configuration")?;
    info!(config = ?builder.config(), "Configuration loaded");

    let server = builder
        .build()
        .await
        .context("Failed to connect to the document store")?;

    server.start().await.context("Server failed")?;
    Ok(())
}
