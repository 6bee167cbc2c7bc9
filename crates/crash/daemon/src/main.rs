//! Crash Daemon - crash game tracking service
//!
//! The daemon provides:
//! - REST endpoints the betting script reports rounds and status to
//! - Threshold appearance-rate analysis over recent outcomes
//! - Live dashboard push over WebSocket and SSE
//! - CSV import/export of the outcome history

use clap::Parser;
use crash_daemon::config::StorageConfig;
use crash_daemon::error::{DaemonError, DaemonResult};
use crash_daemon::{DaemonConfig, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crash Daemon CLI
#[derive(Parser)]
#[command(name = "crashd")]
#[command(about = "Crash Daemon - crash game tracking and analysis service", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CRASH_CONFIG")]
    config: Option<String>,

    /// Listen address (defaults to 127.0.0.1:8000, or the PORT variable)
    #[arg(short, long, env = "CRASH_LISTEN_ADDR")]
    listen: Option<String>,

    /// SQLite database file or `sqlite:` URL
    #[arg(short, long, env = "CRASH_DATABASE")]
    database: Option<String>,

    /// Log level
    #[arg(long, env = "CRASH_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "CRASH_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    // Initialize tracing
    let level = cli.log_level.clone().unwrap_or_else(|| config.logging.level.clone());
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());

    if cli.json || config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Override with CLI args
    if let Some(listen) = cli.listen.as_deref() {
        config.server.listen_addr = listen
            .parse()
            .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
    } else if let Ok(port) = std::env::var("PORT") {
        let port = port
            .parse()
            .map_err(|e| DaemonError::Config(format!("Invalid PORT {:?}: {}", port, e)))?;
        config.server.listen_addr.set_port(port);
    }

    if let Some(database) = cli.database {
        let url = if database.starts_with("sqlite:") {
            database
        } else {
            format!("sqlite://{}", database)
        };
        config.storage = StorageConfig::sqlite(url);
    }

    println!(
        r#"
  crashd - crash game tracker
  Version: {}
  Listening: http://{}
"#,
        env!("CARGO_PKG_VERSION"),
        config.server.listen_addr
    );

    // Create and run server
    let server = Server::new(config).await?;
    server.run().await
}
