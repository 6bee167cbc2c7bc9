//! Server setup and lifecycle management

use crate::api::create_router;
use crate::api::rest::state::AppState;
use crate::config::{DaemonConfig, StorageConfig};
use crate::error::{DaemonError, DaemonResult};
use crate::live::LiveContext;
use crate::storage::{InMemoryStorage, SqliteStorage, Storage};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Crash tracking daemon server
pub struct Server {
    config: DaemonConfig,
    storage: Arc<dyn Storage>,
    live: Arc<LiveContext>,
}

impl Server {
    /// Create a new server, opening storage and the data directory
    pub async fn new(config: DaemonConfig) -> DaemonResult<Self> {
        tokio::fs::create_dir_all(&config.data.data_dir).await?;

        let storage: Arc<dyn Storage> = match &config.storage {
            StorageConfig::Memory => Arc::new(InMemoryStorage::new()),
            StorageConfig::Sqlite {
                url,
                max_connections,
                create_if_missing,
            } => {
                let parent = sqlite_file_path(url).and_then(|p| p.parent().map(PathBuf::from));
                if let Some(parent) = parent.filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(&parent).await?;
                }
                Arc::new(SqliteStorage::new(url, *max_connections, *create_if_missing).await?)
            }
        };

        let live = Arc::new(LiveContext::new(config.events.channel_capacity));

        Ok(Self {
            config,
            storage,
            live,
        })
    }

    /// Run the server
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;

        let state = AppState::new(self.storage.clone(), self.live.clone(), &self.config);
        let app = create_router(state);

        let listener = TcpListener::bind(addr).await?;

        let stored = self.storage.count_games().await?;
        tracing::info!("Crash daemon listening on {}", addr);
        tracing::info!(
            games = stored,
            data_dir = %self.config.data.data_dir.display(),
            denominator = %self.config.analysis.ratio_denominator,
            "storage ready"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("Crash daemon shutting down");
        Ok(())
    }
}

/// File behind a `sqlite:` URL, if it names one
fn sqlite_file_path(url: &str) -> Option<PathBuf> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();

    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(
            sqlite_file_path("sqlite://data/games.db"),
            Some(PathBuf::from("data/games.db"))
        );
        assert_eq!(
            sqlite_file_path("sqlite:/var/lib/crash.db?mode=rwc"),
            Some(PathBuf::from("/var/lib/crash.db"))
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://host/db"), None);
    }

    #[tokio::test]
    async fn test_new_creates_data_dir_and_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DaemonConfig::default();
        config.data.data_dir = dir.path().join("data");
        config.storage = StorageConfig::sqlite(format!(
            "sqlite://{}",
            dir.path().join("db/games.db").display()
        ));

        let server = Server::new(config).await.unwrap();
        assert!(dir.path().join("data").is_dir());
        assert!(dir.path().join("db/games.db").exists());
        assert_eq!(server.storage.count_games().await.unwrap(), 0);
    }
}
