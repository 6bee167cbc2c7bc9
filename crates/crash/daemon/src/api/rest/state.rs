//! Application state for API handlers

use crate::config::{AnalysisConfig, DaemonConfig};
use crate::live::LiveContext;
use crate::storage::Storage;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Storage backend
    pub storage: Arc<dyn Storage>,

    /// Live script status and dashboard event channel
    pub live: Arc<LiveContext>,

    /// Analysis settings
    pub analysis: AnalysisConfig,

    /// Directory used by CSV import and export
    pub data_dir: PathBuf,

    /// Dashboard assets served as the router fallback
    pub static_dir: PathBuf,

    /// Whether the permissive CORS layer is installed
    pub enable_cors: bool,

    /// Daemon version
    pub version: String,

    /// Daemon start time
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(storage: Arc<dyn Storage>, live: Arc<LiveContext>, config: &DaemonConfig) -> Self {
        Self {
            storage,
            live,
            analysis: config.analysis.clone(),
            data_dir: config.data.data_dir.clone(),
            static_dir: config.server.static_dir.clone(),
            enable_cors: config.server.enable_cors,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Get uptime as a human-readable string
    pub fn uptime(&self) -> String {
        let secs = (chrono::Utc::now() - self.started_at).num_seconds();

        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else if secs < 86400 {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        } else {
            format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
        }
    }
}
