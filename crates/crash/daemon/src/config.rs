//! Configuration for crash-daemon

use crash_analysis::{RatioDenominator, DEFAULT_LAST_N_GAMES};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Analysis configuration
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Data directory configuration
    #[serde(default)]
    pub data: DataConfig,

    /// Live event configuration
    #[serde(default)]
    pub events: EventsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Directory served for dashboard assets
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            enable_cors: true,
            static_dir: default_static_dir(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage (for development/testing)
    Memory,

    /// SQLite storage
    Sqlite {
        /// Connection URL
        #[serde(default = "default_sqlite_url")]
        url: String,

        /// Maximum connections in pool
        #[serde(default = "default_pool_size")]
        max_connections: u32,

        /// Create the database file when it does not exist
        #[serde(default = "default_true")]
        create_if_missing: bool,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::sqlite(default_sqlite_url())
    }
}

impl StorageConfig {
    pub fn sqlite(url: impl Into<String>) -> Self {
        StorageConfig::Sqlite {
            url: url.into(),
            max_connections: default_pool_size(),
            create_if_missing: true,
        }
    }
}

/// Analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Most recent outcomes fetched per analysis request
    #[serde(default = "default_last_n_games")]
    pub history_limit: usize,

    /// Dynamic window used when a request does not name one
    #[serde(default = "default_last_n_games")]
    pub default_last_n_games: usize,

    /// Denominator of window ratios
    #[serde(default)]
    pub ratio_denominator: RatioDenominator,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_LAST_N_GAMES,
            default_last_n_games: DEFAULT_LAST_N_GAMES,
            ratio_denominator: RatioDenominator::Nominal,
        }
    }
}

impl AnalysisConfig {
    /// Outcomes to fetch so that a window of `last_n_games` is fully backed.
    pub fn fetch_limit(&self, last_n_games: usize) -> usize {
        self.history_limit.max(last_n_games)
    }
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory scanned for CSV imports and written by exports
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Live event configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Dashboard event broadcast capacity
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_sqlite_url() -> String {
    "sqlite://data/games.db".to_string()
}

fn default_pool_size() -> u32 {
    5
}

fn default_last_n_games() -> usize {
    DEFAULT_LAST_N_GAMES
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_channel_capacity() -> usize {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration from defaults, an optional file, then `CRASH_`
    /// environment variables (`CRASH_SERVER__LISTEN_ADDR`, ...).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("CRASH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Create a development configuration backed by in-memory storage
    pub fn development() -> Self {
        Self {
            storage: StorageConfig::Memory,
            ..Default::default()
        }
    }
}
