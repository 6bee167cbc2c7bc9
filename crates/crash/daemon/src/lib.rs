//! Crash Daemon library
//!
//! This module provides the core components of the crash tracking daemon:
//! - REST API handlers and live dashboard push
//! - Storage backends
//! - CSV import/export
//! - Server lifecycle management

pub mod api;
pub mod config;
pub mod csv_io;
pub mod error;
pub mod live;
pub mod server;
pub mod storage;

pub use config::DaemonConfig;
pub use error::{ApiError, DaemonError, StorageError};
pub use live::LiveContext;
pub use server::Server;
pub use storage::{InMemoryStorage, SqliteStorage, Storage};
