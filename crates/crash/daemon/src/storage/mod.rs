//! Storage layer for crash-daemon
//!
//! Provides persistent storage for game rounds and script status transitions.

mod memory;
mod sqlite;
mod traits;

pub use memory::InMemoryStorage;
pub use sqlite::SqliteStorage;
pub use traits::{GameStorage, ScriptStatusStorage, Storage, StorageResult};
