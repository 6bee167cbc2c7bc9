//! Storage trait definitions

use crate::error::StorageError;
use async_trait::async_trait;
use crash_types::{GameId, GameRecord, Outcome, ScriptStatusRecord};

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Combined storage trait
#[async_trait]
pub trait Storage: GameStorage + ScriptStatusStorage + Send + Sync {}

/// Storage for game rounds
#[async_trait]
pub trait GameStorage: Send + Sync {
    /// Get a game by ID
    async fn get_game(&self, id: GameId) -> StorageResult<Option<GameRecord>>;

    /// Insert a game; fails with `Conflict` when the ID exists
    async fn insert_game(&self, game: GameRecord) -> StorageResult<()>;

    /// Insert every game whose ID is not stored yet; returns the number inserted
    async fn insert_games_if_absent(&self, games: Vec<GameRecord>) -> StorageResult<u64>;

    /// Record the crash value, closing balance and profit of an open round
    async fn update_settlement(
        &self,
        id: GameId,
        crash_value: f64,
        balance_after: f64,
        profit: f64,
    ) -> StorageResult<()>;

    /// List all games, oldest first
    async fn list_games(&self) -> StorageResult<Vec<GameRecord>>;

    /// Up to `limit` finalized outcomes, newest first
    async fn recent_outcomes(&self, limit: usize) -> StorageResult<Vec<Outcome>>;

    /// Delete every game; returns the number deleted
    async fn clear_games(&self) -> StorageResult<u64>;

    /// Count stored games
    async fn count_games(&self) -> StorageResult<u64>;
}

/// Storage for script status transitions
#[async_trait]
pub trait ScriptStatusStorage: Send + Sync {
    /// Append a status transition (returns the stored record with its ID assigned)
    async fn record_script_status(
        &self,
        is_running: bool,
        message: Option<String>,
    ) -> StorageResult<ScriptStatusRecord>;

    /// Most recent status transition
    async fn latest_script_status(&self) -> StorageResult<Option<ScriptStatusRecord>>;
}
