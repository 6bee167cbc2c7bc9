//! In-memory storage implementation

use super::traits::*;
use crate::error::StorageError;
use async_trait::async_trait;
use crash_types::{GameId, GameRecord, Outcome, ScriptStatusRecord};
use std::collections::BTreeMap;
use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};
use tokio::sync::RwLock;

/// In-memory storage for development and testing
#[derive(Debug)]
pub struct InMemoryStorage {
    games: Arc<RwLock<BTreeMap<GameId, GameRecord>>>,
    statuses: Arc<RwLock<Vec<ScriptStatusRecord>>>,
    status_sequence: Arc<AtomicI64>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self {
            games: Arc::new(RwLock::new(BTreeMap::new())),
            statuses: Arc::new(RwLock::new(Vec::new())),
            status_sequence: Arc::new(AtomicI64::new(0)),
        }
    }
}

#[async_trait]
impl GameStorage for InMemoryStorage {
    async fn get_game(&self, id: GameId) -> StorageResult<Option<GameRecord>> {
        let games = self.games.read().await;
        Ok(games.get(&id).cloned())
    }

    async fn insert_game(&self, game: GameRecord) -> StorageResult<()> {
        let mut games = self.games.write().await;
        if games.contains_key(&game.game_id) {
            return Err(StorageError::Conflict(format!(
                "game {} already exists",
                game.game_id
            )));
        }
        games.insert(game.game_id, game);
        Ok(())
    }

    async fn insert_games_if_absent(&self, batch: Vec<GameRecord>) -> StorageResult<u64> {
        let mut games = self.games.write().await;
        let mut inserted = 0;
        for game in batch {
            if let std::collections::btree_map::Entry::Vacant(slot) = games.entry(game.game_id) {
                slot.insert(game);
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn update_settlement(
        &self,
        id: GameId,
        crash_value: f64,
        balance_after: f64,
        profit: f64,
    ) -> StorageResult<()> {
        let mut games = self.games.write().await;
        let game = games
            .get_mut(&id)
            .ok_or_else(|| StorageError::NotFound(format!("game {}", id)))?;
        game.crash_value = crash_value;
        game.balance_after = balance_after;
        game.profit = profit;
        Ok(())
    }

    async fn list_games(&self) -> StorageResult<Vec<GameRecord>> {
        let games = self.games.read().await;
        Ok(games.values().cloned().collect())
    }

    async fn recent_outcomes(&self, limit: usize) -> StorageResult<Vec<Outcome>> {
        let games = self.games.read().await;
        Ok(games
            .values()
            .rev()
            .filter(|g| g.is_finalized())
            .take(limit)
            .map(GameRecord::outcome)
            .collect())
    }

    async fn clear_games(&self) -> StorageResult<u64> {
        let mut games = self.games.write().await;
        let deleted = games.len() as u64;
        games.clear();
        Ok(deleted)
    }

    async fn count_games(&self) -> StorageResult<u64> {
        let games = self.games.read().await;
        Ok(games.len() as u64)
    }
}

#[async_trait]
impl ScriptStatusStorage for InMemoryStorage {
    async fn record_script_status(
        &self,
        is_running: bool,
        message: Option<String>,
    ) -> StorageResult<ScriptStatusRecord> {
        let record = ScriptStatusRecord {
            id: self.status_sequence.fetch_add(1, Ordering::SeqCst) + 1,
            is_running,
            message,
            reported_at: chrono::Utc::now(),
        };
        let mut statuses = self.statuses.write().await;
        statuses.push(record.clone());
        Ok(record)
    }

    async fn latest_script_status(&self) -> StorageResult<Option<ScriptStatusRecord>> {
        let statuses = self.statuses.read().await;
        Ok(statuses.last().cloned())
    }
}

impl Storage for InMemoryStorage {}
