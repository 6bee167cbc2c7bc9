//! SQLite storage implementation

use super::traits::*;
use crate::error::StorageError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crash_types::{GameId, GameRecord, Outcome, ScriptStatusRecord};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

/// SQLite-backed storage
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Connect to SQLite and initialize schema
    pub async fn new(
        url: &str,
        max_connections: u32,
        create_if_missing: bool,
    ) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .create_if_missing(create_if_missing);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let storage = Self { pool };
        storage.initialize_schema().await?;
        Ok(storage)
    }

    async fn initialize_schema(&self) -> Result<(), StorageError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS games (
                game_id INTEGER PRIMARY KEY,
                crash_value REAL NOT NULL,
                attempted_bet_amount REAL DEFAULT 0,
                real_bet_amount REAL DEFAULT 0,
                payout REAL DEFAULT 0,
                balance_before REAL DEFAULT 0,
                balance_after REAL DEFAULT 0,
                profit REAL DEFAULT 0,
                reported_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS script_status (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                is_running BOOLEAN NOT NULL,
                message TEXT,
                reported_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        ];

        for stmt in statements {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Query(e.to_string()))?;
        }

        Ok(())
    }

    fn game_from_row(row: &SqliteRow) -> Result<GameRecord, StorageError> {
        let get_f64 = |column: &str| -> Result<f64, StorageError> {
            row.try_get::<Option<f64>, _>(column)
                .map(|v| v.unwrap_or_default())
                .map_err(|e| StorageError::Query(e.to_string()))
        };

        let game_id: i64 = row
            .try_get("game_id")
            .map_err(|e| StorageError::Query(e.to_string()))?;
        let reported_at: Option<DateTime<Utc>> = row
            .try_get("reported_at")
            .map_err(|e| StorageError::InvalidData(format!("reported_at: {}", e)))?;

        Ok(GameRecord {
            game_id: GameId::new(game_id),
            crash_value: get_f64("crash_value")?,
            attempted_bet_amount: get_f64("attempted_bet_amount")?,
            real_bet_amount: get_f64("real_bet_amount")?,
            payout: get_f64("payout")?,
            balance_before: get_f64("balance_before")?,
            balance_after: get_f64("balance_after")?,
            profit: get_f64("profit")?,
            reported_at: reported_at.unwrap_or_else(Utc::now),
        })
    }

    fn status_from_row(row: &SqliteRow) -> Result<ScriptStatusRecord, StorageError> {
        let map = |e: sqlx::Error| StorageError::Query(e.to_string());
        let reported_at: Option<DateTime<Utc>> = row
            .try_get("reported_at")
            .map_err(|e| StorageError::InvalidData(format!("reported_at: {}", e)))?;

        Ok(ScriptStatusRecord {
            id: row.try_get("id").map_err(map)?,
            is_running: row.try_get("is_running").map_err(map)?,
            message: row.try_get("message").map_err(map)?,
            reported_at: reported_at.unwrap_or_else(Utc::now),
        })
    }

    async fn insert_with<'e, E>(
        verb: &str,
        game: &GameRecord,
        executor: E,
    ) -> Result<u64, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let sql = format!(
            r#"
            {verb} INTO games (
                game_id, crash_value, attempted_bet_amount, real_bet_amount, payout,
                balance_before, balance_after, profit, reported_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        );

        let result = sqlx::query(&sql)
            .bind(game.game_id.value())
            .bind(game.crash_value)
            .bind(game.attempted_bet_amount)
            .bind(game.real_bet_amount)
            .bind(game.payout)
            .bind(game.balance_before)
            .bind(game.balance_after)
            .bind(game.profit)
            .bind(game.reported_at)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl GameStorage for SqliteStorage {
    async fn get_game(&self, id: GameId) -> StorageResult<Option<GameRecord>> {
        let row = sqlx::query("SELECT * FROM games WHERE game_id = ?")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        row.as_ref().map(Self::game_from_row).transpose()
    }

    async fn insert_game(&self, game: GameRecord) -> StorageResult<()> {
        Self::insert_with("INSERT", &game, &self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StorageError::Conflict(format!("game {} already exists", game.game_id))
                } else {
                    StorageError::Query(e.to_string())
                }
            })?;
        Ok(())
    }

    async fn insert_games_if_absent(&self, games: Vec<GameRecord>) -> StorageResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut inserted = 0;
        for game in &games {
            inserted += Self::insert_with("INSERT OR IGNORE", game, &mut *tx)
                .await
                .map_err(|e| StorageError::Query(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;
        Ok(inserted)
    }

    async fn update_settlement(
        &self,
        id: GameId,
        crash_value: f64,
        balance_after: f64,
        profit: f64,
    ) -> StorageResult<()> {
        let result = sqlx::query(
            "UPDATE games SET crash_value = ?, balance_after = ?, profit = ? WHERE game_id = ?",
        )
        .bind(crash_value)
        .bind(balance_after)
        .bind(profit)
        .bind(id.value())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("game {}", id)));
        }
        Ok(())
    }

    async fn list_games(&self) -> StorageResult<Vec<GameRecord>> {
        let rows = sqlx::query("SELECT * FROM games ORDER BY game_id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        rows.iter().map(Self::game_from_row).collect()
    }

    async fn recent_outcomes(&self, limit: usize) -> StorageResult<Vec<Outcome>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            "SELECT game_id, crash_value FROM games WHERE crash_value > 0 ORDER BY game_id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let game_id: i64 = row
                    .try_get("game_id")
                    .map_err(|e| StorageError::Query(e.to_string()))?;
                let crash_value: f64 = row
                    .try_get("crash_value")
                    .map_err(|e| StorageError::Query(e.to_string()))?;
                Ok(Outcome::new(game_id, crash_value))
            })
            .collect()
    }

    async fn clear_games(&self) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM games")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn count_games(&self) -> StorageResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM games")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;
        Ok(count as u64)
    }
}

#[async_trait]
impl ScriptStatusStorage for SqliteStorage {
    async fn record_script_status(
        &self,
        is_running: bool,
        message: Option<String>,
    ) -> StorageResult<ScriptStatusRecord> {
        let reported_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO script_status (is_running, message, reported_at) VALUES (?, ?, ?)",
        )
        .bind(is_running)
        .bind(message.as_deref())
        .bind(reported_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Query(e.to_string()))?;

        Ok(ScriptStatusRecord {
            id: result.last_insert_rowid(),
            is_running,
            message,
            reported_at,
        })
    }

    async fn latest_script_status(&self) -> StorageResult<Option<ScriptStatusRecord>> {
        let row = sqlx::query("SELECT * FROM script_status ORDER BY id DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        row.as_ref().map(Self::status_from_row).transpose()
    }
}

impl Storage for SqliteStorage {}
