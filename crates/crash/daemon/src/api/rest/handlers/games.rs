//! Game round handlers: betting script reports and history reads

use super::MessageResponse;
use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{extract::State, Json};
use crash_types::{
    settle_profit, AddGamesRequest, BetPlacedNotice, BetPlacedRequest, DashboardEvent, GameEndedNotice,
    GameEndedRequest, GameId, GameRecord, ScriptStatus,
};
use serde::{Deserialize, Serialize};

/// Game row with the report time rendered in server local time
#[derive(Debug, Serialize, Deserialize)]
pub struct GameWithLocalTime {
    #[serde(flatten)]
    pub game: GameRecord,
    pub converted_reported_at: String,
}

/// Response for a batch insert
#[derive(Debug, Serialize, Deserialize)]
pub struct AddGamesResponse {
    pub message: String,
    pub inserted: u64,
    pub skipped: u64,
}

/// Response for a history wipe
#[derive(Debug, Serialize, Deserialize)]
pub struct CleanDataResponse {
    pub message: String,
    pub deleted: u64,
}

fn require_game_id(game_id: Option<i64>) -> Option<GameId> {
    game_id.filter(|id| *id != 0).map(GameId::new)
}

/// All stored games, ascending by id
pub async fn list_games(State(state): State<AppState>) -> ApiResult<Json<Vec<GameRecord>>> {
    let games = state.storage.list_games().await?;
    Ok(Json(games))
}

/// All stored games with a local-time rendering of `reported_at`
pub async fn load_all_games(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<GameWithLocalTime>>> {
    let games = state.storage.list_games().await?;

    let rows = games
        .into_iter()
        .map(|game| GameWithLocalTime {
            converted_reported_at: game
                .reported_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            game,
        })
        .collect();

    Ok(Json(rows))
}

/// Record a bet on an open round
pub async fn bet_placed(
    State(state): State<AppState>,
    Json(req): Json<BetPlacedRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let game_id = require_game_id(req.game_id)
        .ok_or_else(|| ApiError::BadRequest("game_id is required.".to_string()))?;

    let round = GameRecord {
        attempted_bet_amount: req.attempted_bet_amount,
        real_bet_amount: req.real_bet_amount,
        payout: req.payout,
        balance_before: req.balance,
        ..GameRecord::finalized(game_id, 0.0)
    };
    state.storage.insert_game(round).await?;

    let live = state
        .live
        .update(|s| {
            s.script_status = ScriptStatus::running();
            s.balance = req.balance;
        })
        .await;
    state.live.publish(DashboardEvent::BetPlaced {
        status: live.script_status,
        balance: req.balance,
        bet: BetPlacedNotice {
            attempted_bet_amount: req.attempted_bet_amount,
            real_bet_amount: req.real_bet_amount,
            payout: req.payout,
        },
    });

    tracing::info!(%game_id, real_bet = req.real_bet_amount, payout = req.payout, "bet placed");
    Ok(Json(MessageResponse::new("Data added successfully")))
}

/// Settle a round, or record it when no bet was placed on it
pub async fn game_ended(
    State(state): State<AppState>,
    Json(req): Json<GameEndedRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let (game_id, crash_value) = match (
        require_game_id(req.game_id),
        req.crash_value.filter(|v| *v != 0.0),
    ) {
        (Some(id), Some(value)) => (id, value),
        _ => {
            return Err(ApiError::BadRequest(
                "game_id and crash_value are required".to_string(),
            ))
        }
    };
    let balance = req.balance;

    state.live.update(|s| s.balance = balance).await;
    state.live.publish(DashboardEvent::BalanceUpdated { balance });

    let (profit, message) = match state.storage.get_game(game_id).await? {
        Some(open) => {
            let profit = settle_profit(open.balance_before, open.real_bet_amount, balance);
            state
                .storage
                .update_settlement(game_id, crash_value, balance, profit)
                .await?;
            (profit, format!("Game {} record updated successfully", game_id))
        }
        None => {
            let round = GameRecord {
                balance_before: balance,
                balance_after: balance,
                ..GameRecord::finalized(game_id, crash_value)
            };
            state.storage.insert_game(round).await?;
            (0.0, format!("New game {} record inserted successfully", game_id))
        }
    };

    state.live.publish(DashboardEvent::GameEnded {
        balance,
        game: GameEndedNotice {
            game_id,
            crash_value,
            profit,
        },
    });

    tracing::info!(%game_id, crash_value, profit, "game ended");
    Ok(Json(MessageResponse::new(message)))
}

/// Insert a batch of finished rounds, ignoring ids already stored
pub async fn add_games(
    State(state): State<AppState>,
    Json(req): Json<AddGamesRequest>,
) -> ApiResult<Json<AddGamesResponse>> {
    let entries = req
        .data
        .ok_or_else(|| ApiError::BadRequest("Array of game data is required".to_string()))?;

    let rounds = entries
        .iter()
        .map(|entry| {
            match (
                require_game_id(entry.game_id),
                entry.crash_value.filter(|v| *v != 0.0),
            ) {
                (Some(id), Some(value)) => Ok(GameRecord::finalized(id, value)),
                _ => Err(ApiError::BadRequest(
                    "game_id and crash_value are required for each game".to_string(),
                )),
            }
        })
        .collect::<ApiResult<Vec<_>>>()?;

    let submitted = rounds.len() as u64;
    let inserted = state.storage.insert_games_if_absent(rounds).await?;
    tracing::info!(submitted, inserted, "games added");

    Ok(Json(AddGamesResponse {
        message: "Games data processed successfully".to_string(),
        inserted,
        skipped: submitted - inserted,
    }))
}

/// Delete every stored game
pub async fn clean_data(State(state): State<AppState>) -> ApiResult<Json<CleanDataResponse>> {
    let deleted = state.storage.clear_games().await?;
    tracing::info!(deleted, "game history cleared");

    Ok(Json(CleanDataResponse {
        message: "Data cleaned successfully".to_string(),
        deleted,
    }))
}
