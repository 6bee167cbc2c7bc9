//! Appearance-rate analysis handlers

use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use axum::{
    extract::{Path, State},
    Json,
};
use crash_analysis::{analyze_with, parse_last_n_games, AnalysisError, AnalysisOptions, AnalysisReport};

/// Analyze recent history with the configured dynamic window
pub async fn get_analysis(State(state): State<AppState>) -> ApiResult<Json<AnalysisReport>> {
    let last_n_games = state.analysis.default_last_n_games;
    run_analysis(&state, last_n_games).await
}

/// Analyze recent history with a dynamic window taken from the path
pub async fn get_analysis_window(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> ApiResult<Json<AnalysisReport>> {
    let last_n_games = parse_last_n_games(Some(&raw))?;
    run_analysis(&state, last_n_games).await
}

async fn run_analysis(state: &AppState, last_n_games: usize) -> ApiResult<Json<AnalysisReport>> {
    let requested = i64::try_from(last_n_games)
        .map_err(|_| AnalysisError::invalid("last_n_games", last_n_games))?;
    let options = AnalysisOptions::new(requested, state.analysis.ratio_denominator)?;

    let history = state
        .storage
        .recent_outcomes(state.analysis.fetch_limit(last_n_games))
        .await?;

    Ok(Json(analyze_with(&history, &options)))
}
