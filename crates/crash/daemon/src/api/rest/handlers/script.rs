//! Betting script lifecycle handlers

use super::MessageResponse;
use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use axum::{extract::State, Json};
use crash_types::{
    DashboardEvent, ScriptStartedRequest, ScriptStatus, ScriptStatusRecord, ScriptStoppedRequest,
};

/// The script reported that it started
pub async fn script_started(
    State(state): State<AppState>,
    Json(req): Json<ScriptStartedRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.storage.record_script_status(true, None).await?;

    let live = state
        .live
        .update(|s| {
            s.script_status = ScriptStatus::running();
            s.balance = req.balance;
        })
        .await;
    state.live.publish(DashboardEvent::ScriptStarted {
        status: live.script_status,
        balance: live.balance,
    });

    tracing::info!(balance = req.balance, "script started");
    Ok(Json(MessageResponse::new("Script started successfully")))
}

/// The script reported that it stopped, with an optional reason
pub async fn script_stopped(
    State(state): State<AppState>,
    Json(req): Json<ScriptStoppedRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .storage
        .record_script_status(false, req.error.clone())
        .await?;

    let status = ScriptStatus::stopped(req.error.clone().unwrap_or_default());
    state
        .live
        .update(|s| s.script_status = status.clone())
        .await;
    state.live.publish(DashboardEvent::ScriptStopped { status });

    tracing::info!(reason = req.error.as_deref().unwrap_or(""), "script stopped");
    Ok(Json(MessageResponse::new("Script stopped!")))
}

/// Latest persisted script status, or `null` when none was reported
pub async fn get_script_status(
    State(state): State<AppState>,
) -> ApiResult<Json<Option<ScriptStatusRecord>>> {
    let latest = state.storage.latest_script_status().await?;
    Ok(Json(latest))
}
