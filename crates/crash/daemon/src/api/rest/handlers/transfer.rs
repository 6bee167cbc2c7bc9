//! CSV import and export handlers

use crate::api::rest::state::AppState;
use crate::csv_io::{self, ImportSummary, EXPORT_FILE_NAME};
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};

/// Import every CSV file in the data directory
pub async fn import_csv(State(state): State<AppState>) -> ApiResult<Json<ImportSummary>> {
    let scan = csv_io::scan_dir(state.data_dir.clone()).await.map_err(|e| {
        ApiError::Internal(format!(
            "Error reading data folder {}: {}",
            state.data_dir.display(),
            e
        ))
    })?;

    let (rounds, summary) = scan.into_batch();
    let inserted = state.storage.insert_games_if_absent(rounds).await?;
    let summary = summary.with_inserted(inserted);

    tracing::info!(
        files = summary.files,
        inserted = summary.inserted,
        skipped = summary.skipped,
        malformed = summary.malformed,
        "csv import finished"
    );
    Ok(Json(summary))
}

/// Export all games as CSV, also writing the file into the data directory
pub async fn export_csv(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let games = state.storage.list_games().await?;

    let bytes = csv_io::export_bytes(&games)
        .map_err(|e| ApiError::Internal(format!("Error exporting data to CSV: {}", e)))?;
    let path = csv_io::write_export(&state.data_dir, &bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("Error exporting data to CSV: {}", e)))?;

    tracing::info!(path = %path.display(), games = games.len(), "csv export written");

    let disposition = format!("attachment; filename={}", EXPORT_FILE_NAME);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
