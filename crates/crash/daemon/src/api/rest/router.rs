//! API Router configuration

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        // Analysis
        .route("/analysis", get(handlers::get_analysis))
        .route("/analysis/:last_n_games", get(handlers::get_analysis_window))
        // Games
        .route("/data", get(handlers::list_games))
        .route("/load_all_games", get(handlers::load_all_games))
        .route("/bet_placed", post(handlers::bet_placed))
        .route("/game_ended", post(handlers::game_ended))
        .route("/add_games", post(handlers::add_games))
        .route("/clean_data", get(handlers::clean_data))
        // Script status
        .route("/script_started", post(handlers::script_started))
        .route("/script_stopped", post(handlers::script_stopped))
        .route("/get_script_status", get(handlers::get_script_status))
        // CSV transfer
        .route("/import_csv", get(handlers::import_csv))
        .route("/export_csv", get(handlers::export_csv))
        // Events
        .route("/events/stream", get(handlers::stream_events));

    let mut router = Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::dashboard_socket))
        .fallback_service(ServeDir::new(&state.static_dir))
        .layer(TraceLayer::new_for_http());

    if state.enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.with_state(state)
}
