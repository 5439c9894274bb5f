//! `slotlove serve` -- HTTP JSON API for the card spinner.
//!
//! Runs on `axum` + `tokio`. CORS is permissive so the static front end
//! can be served from anywhere during development.
//!
//! Endpoints:
//! - POST /spin            - Constrained spin (locks, level, spinPart)
//! - GET  /spin            - Unconstrained spin, no notifications
//! - POST /feedback        - Like/dislike every code of a combination
//! - POST /card-feedback   - Like/dislike a single card
//! - GET  /health          - Server status
//! - GET  /                - index.html from the static directory
//! - GET  /static/*        - Static assets
//!
//! All API responses use Content-Type: application/json.

mod handlers;
mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use slotlove_core::Spinner;
use slotlove_storage::{JsonFileStore, SpinnerStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::config::Settings;

use self::handlers::{
    handle_card_feedback, handle_feedback, handle_health, handle_index, handle_not_found,
    handle_quick_spin, handle_spin,
};
use self::state::AppState;

/// Maximum request body size: 1 MB.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"error": message})))
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/spin", get(handle_quick_spin).post(handle_spin))
        .route("/feedback", post(handle_feedback))
        .route("/card-feedback", post(handle_card_feedback))
        .nest_service("/static", ServeDir::new(&state.static_dir))
        .fallback(handle_not_found)
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}

/// Start the HTTP server described by `settings` and run until Ctrl+C.
pub async fn start_server(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let sink = settings.notification_sink()?;
    if settings.sheets.enabled {
        log::info!("sheets notifications enabled");
    } else {
        log::info!("sheets notifications disabled");
    }

    let store = JsonFileStore::new(&settings.data_dir);
    let catalog = store.load_catalog().await;
    log::info!(
        "data dir {}: {} categories, {} scores, {} mapping entries",
        settings.data_dir.display(),
        catalog.options.len(),
        catalog.scores.len(),
        catalog.mapping.len()
    );

    let state = Arc::new(AppState {
        spinner: Spinner::new(store, sink),
        static_dir: settings.static_dir.clone(),
    });
    let app = router(state);

    let addr = format!("0.0.0.0:{}", settings.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("SlotLove listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("server shut down");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("received shutdown signal"),
        Err(e) => {
            log::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
