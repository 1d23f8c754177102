//! Liveness and schema bootstrap

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

pub const LIVENESS_MESSAGE: &str = "🚀 VersaBot is running";

pub async fn health() -> &'static str {
    LIVENESS_MESSAGE
}

/// Re-run the idempotent schema bootstrap.
pub async fn init_database(State(state): State<AppState>) -> (StatusCode, String) {
    match versabot_shared::init_schema(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            "Database initialized successfully!".to_string(),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Error initializing database");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error initializing database: {}", e),
            )
        }
    }
}
