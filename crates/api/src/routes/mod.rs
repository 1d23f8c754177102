//! HTTP routes

mod admin;
mod stripe;
mod whatsapp;


use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub use admin::{health, init_database, LIVENESS_MESSAGE};
pub use stripe::stripe_webhook;
pub use whatsapp::{receive_webhook, tenant_webhook, verify_webhook};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/init-db", get(init_database))
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        .route("/{tenant_id}/webhook", post(tenant_webhook))
        .route("/stripe-webhook", post(stripe_webhook))
        .with_state(state)
}
