//! Stripe webhook endpoint

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};
use versabot_billing::BillingError;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// `POST /stripe-webhook`
///
/// Rejected with 400 and no side effects unless the signature verifies.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("Missing Stripe-Signature header".to_string()))?;

    let billing = state.billing_service().ok_or_else(|| {
        BillingError::NotConfigured("STRIPE_WEBHOOK_SECRET not set".to_string())
    })?;

    let payload = std::str::from_utf8(&body)
        .map_err(|_| ApiError::BadRequest("Webhook payload is not valid UTF-8".to_string()))?;

    let event = billing.webhooks.verify_event(payload, signature)?;
    let outcome = billing.webhooks.handle_event(&event).await?;

    tracing::info!(
        event_id = %event.id,
        event_type = %event.event_type,
        outcome = ?outcome,
        "Stripe webhook processed"
    );

    Ok(Json(json!({ "status": "ok" })))
}
