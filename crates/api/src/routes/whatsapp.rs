//! WhatsApp webhook endpoints
//!
//! The tenant endpoint is best-effort on payload shape: Meta retries any
//! non-2xx delivery, so deliveries without a usable message are logged and
//! acknowledged. Only bodies that are not JSON at all are rejected.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use subtle::ConstantTimeEq;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    whatsapp::{payload::change_fields, InboundMessage},
};

/// Query of Meta's subscription handshake
#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Challenge to echo back, or `None` when the handshake must be refused.
pub fn verify_subscription(query: &VerifyQuery, expected_token: &str) -> Option<String> {
    if query.mode.as_deref().is_some_and(|mode| mode != "subscribe") {
        return None;
    }

    let token = query.verify_token.as_deref()?;
    if !bool::from(token.as_bytes().ct_eq(expected_token.as_bytes())) {
        return None;
    }

    Some(query.challenge.clone().unwrap_or_default())
}

/// `GET /webhook`
pub async fn verify_webhook(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Response {
    match verify_subscription(&query, &state.config.whatsapp_verify_token) {
        Some(challenge) => {
            tracing::info!("Webhook verified successfully");
            (StatusCode::OK, challenge).into_response()
        }
        None => {
            tracing::warn!(mode = ?query.mode, "Webhook verification failed");
            (StatusCode::FORBIDDEN, "Verification failed").into_response()
        }
    }
}

/// `POST /webhook`: log and acknowledge anything.
pub async fn receive_webhook(body: Bytes) -> Json<Value> {
    match serde_json::from_slice::<Value>(&body) {
        Ok(payload) => {
            tracing::info!(payload = %payload, "Incoming webhook data");
            for field in change_fields(&payload) {
                tracing::info!(field = %field, "Event received");
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, body_len = body.len(), "Error parsing webhook data");
        }
    }

    Json(json!({ "status": "received" }))
}

/// `POST /{tenant_id}/webhook`: resolve, log, then reply.
pub async fn tenant_webhook(
    State(state): State<AppState>,
    Path(tenant_id): Path<i32>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON payload: {}", e)))?;

    let message = match InboundMessage::from_value(payload) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(tenant_id, error = %e, "Webhook without a usable message - acknowledged");
            return Ok(Json(json!({ "status": "ok" })));
        }
    };

    let entry = state.replies.respond(tenant_id, &message).await?;
    let reply = entry.reply.as_deref().unwrap_or(state.replies.default_reply());

    tracing::info!(
        tenant_id,
        conversation_id = entry.id,
        from = %message.from,
        "Conversation logged"
    );

    state.notifier.notify(tenant_id, &message.from, reply).await;

    Ok(Json(json!({ "status": "ok" })))
}
