//! Stripe webhook handling
//!
//! Verifies Stripe events and applies the two subscription transitions this
//! service cares about. Everything else is acknowledged and ignored.

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use sqlx::PgPool;
use stripe::{Event, EventObject, Webhook};
use time::OffsetDateTime;
use versabot_shared::{queries, SubscriptionStatus};

use crate::config::StripeConfig;
use crate::error::{BillingError, BillingResult};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age (either direction) of a signed webhook timestamp
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
pub const INVOICE_PAYMENT_FAILED: &str = "invoice.payment_failed";

/// The parts of a verified Stripe event the subscription updater needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedEvent {
    pub id: String,
    pub event_type: String,
    /// `data.object.customer`, when the event object carries one
    pub customer: Option<String>,
}

impl VerifiedEvent {
    fn from_stripe(event: &Event) -> Self {
        let customer = match &event.data.object {
            EventObject::CheckoutSession(session) => {
                session.customer.as_ref().map(|c| c.id().to_string())
            }
            EventObject::Invoice(invoice) => invoice.customer.as_ref().map(|c| c.id().to_string()),
            _ => None,
        };

        Self {
            id: event.id.to_string(),
            event_type: event.type_.to_string(),
            customer,
        }
    }

    /// Loose parse used when the typed Stripe model rejects the payload.
    fn from_json(payload: &str) -> BillingResult<Self> {
        let value: Value = serde_json::from_str(payload).map_err(|e| {
            tracing::error!(parse_error = %e, "Failed to parse webhook event JSON");
            BillingError::InvalidPayload(e.to_string())
        })?;

        let event_type = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| BillingError::InvalidPayload("missing event type".into()))?
            .to_string();

        let id = value
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        // `customer` is either an id or an expanded customer object
        let customer = value
            .pointer("/data/object/customer")
            .and_then(|c| match c {
                Value::String(id) => Some(id.clone()),
                Value::Object(obj) => obj.get("id").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .filter(|c| !c.is_empty());

        Ok(Self {
            id,
            event_type,
            customer,
        })
    }

    pub fn target_status(&self) -> Option<SubscriptionStatus> {
        subscription_transition(&self.event_type)
    }
}

/// Subscription status an event type moves a tenant to, if any.
pub fn subscription_transition(event_type: &str) -> Option<SubscriptionStatus> {
    match event_type {
        CHECKOUT_SESSION_COMPLETED => Some(SubscriptionStatus::Active),
        INVOICE_PAYMENT_FAILED => Some(SubscriptionStatus::Inactive),
        _ => None,
    }
}

/// What a verified event did to tenant state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Event type has no subscription transition
    Ignored,
    /// Recognized event without a customer reference
    MissingCustomer,
    /// No tenant is billed under the event's customer
    UnknownCustomer,
    Applied {
        status: SubscriptionStatus,
        tenants_updated: u64,
    },
}

/// Webhook handler for Stripe events
pub struct WebhookHandler {
    config: StripeConfig,
    pool: PgPool,
}

impl WebhookHandler {
    pub fn new(config: StripeConfig, pool: PgPool) -> Self {
        Self { config, pool }
    }

    /// Verify and parse a Stripe webhook event
    ///
    /// Tries async-stripe's typed parser first. Its models lag behind newer
    /// Stripe API versions, so on failure the signature is verified manually
    /// and the payload parsed loosely.
    pub fn verify_event(&self, payload: &str, signature: &str) -> BillingResult<VerifiedEvent> {
        let webhook_secret = &self.config.webhook_secret;

        match Webhook::construct_event(payload, signature, webhook_secret) {
            Ok(event) => {
                tracing::debug!(event_id = %event.id, "Standard webhook parsing succeeded");
                return Ok(VerifiedEvent::from_stripe(&event));
            }
            Err(e) => {
                tracing::debug!(
                    stripe_error = %e,
                    "Standard webhook parsing failed, trying manual verification"
                );
            }
        }

        let now = OffsetDateTime::now_utc().unix_timestamp();
        verify_signature(payload, signature, webhook_secret, now)?;

        let event = VerifiedEvent::from_json(payload)?;
        tracing::debug!(
            event_type = %event.event_type,
            event_id = %event.id,
            "Manual webhook verification succeeded"
        );
        Ok(event)
    }

    /// Apply a verified event to tenant subscription state
    pub async fn handle_event(&self, event: &VerifiedEvent) -> BillingResult<WebhookOutcome> {
        let Some(status) = event.target_status() else {
            tracing::info!(
                event_type = %event.event_type,
                event_id = %event.id,
                "Received unhandled Stripe event type - ignoring"
            );
            return Ok(WebhookOutcome::Ignored);
        };

        let Some(customer_id) = event.customer.as_deref() else {
            tracing::warn!(
                event_type = %event.event_type,
                event_id = %event.id,
                "Stripe event has no customer reference - ignoring"
            );
            return Ok(WebhookOutcome::MissingCustomer);
        };

        let tenants_updated =
            queries::set_subscription_status_by_customer(&self.pool, customer_id, status)
                .await
                .map_err(|e| {
                    tracing::error!(
                        event_id = %event.id,
                        customer_id = %customer_id,
                        error = %e,
                        "Failed to update subscription status"
                    );
                    BillingError::Database(e.to_string())
                })?;

        if tenants_updated == 0 {
            tracing::warn!(
                event_type = %event.event_type,
                customer_id = %customer_id,
                "No tenant found for Stripe customer"
            );
            return Ok(WebhookOutcome::UnknownCustomer);
        }

        match status {
            SubscriptionStatus::Active => tracing::info!(
                customer_id = %customer_id,
                tenants_updated,
                "Subscription activated"
            ),
            SubscriptionStatus::Inactive => tracing::warn!(
                customer_id = %customer_id,
                tenants_updated,
                "Payment failed, subscription deactivated"
            ),
        }

        Ok(WebhookOutcome::Applied {
            status,
            tenants_updated,
        })
    }
}

/// Check a `Stripe-Signature` header (`t=...,v1=...[,v1=...]`) against
/// HMAC-SHA256 of `"{t}.{payload}"` keyed with the endpoint secret.
pub(crate) fn verify_signature(
    payload: &str,
    header: &str,
    secret: &str,
    now: i64,
) -> BillingResult<()> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        tracing::warn!("Missing timestamp in signature header");
        BillingError::WebhookSignatureInvalid
    })?;

    if candidates.is_empty() {
        tracing::warn!("Missing v1 signature in signature header");
        return Err(BillingError::WebhookSignatureInvalid);
    }

    // abs_diff cannot overflow on attacker-chosen `t=` values
    let diff = now.abs_diff(timestamp);
    if diff > SIGNATURE_TOLERANCE_SECS.unsigned_abs() {
        tracing::warn!(timestamp, now, diff, "Webhook timestamp outside tolerance");
        return Err(BillingError::WebhookSignatureInvalid);
    }

    let signed_payload = format!("{}.{}", timestamp, payload);

    let matched = candidates.iter().any(|candidate| {
        let Ok(expected) = hex::decode(candidate) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(signed_payload.as_bytes());
        mac.verify_slice(&expected).is_ok()
    });

    if !matched {
        tracing::warn!("Webhook signature mismatch");
        return Err(BillingError::WebhookSignatureInvalid);
    }

    Ok(())
}
