// Test code patterns (expected in test files):
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! VersaBot Billing Module
//!
//! Verifies Stripe webhooks and keeps tenant subscription status in sync.
//!
//! ## Transitions
//!
//! - `checkout.session.completed` marks the paying customer's tenants active
//! - `invoice.payment_failed` marks them inactive
//! - Every other event type is acknowledged and ignored

pub mod config;
pub mod error;
pub mod webhooks;

#[cfg(test)]
mod edge_case_tests;

pub use config::StripeConfig;
pub use error::{BillingError, BillingResult};
pub use webhooks::{
    subscription_transition, VerifiedEvent, WebhookHandler, WebhookOutcome,
    CHECKOUT_SESSION_COMPLETED, INVOICE_PAYMENT_FAILED,
};

use sqlx::PgPool;

/// Main billing service
pub struct BillingService {
    pub webhooks: WebhookHandler,
}

impl BillingService {
    pub fn new(config: StripeConfig, pool: PgPool) -> Self {
        if config.secret_key.is_none() {
            tracing::warn!("STRIPE_SECRET_KEY not set - only webhook verification is available");
        }

        Self {
            webhooks: WebhookHandler::new(config, pool),
        }
    }
}
