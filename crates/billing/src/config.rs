//! Stripe configuration

use std::fmt;

use crate::error::{BillingError, BillingResult};

/// Stripe credentials, built once from the server configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// API secret key (`sk_...`). Only needed for outbound Stripe calls.
    pub secret_key: Option<String>,
    /// Endpoint signing secret (`whsec_...`) used to verify webhooks.
    pub webhook_secret: String,
}

impl StripeConfig {
    pub fn new(secret_key: Option<String>, webhook_secret: Option<String>) -> BillingResult<Self> {
        let webhook_secret = webhook_secret
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| BillingError::NotConfigured("STRIPE_WEBHOOK_SECRET not set".into()))?;

        Ok(Self {
            secret_key: secret_key.filter(|s| !s.trim().is_empty()),
            webhook_secret,
        })
    }
}

impl fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[redacted]"))
            .field("webhook_secret", &"[redacted]")
            .finish()
    }
}
