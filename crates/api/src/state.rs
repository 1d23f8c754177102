//! Application state

use reqwest::Client;
use sqlx::PgPool;
use std::sync::Arc;
use versabot_billing::{BillingService, StripeConfig};

use crate::{
    config::Config,
    replies::AutoReplyService,
    whatsapp::{Notifier, WhatsAppClient},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub replies: AutoReplyService,
    pub notifier: Notifier,
    /// Billing service (None when no Stripe webhook secret is configured)
    pub billing: Option<Arc<BillingService>>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let billing = match StripeConfig::new(
            config.stripe_secret_key.clone(),
            config.stripe_webhook_secret.clone(),
        ) {
            Ok(stripe) => {
                tracing::info!("Stripe billing service initialized");
                Some(Arc::new(BillingService::new(stripe, pool.clone())))
            }
            Err(e) => {
                tracing::warn!("Stripe billing not configured: {}", e);
                None
            }
        };

        let whatsapp = WhatsAppClient::new(Client::new(), config.whatsapp_api_base_url.clone());
        tracing::info!(
            "WhatsApp client initialized for {}",
            config.whatsapp_api_base_url
        );

        Self {
            replies: AutoReplyService::new(pool.clone(), config.default_reply.clone()),
            notifier: Notifier::new(pool.clone(), whatsapp),
            pool,
            config: Arc::new(config),
            billing,
        }
    }

    /// Get billing service reference
    pub fn billing_service(&self) -> Option<&Arc<BillingService>> {
        self.billing.as_ref()
    }
}
