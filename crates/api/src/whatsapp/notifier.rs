//! Outbound reply delivery
//!
//! Fire-and-forget: every failure is logged here and never reaches the
//! inbound webhook caller.

use reqwest::StatusCode;
use sqlx::PgPool;
use versabot_shared::{queries, TenantCredentials};

use super::client::WhatsAppClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Provider answered (any status)
    Sent(StatusCode),
    UnknownTenant,
    MissingCredentials,
    LookupFailed,
    SendFailed,
}

#[derive(Clone)]
pub struct Notifier {
    pool: PgPool,
    client: WhatsAppClient,
}

impl Notifier {
    pub fn new(pool: PgPool, client: WhatsAppClient) -> Self {
        Self { pool, client }
    }

    /// Send `text` to `to` using the tenant's own WhatsApp credentials.
    pub async fn notify(&self, tenant_id: i32, to: &str, text: &str) -> NotifyOutcome {
        let tenant = match queries::find_tenant(&self.pool, tenant_id).await {
            Ok(Some(tenant)) => tenant,
            Ok(None) => {
                tracing::warn!(tenant_id, "Tenant not found - reply not sent");
                return NotifyOutcome::UnknownTenant;
            }
            Err(e) => {
                tracing::error!(tenant_id, error = %e, "Failed to load tenant credentials");
                return NotifyOutcome::LookupFailed;
            }
        };

        match tenant.status() {
            Ok(status) => {
                tracing::debug!(tenant_id, subscription_status = %status, "Replying for tenant")
            }
            Err(e) => {
                tracing::warn!(tenant_id, error = %e, "Tenant has an unreadable subscription status")
            }
        }

        let Some(credentials) = tenant.credentials() else {
            tracing::warn!(tenant_id, "Tenant has no WhatsApp credentials - reply not sent");
            return NotifyOutcome::MissingCredentials;
        };

        self.deliver(tenant_id, &credentials, to, text).await
    }

    pub async fn deliver(
        &self,
        tenant_id: i32,
        credentials: &TenantCredentials,
        to: &str,
        text: &str,
    ) -> NotifyOutcome {
        match self.client.send_text(credentials, to, text).await {
            Ok(outcome) if outcome.status.is_success() => {
                tracing::info!(
                    tenant_id,
                    status = %outcome.status,
                    response = %outcome.body,
                    "WhatsApp reply sent"
                );
                NotifyOutcome::Sent(outcome.status)
            }
            Ok(outcome) => {
                tracing::warn!(
                    tenant_id,
                    status = %outcome.status,
                    response = %outcome.body,
                    "WhatsApp API rejected reply"
                );
                NotifyOutcome::Sent(outcome.status)
            }
            Err(e) => {
                tracing::error!(tenant_id, error = %e, "Error sending WhatsApp message");
                NotifyOutcome::SendFailed
            }
        }
    }
}
