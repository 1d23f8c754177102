//! Billing error types

pub type BillingResult<T> = Result<T, BillingError>;

#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("Stripe webhook signature verification failed")]
    WebhookSignatureInvalid,

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    #[error("Billing not configured: {0}")]
    NotConfigured(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl BillingError {
    /// Whether the failure was caused by the caller's request rather than by
    /// this service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BillingError::WebhookSignatureInvalid
                | BillingError::InvalidPayload(_)
                | BillingError::NotConfigured(_)
        )
    }
}
