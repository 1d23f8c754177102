//! Domain models

use std::fmt;
use std::str::FromStr;

use sqlx::FromRow;
use time::PrimitiveDateTime;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown subscription status: {0}")]
    UnknownSubscriptionStatus(String),
}

/// Tenant subscription state, stored as lowercase TEXT.
///
/// Tenants start `Inactive`. Only verified payment events move a tenant
/// between the two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscriptionStatus {
    Active,
    #[default]
    Inactive,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "inactive" => Ok(SubscriptionStatus::Inactive),
            other => Err(ModelError::UnknownSubscriptionStatus(other.to_string())),
        }
    }
}

/// A subscribing business (row of `clients`)
#[derive(Debug, Clone, FromRow)]
pub struct Tenant {
    pub id: i32,
    pub name: Option<String>,
    pub whatsapp_token: Option<String>,
    pub whatsapp_phone_id: Option<String>,
    pub stripe_customer_id: Option<String>,
    /// NULL in rows written before the column had a NOT NULL default
    pub subscription_status: Option<String>,
}

impl Tenant {
    pub fn status(&self) -> Result<SubscriptionStatus, ModelError> {
        self.subscription_status
            .as_deref()
            .map_or(Ok(SubscriptionStatus::Inactive), |s| s.parse())
    }

    /// Messaging credentials, or `None` when the tenant has not been fully
    /// provisioned.
    pub fn credentials(&self) -> Option<TenantCredentials> {
        let access_token = self.whatsapp_token.as_deref().filter(|t| !t.is_empty())?;
        let phone_number_id = self.whatsapp_phone_id.as_deref().filter(|p| !p.is_empty())?;

        Some(TenantCredentials {
            access_token: access_token.to_string(),
            phone_number_id: phone_number_id.to_string(),
        })
    }
}

/// WhatsApp Cloud API credentials for one tenant
#[derive(Clone, PartialEq, Eq)]
pub struct TenantCredentials {
    pub access_token: String,
    pub phone_number_id: String,
}

// Keep the token out of logs
impl fmt::Debug for TenantCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantCredentials")
            .field("access_token", &"[redacted]")
            .field("phone_number_id", &self.phone_number_id)
            .finish()
    }
}

/// Keyword rule (row of `auto_replies`)
#[derive(Debug, Clone, FromRow)]
pub struct AutoReplyRule {
    pub id: i32,
    pub client_id: i32,
    pub keyword: String,
    pub reply_message: String,
}

/// Logged exchange (row of `conversations`)
#[derive(Debug, Clone, FromRow)]
pub struct ConversationLogEntry {
    pub id: i32,
    pub client_id: i32,
    pub user_phone: Option<String>,
    pub message: Option<String>,
    pub reply: Option<String>,
    pub timestamp: Option<PrimitiveDateTime>,
}

/// Insert payload for [`ConversationLogEntry`]
#[derive(Debug, Clone, Copy)]
pub struct NewConversation<'a> {
    pub client_id: i32,
    pub user_phone: &'a str,
    pub message: &'a str,
    pub reply: &'a str,
}
