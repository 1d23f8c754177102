//! Server Configuration
//!
//! Loads configuration from environment variables once at startup.

use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_VERIFY_TOKEN: &str = "versabotid_token";
pub const DEFAULT_WHATSAPP_API_BASE_URL: &str = "https://graph.facebook.com/v17.0";
pub const DEFAULT_REPLY: &str = "Halo 👋, terima kasih sudah menghubungi kami.";

/// Server configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Server bind address, `0.0.0.0:{PORT}`
    pub bind_address: String,

    /// `PostgreSQL` connection URL
    pub database_url: String,

    /// Stripe API secret key (optional)
    pub stripe_secret_key: Option<String>,

    /// Stripe webhook signing secret. Payment webhooks are rejected without it.
    pub stripe_webhook_secret: Option<String>,

    /// Token Meta echoes back during webhook verification
    pub whatsapp_verify_token: String,

    /// WhatsApp Cloud API base URL (without trailing slash)
    pub whatsapp_api_base_url: String,

    /// Reply sent when no keyword rule matches
    pub default_reply: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port: u16 = match env::var("PORT") {
            Ok(port) => port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got {:?}", port))?,
            Err(_) => 8080,
        };

        Ok(Self {
            bind_address: format!("0.0.0.0:{}", port),
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            stripe_secret_key: non_empty_var("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: non_empty_var("STRIPE_WEBHOOK_SECRET"),
            whatsapp_verify_token: non_empty_var("WHATSAPP_VERIFY_TOKEN")
                .unwrap_or_else(|| DEFAULT_VERIFY_TOKEN.into()),
            whatsapp_api_base_url: non_empty_var("WHATSAPP_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_WHATSAPP_API_BASE_URL.into()),
            default_reply: non_empty_var("DEFAULT_REPLY").unwrap_or_else(|| DEFAULT_REPLY.into()),
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

// Secrets stay out of startup logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("database_url", &"[redacted]")
            .field("stripe_secret_key", &self.stripe_secret_key.is_some())
            .field("stripe_webhook_secret", &self.stripe_webhook_secret.is_some())
            .field("whatsapp_api_base_url", &self.whatsapp_api_base_url)
            .field("default_reply", &self.default_reply)
            .finish()
    }
}
