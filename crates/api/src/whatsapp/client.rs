//! WhatsApp Cloud API send client

use reqwest::{Client, StatusCode};
use serde::Serialize;
use versabot_shared::TenantCredentials;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    messaging_product: &'static str,
    to: &'a str,
    text: TextContent<'a>,
}

#[derive(Debug, Serialize)]
struct TextContent<'a> {
    body: &'a str,
}

/// Raw result of a send call. Callers log it; nothing is validated.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub status: StatusCode,
    pub body: String,
}

#[derive(Clone)]
pub struct WhatsAppClient {
    http: Client,
    base_url: String,
}

impl WhatsAppClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Send a text message from the tenant's phone number.
    ///
    /// Issues exactly one request. Non-2xx responses are returned as an
    /// outcome, only transport failures are errors.
    pub async fn send_text(
        &self,
        credentials: &TenantCredentials,
        to: &str,
        body: &str,
    ) -> Result<SendOutcome, reqwest::Error> {
        let url = format!(
            "{}/{}/messages",
            self.base_url, credentials.phone_number_id
        );

        let response = self
            .http
            .post(url)
            .bearer_auth(&credentials.access_token)
            .json(&SendMessageRequest {
                messaging_product: "whatsapp",
                to,
                text: TextContent { body },
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        Ok(SendOutcome { status, body })
    }
}
