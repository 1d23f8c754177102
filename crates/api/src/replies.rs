//! Keyword auto-replies
//!
//! Resolves the reply for an inbound message and appends the exchange to the
//! conversation log in one transaction, before anything is sent.

use sqlx::{PgExecutor, PgPool};
use versabot_shared::{queries, ConversationLogEntry, NewConversation};

use crate::whatsapp::InboundMessage;

#[derive(Clone)]
pub struct AutoReplyService {
    pool: PgPool,
    default_reply: String,
}

impl AutoReplyService {
    pub fn new(pool: PgPool, default_reply: impl Into<String>) -> Self {
        Self {
            pool,
            default_reply: default_reply.into(),
        }
    }

    pub fn default_reply(&self) -> &str {
        &self.default_reply
    }

    /// Reply text for `text`: the tenant's matching rule, else the default.
    async fn resolve<'e, E: PgExecutor<'e>>(
        &self,
        executor: E,
        tenant_id: i32,
        text: &str,
    ) -> Result<String, sqlx::Error> {
        let rule = queries::find_matching_rule(executor, tenant_id, text).await?;
        if let Some(rule) = &rule {
            tracing::debug!(tenant_id, rule_id = rule.id, "Keyword rule matched");
        }
        Ok(self.reply_or_default(rule.map(|r| r.reply_message)))
    }

    /// Resolve and log one inbound message. Returns the logged exchange.
    pub async fn respond(
        &self,
        tenant_id: i32,
        message: &InboundMessage,
    ) -> Result<ConversationLogEntry, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let reply = self.resolve(&mut *tx, tenant_id, &message.text).await?;

        let entry = queries::insert_conversation(
            &mut *tx,
            NewConversation {
                client_id: tenant_id,
                user_phone: &message.from,
                message: &message.text,
                reply: &reply,
            },
        )
        .await?;

        tx.commit().await?;

        Ok(entry)
    }

    fn reply_or_default(&self, reply: Option<String>) -> String {
        reply.unwrap_or_else(|| self.default_reply.clone())
    }
}
