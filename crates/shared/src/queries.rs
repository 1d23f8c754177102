//! Queries against the tenant, rule and conversation tables
//!
//! Every function takes a generic executor so callers can run it on the pool
//! or inside a transaction.

use sqlx::PgExecutor;

use crate::models::{
    AutoReplyRule, ConversationLogEntry, NewConversation, SubscriptionStatus, Tenant,
};

pub async fn find_tenant<'e, E>(executor: E, tenant_id: i32) -> Result<Option<Tenant>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Tenant>(
        r#"
        SELECT id, name, whatsapp_token, whatsapp_phone_id, stripe_customer_id, subscription_status
        FROM clients
        WHERE id = $1
        "#,
    )
    .bind(tenant_id)
    .fetch_optional(executor)
    .await
}

/// Case-insensitive exact keyword match for one tenant.
///
/// When several rules share a keyword the lowest rule id wins.
pub async fn find_matching_rule<'e, E>(
    executor: E,
    tenant_id: i32,
    text: &str,
) -> Result<Option<AutoReplyRule>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, AutoReplyRule>(
        r#"
        SELECT id, client_id, keyword, reply_message
        FROM auto_replies
        WHERE client_id = $1
          AND LOWER(keyword) = LOWER($2)
          AND reply_message IS NOT NULL
        ORDER BY id ASC
        LIMIT 1
        "#,
    )
    .bind(tenant_id)
    .bind(text)
    .fetch_optional(executor)
    .await
}

pub async fn insert_conversation<'e, E>(
    executor: E,
    entry: NewConversation<'_>,
) -> Result<ConversationLogEntry, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, ConversationLogEntry>(
        r#"
        INSERT INTO conversations (client_id, user_phone, message, reply)
        VALUES ($1, $2, $3, $4)
        RETURNING id, client_id, user_phone, message, reply, timestamp
        "#,
    )
    .bind(entry.client_id)
    .bind(entry.user_phone)
    .bind(entry.message)
    .bind(entry.reply)
    .fetch_one(executor)
    .await
}

/// Set the subscription status of every tenant billed under `customer_id`.
///
/// Returns the number of tenants updated; zero means the customer is unknown.
pub async fn set_subscription_status_by_customer<'e, E>(
    executor: E,
    customer_id: &str,
    status: SubscriptionStatus,
) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE clients
        SET subscription_status = $1
        WHERE stripe_customer_id = $2
        "#,
    )
    .bind(status.as_str())
    .bind(customer_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
