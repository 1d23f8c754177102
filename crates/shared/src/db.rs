//! Connection pool and schema bootstrap

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Tenants, rules and conversation logs. Statements are idempotent so the
/// bootstrap can run on every start and from the admin endpoint.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS clients (
        id SERIAL PRIMARY KEY,
        name TEXT,
        whatsapp_token TEXT,
        whatsapp_phone_id TEXT,
        stripe_customer_id TEXT,
        subscription_status TEXT NOT NULL DEFAULT 'inactive'
            CHECK (subscription_status IN ('active', 'inactive'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS auto_replies (
        id SERIAL PRIMARY KEY,
        client_id INTEGER NOT NULL REFERENCES clients(id),
        keyword TEXT NOT NULL,
        reply_message TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS conversations (
        id SERIAL PRIMARY KEY,
        client_id INTEGER NOT NULL REFERENCES clients(id),
        user_phone TEXT,
        message TEXT,
        reply TEXT,
        timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_auto_replies_client_keyword
        ON auto_replies (client_id, LOWER(keyword))
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_clients_stripe_customer
        ON clients (stripe_customer_id)
    "#,
];

/// Create a PostgreSQL pool without opening a connection.
///
/// Connections are established on first use, so the server still comes up
/// (and answers liveness checks) while the database is unreachable.
pub fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .connect_lazy(database_url)
}

/// Advisory lock key serializing concurrent bootstraps
const SCHEMA_LOCK_KEY: i64 = 0x7665_7273_6162_6f74;

/// Create the tables and indexes if they are absent.
///
/// Concurrent `CREATE TABLE IF NOT EXISTS` runs can still collide in the
/// catalog, so the transaction first takes a transaction-scoped advisory lock.
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    for statement in SCHEMA {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    tx.commit().await?;

    tracing::info!(statements = SCHEMA.len(), "Database schema initialized");
    Ok(())
}
