//! VersaBot API Server
//!
//! Multi-tenant WhatsApp auto-reply backend with Stripe-driven
//! subscription tracking.

use std::net::SocketAddr;

use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use versabot_api::{routes::create_router, AppState, Config};
use versabot_shared::{create_pool, init_schema};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,versabot_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting VersaBot API Server v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    tracing::info!(config = ?config, "Configuration loaded");

    // Lazy pool: an unreachable database must not keep the server down
    let pool = create_pool(&config.database_url)?;

    match init_schema(&pool).await {
        Ok(()) => tracing::info!("Database schema ready"),
        Err(e) => tracing::error!(
            error = ?e,
            "Failed to initialize database schema - retry via GET /init-db"
        ),
    }

    let addr: SocketAddr = config.bind_address.parse()?;
    let state = AppState::new(pool, config);

    let app = create_router(state).layer(TraceLayer::new_for_http());

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
