//! RateHub - Store Rating Platform API
//! Mission: Accounts, stores, and 1-5 star ratings behind role-gated REST routes

use std::sync::Arc;

use anyhow::{Context, Result};
use dotenv::dotenv;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ratehub_backend::api::{create_router, AppState};
use ratehub_backend::auth::TokenService;
use ratehub_backend::config::Config;
use ratehub_backend::db::Database;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before tracing so RUST_LOG from the file is honored
    dotenv().ok();
    init_tracing();

    info!("🚀 RateHub API starting");

    let config = Config::from_env()?;

    let db = Database::open(&config.database_path)?;
    db.ensure_default_admin(&config.admin_email, &config.admin_password)?;

    let tokens = Arc::new(TokenService::new(
        &config.jwt_secret,
        &config.jwt_refresh_secret,
        config.access_token_ttl_hours,
        config.refresh_token_ttl_days,
    ));

    let bind_addr = config.bind_addr.clone();
    let state = AppState {
        db,
        tokens,
        config: Arc::new(config),
    };

    let app = create_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("🎯 API server listening on {}", bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ratehub_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
