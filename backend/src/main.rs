//! Spare-parts inventory server binary

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sims_backend::services::AuthService;
use sims_backend::store::PgLedgerStore;
use sims_backend::{create_app, AppState, Config};

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "sims_server=debug,sims_backend=debug,tower_http=debug,sqlx=warn".into()
    });

    let (plain, json) = if json {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (Some(tracing_subscriber::fmt::layer()), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load().context("failed to load configuration")?;

    init_tracing(config.server.log_json);

    tracing::info!("Starting Spare Parts Inventory Server");
    tracing::info!("Environment: {}", config.environment);

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await
        .context("failed to connect to database")?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    if let Some(password) = config.bootstrap.admin_password.as_deref() {
        let auth = AuthService::new(db_pool.clone(), &config);
        if auth.ensure_admin(&config.bootstrap.admin_username, password).await? {
            tracing::info!(
                username = %config.bootstrap.admin_username,
                "Created bootstrap admin account"
            );
        }
    }

    tracing::info!(
        allow_negative_stock_on_revise = config.ledger.allow_negative_stock_on_revise,
        lock_timeout_ms = config.ledger.lock_timeout_ms,
        "Stock ledger configured"
    );

    // Create application state
    let store = PgLedgerStore::new(db_pool.clone(), config.ledger.lock_timeout_ms);
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;

    let state = AppState {
        db: db_pool,
        store: Arc::new(store),
        config: Arc::new(config),
    };

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
