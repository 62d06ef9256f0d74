//! HelpTax API Server
//!
//! Main entry point for the HelpTax backend service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use helptax_api::{AppState, RouterOptions, create_router};
use helptax_core::storage::{StorageConfig, StorageService};
use helptax_core::tax::TaxPolicy;
use helptax_db::{SessionRepository, connect_with_pool};
use helptax_shared::{AppConfig, JwtConfig, JwtService};

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "helptax=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await
    .context("Failed to connect to database")?;
    info!("Connected to database");

    let jwt_config = JwtConfig::try_from(&config.jwt).context("Invalid JWT settings")?;
    let jwt_service = JwtService::new(jwt_config);

    let storage = match &config.storage {
        Some(settings) => {
            let service = StorageService::from_config(StorageConfig::from(settings))
                .context("Failed to initialize invoice storage")?;
            info!(provider = service.provider_name(), "Invoice storage configured");
            Some(Arc::new(service))
        }
        None => {
            warn!("No invoice storage configured; uploads will be refused");
            None
        }
    };

    let tax_policy = TaxPolicy::new(config.tax.withholding_due_percent);
    info!(
        withholding_due_percent = tax_policy.withholding_due_percent(),
        "Tax policy loaded"
    );

    spawn_session_cleanup(SessionRepository::new(db.clone()));

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        storage,
        tax_policy,
    };

    let app = create_router(state, &RouterOptions::from(&config));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Purges expired refresh sessions once an hour.
fn spawn_session_cleanup(sessions: SessionRepository) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        loop {
            ticker.tick().await;
            match sessions.cleanup_expired().await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "Expired sessions purged"),
                Err(e) => warn!(error = %e, "Session cleanup failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
