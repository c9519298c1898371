//! Study Circle server.
//!
//! Reads `STUDY_*` settings from the environment (or a `.env` file), applies
//! pending migrations and serves the study routes until interrupted.

use std::time::Duration;

use dotenvy::dotenv;
use sea_orm::{ConnectOptions, Database};
use study_circle::config::AppConfig;
use study_circle::http::{build_app, AppState};
use study_circle::migration::{Migrator, MigratorTrait};
use study_circle::{ExpiredDeletion, IdentityStore};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const IDENTITY_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    dotenv().ok();

    // Fail before touching the network if anything required is unset
    let config = AppConfig::from_env()?;

    let mut opt = ConnectOptions::new(config.database_url.clone());
    opt.max_connections(config.db_max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(10 * 60))
        .max_lifetime(Duration::from_secs(30 * 60));

    let db = Database::connect(opt).await?;
    info!("Connected to database");

    Migrator::up(&db, None).await?;
    info!("Migrations applied");

    let identities = IdentityStore::new(db.clone());
    info!(active = identities.active_identities().await?, "anonymous identities on record");
    let cleanup = tokio::task::spawn(identities.continuously_delete_expired(IDENTITY_CLEANUP_INTERVAL));

    let app = build_app(AppState::new(db.clone(), &config), &config.session);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Server starting on http://{}", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cleanup.abort();
    if let Ok(Err(e)) = cleanup.await {
        warn!(error = %e, "expired identity cleanup stopped");
    }
    db.close().await?;
    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
