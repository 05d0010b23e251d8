//! FleetDesk Server: back office for a ground-transport booking platform.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use fleetdesk_api::AppState;
use fleetdesk_auth::RbacEnforcer;
use fleetdesk_cache::{CacheManager, Revalidator};
use fleetdesk_core::config::AppConfig;
use fleetdesk_core::error::AppError;
use fleetdesk_core::traits::CacheProvider;
use fleetdesk_database::{DatabasePool, MemoryDatabase, Repositories};
use fleetdesk_service::Services;
use fleetdesk_storage::MediaStore;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = format!("{e:#}"), "Server error");
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `APP_ENV` overlay, and `FLEETDESK__*`
/// environment overrides.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing. `RUST_LOG` wins over the configured level.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting FleetDesk v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Repositories ─────────────────────────────────────
    let (repos, pool) = match config.database.provider.as_str() {
        "memory" => {
            tracing::warn!("Using the in-memory database; data is lost on restart");
            (Repositories::memory(Arc::new(MemoryDatabase::new())), None)
        }
        _ => {
            tracing::info!("Connecting to database...");
            let pool = DatabasePool::connect(&config.database)
                .await
                .context("Database connection failed")?;
            if !pool.health_check().await.context("Database health check failed")? {
                anyhow::bail!("Database health check returned an unexpected result");
            }
            (Repositories::postgres(pool.pool().clone()), Some(pool))
        }
    };

    // ── Step 2: Page cache ───────────────────────────────────────
    tracing::info!(provider = %config.cache.provider, "Initializing cache...");
    let cache = CacheManager::new(&config.cache)
        .await
        .context("Cache init failed")?;
    cache.ping().await.context("Cache is unreachable")?;
    let pages = Revalidator::new(cache);

    // ── Step 3: Media storage ────────────────────────────────────
    tracing::info!(provider = %config.storage.provider, "Initializing media storage...");
    let media = MediaStore::from_config(&config.storage)
        .await
        .context("Storage init failed")?;

    // ── Step 4: Services and HTTP ────────────────────────────────
    let services = Services::new(repos, pages, media, Arc::new(RbacEnforcer::new()));
    let state = AppState::new(config, services);

    let served = fleetdesk_api::app::serve(state).await;

    if let Some(pool) = pool {
        pool.close().await;
    }

    served.context("HTTP server failed")
}
