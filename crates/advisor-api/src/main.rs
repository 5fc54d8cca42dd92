//! Advisor API binary.
//!
//! Standalone HTTP service for LLM-backed cost recommendations.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use advisor::{FileInventory, ProviderRegistry, RecommendationCache, TaskRegistry};
use advisor_api::{routes, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("advisor_api=info".parse()?)
                .add_directive("advisor=info".parse()?),
        )
        .init();

    info!("Starting advisor API...");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Open the recommendation cache
    let pool = SqlitePool::connect(&config.database_url)
        .await
        .context("Failed to open cache database")?;
    let cache = RecommendationCache::new(pool);
    cache
        .init()
        .await
        .context("Failed to initialize recommendation cache")?;

    info!(
        provider = %config.provider,
        model = %config.model,
        inventory = %config.inventory_root.display(),
        "Configuration loaded"
    );

    let state = Arc::new(AppState {
        registry: Arc::new(TaskRegistry::new()),
        providers: Arc::new(ProviderRegistry::with_defaults()),
        inventory: Arc::new(FileInventory::new(&config.inventory_root)),
        cache,
        config: config.clone(),
    });

    // Registry hygiene: finished tasks stay visible to the status endpoint
    // for a while, then get swept.
    let sweeper = state.registry.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(900));
        tick.tick().await;
        loop {
            tick.tick().await;
            let removed = sweeper.sweep_finished();
            if removed > 0 {
                debug!(removed, "swept finished tasks");
            }
        }
    });

    let app = routes::build_router(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "Listening");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
