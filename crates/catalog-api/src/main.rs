use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info};

use catalog_core::services::{CategoryService, HealthAggregator, HealthProbe, ProductService};
use catalog_infrastructure::{
    create_pool, BrokerProbe, DatabaseProbe, FsBlobStore, InProcessDispatcher,
    PgCategoryRepository, PgProductRepository,
};
use catalog_shared::{config::AppConfig, telemetry};
use catalog_worker::{
    RetryPolicy, ThumbnailConfig, ThumbnailProcessor, WorkerPool, WorkerPoolProbe,
};

mod dto;
mod error;
mod handlers;
mod response;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;
    telemetry::init_telemetry(&config.app);

    info!("Starting {}...", config.app.name);

    // Database
    let pool = create_pool(
        &config.database.url,
        config.database.max_connections,
        Duration::from_secs(config.database.acquire_timeout_secs),
    )
    .await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;
    info!("Database connection established");

    // Adapters
    let product_repo = Arc::new(PgProductRepository::new(pool.clone()));
    let category_repo = Arc::new(PgCategoryRepository::new(pool.clone()));
    let blobs = Arc::new(FsBlobStore::new(config.storage.root.clone()));

    // Dispatcher + thumbnail worker pool
    let (dispatcher, job_rx) = InProcessDispatcher::new(config.dispatcher.queue_capacity);
    let processor = Arc::new(ThumbnailProcessor::new(
        product_repo.clone(),
        blobs.clone(),
        ThumbnailConfig {
            max_dimension: config.thumbnail.max_dimension,
            quality: config.thumbnail.quality,
        },
    ));
    let retry_policy = RetryPolicy::new(
        config.thumbnail.max_attempts,
        Duration::from_millis(config.thumbnail.backoff_base_ms),
    );
    let (_pool_guard, pool_handle, mut dead_rx) = WorkerPool::spawn(
        processor,
        job_rx,
        retry_policy,
        config.dispatcher.workers,
    );
    info!("Thumbnail worker pool started ({} workers)", config.dispatcher.workers);

    // Permanently failed jobs must never disappear silently.
    tokio::spawn(async move {
        while let Some(dead) = dead_rx.recv().await {
            error!(
                "Dead-lettered thumbnail job for {} after {} attempt(s): {}",
                dead.job.product_id, dead.attempts, dead.error
            );
        }
    });

    // Services
    let products = Arc::new(ProductService::new(
        product_repo.clone(),
        Arc::new(dispatcher.clone()),
    ));
    let categories = Arc::new(CategoryService::new(
        category_repo.clone(),
        product_repo.clone(),
    ));

    // Health
    let probe_timeout = Duration::from_millis(config.health.probe_timeout_ms);
    let probes: Vec<Arc<dyn HealthProbe>> = vec![
        Arc::new(DatabaseProbe::new(pool.clone())),
        Arc::new(BrokerProbe::new(dispatcher)),
        Arc::new(WorkerPoolProbe::new(pool_handle, probe_timeout)),
    ];
    let health = Arc::new(HealthAggregator::new(probes, probe_timeout));

    let state = AppState {
        products,
        categories,
        blobs,
        health,
    };

    let app = routes::build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.app.host, config.app.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
