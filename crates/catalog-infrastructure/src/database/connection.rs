//! Database connection pool

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::debug;

/// Pool sized and time-bounded from `DatabaseSettings`: a saturated pool
/// fails the acquire after `acquire_timeout` instead of queueing forever.
pub async fn create_pool(
    url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(url)
        .await?;

    debug!("Connection pool ready ({} max connections)", max_connections);
    Ok(pool)
}
