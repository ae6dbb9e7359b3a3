//! Health probe implementations
//!
//! Each probe reduces its subsystem to healthy/unhealthy and never lets an
//! error escape; the aggregator in catalog-core applies the timeout and the
//! composite reduction.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

use catalog_core::services::{HealthProbe, ProbeStatus};

use crate::queue::InProcessDispatcher;

/// Trivial no-op query against the database.
pub struct DatabaseProbe {
    pool: PgPool,
}

impl DatabaseProbe {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthProbe for DatabaseProbe {
    fn name(&self) -> &str {
        "database"
    }

    async fn probe(&self) -> ProbeStatus {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => ProbeStatus::Healthy,
            Err(e) => {
                warn!("Database probe failed: {}", e);
                ProbeStatus::Unhealthy
            }
        }
    }
}

/// Liveness of the dispatcher channel.
pub struct BrokerProbe {
    dispatcher: InProcessDispatcher,
}

impl BrokerProbe {
    pub fn new(dispatcher: InProcessDispatcher) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl HealthProbe for BrokerProbe {
    fn name(&self) -> &str {
        "broker"
    }

    async fn probe(&self) -> ProbeStatus {
        if self.dispatcher.is_open() {
            ProbeStatus::Healthy
        } else {
            warn!("Broker probe: dispatcher channel closed");
            ProbeStatus::Unhealthy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broker_probe_tracks_channel_state() {
        let (dispatcher, rx) = InProcessDispatcher::new(4);
        let probe = BrokerProbe::new(dispatcher.clone());

        assert_eq!(probe.probe().await, ProbeStatus::Healthy);

        drop(rx);
        assert_eq!(probe.probe().await, ProbeStatus::Unhealthy);
    }
}
