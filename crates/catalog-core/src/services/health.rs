//! Composite health check
//!
//! Each dependent subsystem sits behind a [`HealthProbe`]. Probes run
//! concurrently, each bounded by its own timeout, and results are merged only
//! after every probe resolves or times out: one probe failing or hanging
//! never prevents the others from running or being reported.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;

/// Outcome of a single probe. Probe failures of any kind reduce to
/// `Unhealthy`; they never propagate as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Ok,
    Degraded,
    Error,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: OverallStatus,
    pub services: BTreeMap<String, ProbeStatus>,
}

#[async_trait]
pub trait HealthProbe: Send + Sync {
    fn name(&self) -> &str;

    /// Must not panic and must swallow its own failures; a hung probe is cut
    /// off by the aggregator's timeout.
    async fn probe(&self) -> ProbeStatus;
}

/// Order-independent three-valued reduction: all healthy → ok, some → degraded,
/// none → error.
pub fn reduce(statuses: &[ProbeStatus]) -> OverallStatus {
    let healthy = statuses
        .iter()
        .filter(|s| **s == ProbeStatus::Healthy)
        .count();
    if healthy == statuses.len() {
        OverallStatus::Ok
    } else if healthy > 0 {
        OverallStatus::Degraded
    } else {
        OverallStatus::Error
    }
}

pub struct HealthAggregator {
    probes: Vec<Arc<dyn HealthProbe>>,
    timeout: Duration,
}

impl HealthAggregator {
    pub fn new(probes: Vec<Arc<dyn HealthProbe>>, timeout: Duration) -> Self {
        Self { probes, timeout }
    }

    pub async fn check(&self) -> HealthReport {
        let checks = self.probes.iter().map(|probe| {
            let probe = probe.clone();
            let timeout = self.timeout;
            async move {
                let status = match tokio::time::timeout(timeout, probe.probe()).await {
                    Ok(status) => status,
                    // A timed-out probe is unhealthy, not an error.
                    Err(_) => ProbeStatus::Unhealthy,
                };
                (probe.name().to_string(), status)
            }
        });

        let results = join_all(checks).await;

        let statuses: Vec<ProbeStatus> = results.iter().map(|(_, s)| *s).collect();
        HealthReport {
            status: reduce(&statuses),
            services: results.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ProbeStatus::{Healthy, Unhealthy};

    struct StaticProbe {
        name: &'static str,
        status: ProbeStatus,
    }

    #[async_trait]
    impl HealthProbe for StaticProbe {
        fn name(&self) -> &str {
            self.name
        }

        async fn probe(&self) -> ProbeStatus {
            self.status
        }
    }

    struct HangingProbe;

    #[async_trait]
    impl HealthProbe for HangingProbe {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn probe(&self) -> ProbeStatus {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Healthy
        }
    }

    #[test]
    fn test_reduce_all_healthy_is_ok() {
        assert_eq!(reduce(&[Healthy, Healthy, Healthy]), OverallStatus::Ok);
    }

    #[test]
    fn test_reduce_partial_is_degraded() {
        assert_eq!(
            reduce(&[Healthy, Unhealthy, Healthy]),
            OverallStatus::Degraded
        );
        assert_eq!(
            reduce(&[Unhealthy, Unhealthy, Healthy]),
            OverallStatus::Degraded
        );
    }

    #[test]
    fn test_reduce_none_healthy_is_error() {
        assert_eq!(
            reduce(&[Unhealthy, Unhealthy, Unhealthy]),
            OverallStatus::Error
        );
    }

    #[tokio::test]
    async fn test_failing_probe_does_not_stop_others() {
        let aggregator = HealthAggregator::new(
            vec![
                Arc::new(StaticProbe {
                    name: "database",
                    status: Healthy,
                }),
                Arc::new(StaticProbe {
                    name: "broker",
                    status: Unhealthy,
                }),
                Arc::new(StaticProbe {
                    name: "worker_pool",
                    status: Healthy,
                }),
            ],
            Duration::from_millis(100),
        );

        let report = aggregator.check().await;
        assert_eq!(report.status, OverallStatus::Degraded);
        assert_eq!(report.services.len(), 3);
        assert_eq!(report.services["database"], Healthy);
        assert_eq!(report.services["broker"], Unhealthy);
        assert_eq!(report.services["worker_pool"], Healthy);
    }

    #[tokio::test]
    async fn test_timed_out_probe_counts_unhealthy() {
        let aggregator = HealthAggregator::new(
            vec![
                Arc::new(StaticProbe {
                    name: "database",
                    status: Healthy,
                }),
                Arc::new(HangingProbe),
            ],
            Duration::from_millis(50),
        );

        let report = aggregator.check().await;
        assert_eq!(report.status, OverallStatus::Degraded);
        assert_eq!(report.services["hanging"], Unhealthy);
    }

    #[tokio::test]
    async fn test_serialized_shape() {
        let aggregator = HealthAggregator::new(
            vec![Arc::new(StaticProbe {
                name: "database",
                status: Healthy,
            })],
            Duration::from_millis(50),
        );

        let report = aggregator.check().await;
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["services"]["database"], "healthy");
    }
}
