//! Worker pool
//!
//! Spawns N workers over the dispatcher's receiving end. Each worker runs
//! jobs through the retry policy; jobs that exhaust their attempts (or fail
//! permanently) are reported on the dead-letter channel, never silently
//! dropped. Workers answer broadcast pings so the health aggregator can
//! observe pool liveness.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use catalog_core::repositories::ThumbnailJob;
use catalog_core::services::{HealthProbe, ProbeStatus};

use crate::processor::JobProcessor;
use crate::retry::RetryPolicy;

/// Job that exhausted its retries or failed permanently.
#[derive(Debug)]
pub struct DeadLetter {
    pub job: ThumbnailJob,
    pub error: String,
    pub attempts: u32,
}

#[derive(Clone)]
struct Ping {
    reply: mpsc::Sender<usize>,
}

/// Handle for pinging the pool. Cheap to clone.
#[derive(Clone)]
pub struct WorkerPoolHandle {
    ping_tx: broadcast::Sender<Ping>,
}

impl WorkerPoolHandle {
    /// Broadcast a ping to all workers; any pong within `timeout` counts as
    /// alive.
    pub async fn ping(&self, timeout: Duration) -> bool {
        let (reply_tx, mut reply_rx) = mpsc::channel(16);
        if self.ping_tx.send(Ping { reply: reply_tx }).is_err() {
            // No worker is subscribed.
            return false;
        }
        matches!(
            tokio::time::timeout(timeout, reply_rx.recv()).await,
            Ok(Some(_))
        )
    }
}

pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` workers consuming `jobs`. Returns the pool, the ping
    /// handle, and the dead-letter receiver.
    pub fn spawn<P: JobProcessor + 'static>(
        processor: Arc<P>,
        jobs: mpsc::Receiver<ThumbnailJob>,
        policy: RetryPolicy,
        size: usize,
    ) -> (Self, WorkerPoolHandle, mpsc::Receiver<DeadLetter>) {
        let (ping_tx, _) = broadcast::channel::<Ping>(16);
        let (dead_tx, dead_rx) = mpsc::channel(64);
        let jobs = Arc::new(Mutex::new(jobs));

        let mut handles = Vec::with_capacity(size.max(1));
        for worker_id in 0..size.max(1) {
            let processor = processor.clone();
            let policy = policy.clone();
            let jobs = jobs.clone();
            let dead_tx = dead_tx.clone();
            let mut ping_rx = ping_tx.subscribe();

            handles.push(tokio::spawn(async move {
                info!("Thumbnail worker {} started", worker_id);
                loop {
                    tokio::select! {
                        ping = ping_rx.recv() => {
                            if let Ok(ping) = ping {
                                let _ = ping.reply.send(worker_id).await;
                            }
                        }
                        job = async { jobs.lock().await.recv().await } => {
                            match job {
                                Some(job) => {
                                    run_job(processor.as_ref(), &policy, job, &dead_tx).await;
                                }
                                None => break,
                            }
                        }
                    }
                }
                info!("Thumbnail worker {} stopped", worker_id);
            }));
        }

        (
            Self { handles },
            WorkerPoolHandle { ping_tx },
            dead_rx,
        )
    }

    pub fn abort(&self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

async fn run_job<P: JobProcessor + ?Sized>(
    processor: &P,
    policy: &RetryPolicy,
    job: ThumbnailJob,
    dead_tx: &mpsc::Sender<DeadLetter>,
) {
    let mut attempt = 1;
    loop {
        match processor.process(job).await {
            Ok(outcome) => {
                info!(
                    "Thumbnail job for {} finished: {:?} (attempt {})",
                    job.product_id, outcome, attempt
                );
                return;
            }
            Err(e) if e.is_retriable() && attempt < policy.max_attempts => {
                let delay = policy.backoff(attempt);
                warn!(
                    "Thumbnail job for {} failed (attempt {}/{}), retrying in {:?}: {}",
                    job.product_id, attempt, policy.max_attempts, delay, e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                error!(
                    "Thumbnail job for {} permanently failed after {} attempt(s): {}",
                    job.product_id, attempt, e
                );
                let _ = dead_tx
                    .send(DeadLetter {
                        job,
                        error: e.to_string(),
                        attempts: attempt,
                    })
                    .await;
                return;
            }
        }
    }
}

/// Health probe over the pool's ping handle.
pub struct WorkerPoolProbe {
    handle: WorkerPoolHandle,
    timeout: Duration,
}

impl WorkerPoolProbe {
    pub fn new(handle: WorkerPoolHandle, timeout: Duration) -> Self {
        Self { handle, timeout }
    }
}

#[async_trait]
impl HealthProbe for WorkerPoolProbe {
    fn name(&self) -> &str {
        "worker_pool"
    }

    async fn probe(&self) -> ProbeStatus {
        if self.handle.ping(self.timeout).await {
            ProbeStatus::Healthy
        } else {
            ProbeStatus::Unhealthy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkerError;
    use crate::processor::ThumbnailOutcome;
    use std::sync::atomic::{AtomicU32, Ordering};
    use uuid::Uuid;

    struct FlakyProcessor {
        calls: AtomicU32,
        succeed_after: u32,
        retriable: bool,
    }

    #[async_trait]
    impl JobProcessor for FlakyProcessor {
        async fn process(&self, job: ThumbnailJob) -> Result<ThumbnailOutcome, WorkerError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call >= self.succeed_after {
                Ok(ThumbnailOutcome::Generated)
            } else if self.retriable {
                Err(WorkerError::TransientMedia("flaky".into()))
            } else {
                Err(WorkerError::ProductNotFound(job.product_id))
            }
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn test_transient_failure_retries_to_success() {
        let processor = Arc::new(FlakyProcessor {
            calls: AtomicU32::new(0),
            succeed_after: 3,
            retriable: true,
        });
        let (tx, rx) = mpsc::channel(4);
        let (pool, _handle, mut dead_rx) =
            WorkerPool::spawn(processor.clone(), rx, fast_policy(5), 1);

        tx.send(ThumbnailJob {
            product_id: Uuid::new_v4(),
        })
        .await
        .unwrap();
        drop(tx);

        // Worker drains the queue and exits on channel close.
        tokio::time::timeout(Duration::from_secs(5), async {
            for handle in pool.handles {
                handle.await.unwrap();
            }
        })
        .await
        .unwrap();

        assert_eq!(processor.calls.load(Ordering::SeqCst), 3);
        assert!(dead_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_exhausted_retries_land_in_dead_letter() {
        let processor = Arc::new(FlakyProcessor {
            calls: AtomicU32::new(0),
            succeed_after: u32::MAX,
            retriable: true,
        });
        let (tx, rx) = mpsc::channel(4);
        let (_pool, _handle, mut dead_rx) =
            WorkerPool::spawn(processor.clone(), rx, fast_policy(5), 1);

        let job = ThumbnailJob {
            product_id: Uuid::new_v4(),
        };
        tx.send(job).await.unwrap();

        let dead = tokio::time::timeout(Duration::from_secs(5), dead_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(dead.job, job);
        assert_eq!(dead.attempts, 5);
        assert_eq!(processor.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_permanent_failure_does_not_retry() {
        let processor = Arc::new(FlakyProcessor {
            calls: AtomicU32::new(0),
            succeed_after: u32::MAX,
            retriable: false,
        });
        let (tx, rx) = mpsc::channel(4);
        let (_pool, _handle, mut dead_rx) =
            WorkerPool::spawn(processor.clone(), rx, fast_policy(5), 1);

        tx.send(ThumbnailJob {
            product_id: Uuid::new_v4(),
        })
        .await
        .unwrap();

        let dead = tokio::time::timeout(Duration::from_secs(5), dead_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(dead.attempts, 1);
        assert_eq!(processor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ping_pong() {
        let processor = Arc::new(FlakyProcessor {
            calls: AtomicU32::new(0),
            succeed_after: 1,
            retriable: true,
        });
        let (_tx, rx) = mpsc::channel::<ThumbnailJob>(4);
        let (pool, handle, _dead_rx) = WorkerPool::spawn(processor, rx, fast_policy(5), 2);

        assert!(handle.ping(Duration::from_secs(1)).await);

        let probe = WorkerPoolProbe::new(handle.clone(), Duration::from_secs(1));
        assert_eq!(probe.probe().await, ProbeStatus::Healthy);

        pool.abort();
        // Give the aborted tasks a moment to unwind their subscriptions.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.ping(Duration::from_millis(100)).await);
    }
}
