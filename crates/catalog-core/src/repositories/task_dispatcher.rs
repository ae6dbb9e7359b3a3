//! Async task dispatcher trait (port)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Request to generate a thumbnail for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailJob {
    pub product_id: Uuid,
}

/// At-least-once delivery to some worker. No ordering guarantee across
/// distinct jobs, no delivery timing guarantee.
#[async_trait]
pub trait TaskDispatcher: Send + Sync {
    async fn enqueue(&self, job: ThumbnailJob) -> Result<(), DomainError>;
}
