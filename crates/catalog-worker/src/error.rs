//! Worker errors

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum WorkerError {
    /// The product was deleted between enqueue and processing. Permanent.
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    /// Decode failure or storage hiccup. Retried with backoff; corrupt image
    /// data lands here too and is treated as transient.
    #[error("Transient media error: {0}")]
    TransientMedia(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl WorkerError {
    pub fn is_retriable(&self) -> bool {
        !matches!(self, WorkerError::ProductNotFound(_))
    }
}
