//! Blob storage trait (port)

use async_trait::async_trait;

use crate::error::DomainError;

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn read(&self, blob_ref: &str) -> Result<Vec<u8>, DomainError>;

    /// Store `data` under `name`, returning the reference to read it back.
    async fn write(&self, name: &str, data: &[u8]) -> Result<String, DomainError>;
}
