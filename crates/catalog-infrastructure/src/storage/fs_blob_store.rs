//! Filesystem blob store
//!
//! Stores blobs under a root directory. References are root-relative paths
//! such as `products/camera.jpg`. Writes go through a temp file and rename so
//! readers never observe a partial blob.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use catalog_core::error::DomainError;
use catalog_core::repositories::BlobStore;

pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, blob_ref: &str) -> Result<PathBuf, DomainError> {
        let rel = Path::new(blob_ref);
        // Only plain relative paths; no traversal out of the root.
        let safe = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || rel.as_os_str().is_empty() {
            return Err(DomainError::StorageError(format!(
                "invalid blob reference: {}",
                blob_ref
            )));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn read(&self, blob_ref: &str) -> Result<Vec<u8>, DomainError> {
        let path = self.resolve(blob_ref)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| DomainError::StorageError(format!("reading {}: {}", blob_ref, e)))
    }

    async fn write(&self, name: &str, data: &[u8]) -> Result<String, DomainError> {
        let path = self.resolve(name)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::StorageError(format!("creating {}: {}", name, e)))?;
        }

        let tmp = path.with_extension(format!("tmp-{}", Uuid::new_v4().simple()));
        tokio::fs::write(&tmp, data)
            .await
            .map_err(|e| DomainError::StorageError(format!("writing {}: {}", name, e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| DomainError::StorageError(format!("writing {}: {}", name, e)))?;

        debug!("Stored blob {} ({} bytes)", name, data.len());
        Ok(name.to_string())
    }
}
