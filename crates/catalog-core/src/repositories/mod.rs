//! Repository traits (ports)

pub mod blob_store;
pub mod category_repository;
pub mod product_repository;
pub mod task_dispatcher;

pub use blob_store::BlobStore;
pub use category_repository::CategoryRepository;
pub use product_repository::{ProductFilter, ProductOrder, ProductRepository};
pub use task_dispatcher::{TaskDispatcher, ThumbnailJob};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;

/// Uniqueness check used by the slug allocator. Each entity type has its own
/// slug namespace, so each repository implements it against its own table.
#[async_trait]
pub trait SlugIndex: Send + Sync {
    /// Whether `slug` is already taken by an entity other than `exclude`.
    /// `exclude` avoids self-collision when reallocating on update.
    async fn slug_exists(&self, slug: &str, exclude: Option<&Uuid>) -> Result<bool, DomainError>;
}
