//! Product repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Product;
use crate::error::DomainError;

use super::SlugIndex;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductOrder {
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
    PriceAsc,
    PriceDesc,
}

/// Listing filter. Default queries only see active products; the
/// administrative path can opt in to inactive ones.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub search: Option<String>,
    pub order: ProductOrder,
    pub include_inactive: bool,
    pub page: u32,
    pub page_size: u32,
}

#[async_trait]
pub trait ProductRepository: SlugIndex + Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Product>, DomainError>;

    /// Default lookup: active products only.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, DomainError>;

    /// Administrative lookup: ignores the soft-delete flag.
    async fn find_by_slug_any(&self, slug: &str) -> Result<Option<Product>, DomainError>;

    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError>;

    async fn create(&self, product: &Product) -> Result<Product, DomainError>;

    async fn update(&self, product: &Product) -> Result<Product, DomainError>;

    /// Compare-and-set write of the thumbnail reference. Returns `true` if the
    /// reference was written, `false` if a thumbnail was already present.
    async fn set_thumbnail_if_absent(
        &self,
        id: &Uuid,
        thumbnail: &str,
    ) -> Result<bool, DomainError>;

    /// Clear the category reference on every product pointing at
    /// `category_id`. Returns the number of products touched.
    async fn detach_category(&self, category_id: &Uuid) -> Result<u64, DomainError>;
}
