//! Category repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Category;
use crate::error::DomainError;

use super::SlugIndex;

#[async_trait]
pub trait CategoryRepository: SlugIndex + Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Category>, DomainError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, DomainError>;

    /// All categories, ordered by name.
    async fn list(&self) -> Result<Vec<Category>, DomainError>;

    async fn create(&self, category: &Category) -> Result<Category, DomainError>;
    async fn update(&self, category: &Category) -> Result<Category, DomainError>;

    /// Physical removal. Product references must be detached first.
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
}
