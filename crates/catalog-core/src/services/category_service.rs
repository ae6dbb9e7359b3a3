//! Category lifecycle service
//!
//! Same slug rules as products, but categories are hard-deleted. Deleting a
//! category explicitly detaches product references first: products degrade to
//! "uncategorized", they are never cascade-deleted.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::domain::Category;
use crate::error::DomainError;
use crate::repositories::{CategoryRepository, ProductRepository};
use crate::services::slug;

/// Validated field set supplied by the request boundary.
#[derive(Debug, Clone, Default)]
pub struct CategoryFields {
    pub name: Option<String>,
    pub slug: Option<String>,
}

fn supplied(slug: &Option<String>) -> Option<&str> {
    slug.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub struct CategoryService<C: CategoryRepository, P: ProductRepository> {
    repo: Arc<C>,
    products: Arc<P>,
}

impl<C: CategoryRepository, P: ProductRepository> CategoryService<C, P> {
    pub fn new(repo: Arc<C>, products: Arc<P>) -> Self {
        Self { repo, products }
    }

    pub async fn create(&self, fields: CategoryFields) -> Result<Category, DomainError> {
        let name = fields
            .name
            .ok_or_else(|| DomainError::ValidationError("name is required".into()))?;

        if self.repo.find_by_name(&name).await?.is_some() {
            return Err(DomainError::CategoryNameAlreadyExists(name));
        }

        let slug = match supplied(&fields.slug) {
            Some(s) => s.to_string(),
            None => slug::allocate(self.repo.as_ref(), &name, None).await?,
        };

        let category = Category::new(name, slug)?;
        let created = self.repo.create(&category).await?;

        info!("Created category {} ({})", created.slug, created.id);
        Ok(created)
    }

    pub async fn update(
        &self,
        existing: Category,
        fields: CategoryFields,
    ) -> Result<Category, DomainError> {
        let name_changed = fields
            .name
            .as_ref()
            .map(|n| *n != existing.name)
            .unwrap_or(false);

        let mut updated = existing;

        if let Some(name) = fields.name {
            if name.trim().is_empty() {
                return Err(DomainError::ValidationError("name must not be empty".into()));
            }
            updated.name = name;
        }

        match supplied(&fields.slug) {
            Some(s) => updated.slug = s.to_string(),
            None if name_changed => {
                updated.slug =
                    slug::allocate(self.repo.as_ref(), &updated.name, Some(&updated.id)).await?;
            }
            None => {}
        }

        updated.updated_at = Some(Utc::now());
        self.repo.update(&updated).await
    }

    /// Physical removal. Product references are cleared first so products
    /// degrade to "uncategorized" instead of failing or cascading.
    pub async fn delete(&self, slug: &str) -> Result<(), DomainError> {
        let category = self.get(slug).await?;

        let detached = self.products.detach_category(&category.id).await?;
        self.repo.delete(&category.id).await?;

        info!(
            "Deleted category {} ({} products detached)",
            slug, detached
        );
        Ok(())
    }

    pub async fn get(&self, slug: &str) -> Result<Category, DomainError> {
        self.repo
            .find_by_slug(slug)
            .await?
            .ok_or(DomainError::CategoryNotFound)
    }

    pub async fn list(&self) -> Result<Vec<Category>, DomainError> {
        self.repo.list().await
    }
}
