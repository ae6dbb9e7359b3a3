//! Product lifecycle service
//!
//! All product mutations go through here: create/update with slug
//! (re)allocation, soft delete, and the thumbnail job dispatch.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::Product;
use crate::error::DomainError;
use crate::repositories::{
    ProductFilter, ProductRepository, TaskDispatcher, ThumbnailJob,
};
use crate::services::slug;

/// Validated field set supplied by the request boundary. `None` means the
/// field was not supplied. `category_id` is doubled: the outer level is
/// supplied-or-not, the inner one attach-or-clear, so an update can unset the
/// category with an explicit null.
#[derive(Debug, Clone, Default)]
pub struct ProductFields {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub category_id: Option<Option<Uuid>>,
    pub image: Option<String>,
}

fn supplied(slug: &Option<String>) -> Option<&str> {
    slug.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub struct ProductService<R: ProductRepository, D: TaskDispatcher> {
    repo: Arc<R>,
    dispatcher: Arc<D>,
}

impl<R: ProductRepository, D: TaskDispatcher> ProductService<R, D> {
    pub fn new(repo: Arc<R>, dispatcher: Arc<D>) -> Self {
        Self { repo, dispatcher }
    }

    /// Create a product. A blank or absent slug is allocated from the name;
    /// an explicit slug is taken as-is. If the product carries an image, a
    /// thumbnail job is enqueued fire-and-forget: creation succeeds
    /// independent of the thumbnail outcome.
    pub async fn create(&self, fields: ProductFields) -> Result<Product, DomainError> {
        let name = fields
            .name
            .ok_or_else(|| DomainError::ValidationError("name is required".into()))?;
        let price = fields
            .price
            .ok_or_else(|| DomainError::ValidationError("price is required".into()))?;
        let stock = fields
            .stock
            .ok_or_else(|| DomainError::ValidationError("stock is required".into()))?;

        // 1. Resolve the slug
        let slug = match supplied(&fields.slug) {
            Some(s) => s.to_string(),
            None => slug::allocate(self.repo.as_ref(), &name, None).await?,
        };

        // 2. Persist
        let product = Product::new(
            name,
            slug,
            fields.description,
            price,
            stock,
            fields.category_id.flatten(),
            fields.image,
        )?;
        let created = self.repo.create(&product).await?;

        info!("Created product {} ({})", created.slug, created.id);

        // 3. Dispatch async thumbnail generation
        if created.image.is_some() {
            let job = ThumbnailJob {
                product_id: created.id,
            };
            if let Err(e) = self.dispatcher.enqueue(job).await {
                warn!("Failed to enqueue thumbnail job for {}: {}", created.id, e);
            }
        }

        Ok(created)
    }

    /// Update a product. The slug is reallocated (excluding the product's own
    /// id) only when the name changed and no explicit slug was supplied; an
    /// explicit slug always wins, even on update.
    pub async fn update(
        &self,
        existing: Product,
        fields: ProductFields,
    ) -> Result<Product, DomainError> {
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

        if let Some(description) = fields.description {
            updated.description = Some(description);
        }
        if let Some(price) = fields.price {
            if price < Decimal::ZERO {
                return Err(DomainError::ValidationError("price must not be negative".into()));
            }
            updated.price = price;
        }
        if let Some(stock) = fields.stock {
            if stock < 0 {
                return Err(DomainError::ValidationError("stock must not be negative".into()));
            }
            updated.stock = stock;
        }
        if let Some(category_change) = fields.category_id {
            updated.category_id = category_change;
        }
        if let Some(image) = fields.image {
            // Image replacement does not re-trigger thumbnail generation.
            updated.image = Some(image);
        }

        updated.updated_at = Some(Utc::now());
        self.repo.update(&updated).await
    }

    /// Soft delete: flip `is_active`, never remove the row. Deleting an
    /// already-inactive product succeeds.
    pub async fn delete(&self, slug: &str) -> Result<(), DomainError> {
        let product = self
            .repo
            .find_by_slug_any(slug)
            .await?
            .ok_or(DomainError::ProductNotFound)?;

        if !product.is_active {
            return Ok(());
        }

        let mut product = product;
        product.deactivate();
        self.repo.update(&product).await?;

        info!("Soft deleted product {}", slug);
        Ok(())
    }

    /// Default lookup: active products only.
    pub async fn get(&self, slug: &str) -> Result<Product, DomainError> {
        self.repo
            .find_by_slug(slug)
            .await?
            .ok_or(DomainError::ProductNotFound)
    }

    /// Administrative lookup: ignores the soft-delete flag.
    pub async fn get_any(&self, slug: &str) -> Result<Product, DomainError> {
        self.repo
            .find_by_slug_any(slug)
            .await?
            .ok_or(DomainError::ProductNotFound)
    }

    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError> {
        self.repo.list(filter).await
    }

    /// Attach an uploaded image and enqueue thumbnail generation when the
    /// product does not have a thumbnail yet.
    pub async fn attach_image(
        &self,
        slug: &str,
        image_ref: String,
    ) -> Result<Product, DomainError> {
        let mut product = self.get(slug).await?;
        product.image = Some(image_ref);
        product.updated_at = Some(Utc::now());
        let saved = self.repo.update(&product).await?;

        if saved.thumbnail.is_none() {
            let job = ThumbnailJob {
                product_id: saved.id,
            };
            if let Err(e) = self.dispatcher.enqueue(job).await {
                warn!("Failed to enqueue thumbnail job for {}: {}", saved.id, e);
            }
        }

        Ok(saved)
    }
}
