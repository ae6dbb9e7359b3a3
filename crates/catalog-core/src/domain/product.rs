//! Product domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,

    pub price: Decimal,
    pub stock: i32,

    pub category_id: Option<Uuid>,

    /// Blob reference to the uploaded source image, if any.
    pub image: Option<String>,
    /// Blob reference to the derived thumbnail. Populated at most once by
    /// the thumbnail worker; never set on create.
    pub thumbnail: Option<String>,

    /// Soft-delete flag. Inactive products stay in storage but are hidden
    /// from default queries.
    pub is_active: bool,

    // Audit
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        slug: String,
        description: Option<String>,
        price: Decimal,
        stock: i32,
        category_id: Option<Uuid>,
        image: Option<String>,
    ) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::ValidationError("name must not be empty".into()));
        }
        if slug.trim().is_empty() {
            return Err(DomainError::ValidationError("slug must not be empty".into()));
        }
        if price < Decimal::ZERO {
            return Err(DomainError::ValidationError("price must not be negative".into()));
        }
        if stock < 0 {
            return Err(DomainError::ValidationError("stock must not be negative".into()));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            slug,
            description,
            price,
            stock,
            category_id,
            image,
            thumbnail: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    pub fn is_deleted(&self) -> bool {
        !self.is_active
    }

    /// Flip the soft-delete flag. Idempotent.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_product() {
        let product = Product::new(
            "iPhone".to_string(),
            "iphone".to_string(),
            None,
            Decimal::new(1000, 0),
            10,
            None,
            None,
        );
        assert!(product.is_ok());
        let product = product.unwrap();
        assert!(product.is_active);
        assert!(product.thumbnail.is_none());
    }

    #[test]
    fn test_negative_price_rejected() {
        let product = Product::new(
            "iPhone".to_string(),
            "iphone".to_string(),
            None,
            Decimal::new(-1, 0),
            10,
            None,
            None,
        );
        assert!(product.is_err());
    }

    #[test]
    fn test_negative_stock_rejected() {
        let product = Product::new(
            "iPhone".to_string(),
            "iphone".to_string(),
            None,
            Decimal::new(1000, 0),
            -1,
            None,
            None,
        );
        assert!(product.is_err());
    }

    #[test]
    fn test_deactivate_is_idempotent() {
        let mut product = Product::new(
            "iPhone".to_string(),
            "iphone".to_string(),
            None,
            Decimal::new(1000, 0),
            10,
            None,
            None,
        )
        .unwrap();

        product.deactivate();
        assert!(product.is_deleted());
        product.deactivate();
        assert!(product.is_deleted());
    }
}
