//! Request/response DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use catalog_core::domain::{Category, Product};

/// Wraps a present value in `Some` so a double-`Option` field can tell
/// `{"category": null}` (clear) apart from the key being absent (keep).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price < Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProductCreateRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = validate_price))]
    pub price: Decimal,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub stock: i32,
    /// Category slug, resolved by the handler.
    pub category: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProductUpdateRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = validate_price))]
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub stock: Option<i32>,
    /// Absent keeps the current category; an explicit null clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryCreateRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    pub slug: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CategoryUpdateRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,
    pub slug: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    /// Category slug filter.
    pub category: Option<String>,
    /// Substring match over name and description.
    pub search: Option<String>,
    /// `price`, `-price`, `created_at` or `-created_at`.
    pub ordering: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

#[derive(Debug, Serialize)]
pub struct ProductDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: Option<Uuid>,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            slug: p.slug,
            description: p.description,
            price: p.price,
            stock: p.stock,
            category_id: p.category_id,
            image: p.image,
            thumbnail: p.thumbnail,
            is_active: p.is_active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Category> for CategoryDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_category_null_vs_absent() {
        let absent: ProductUpdateRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.category, None);

        let null: ProductUpdateRequest = serde_json::from_str(r#"{"category": null}"#).unwrap();
        assert_eq!(null.category, Some(None));

        let set: ProductUpdateRequest =
            serde_json::from_str(r#"{"category": "phones"}"#).unwrap();
        assert_eq!(set.category, Some(Some("phones".to_string())));
    }
}
