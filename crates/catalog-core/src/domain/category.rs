//! Category domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,

    // Audit
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Category {
    pub fn new(name: String, slug: String) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::ValidationError("name must not be empty".into()));
        }
        if slug.trim().is_empty() {
            return Err(DomainError::ValidationError("slug must not be empty".into()));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            slug,
            created_at: Utc::now(),
            updated_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_category() {
        let category = Category::new("Phones".to_string(), "phones".to_string());
        assert!(category.is_ok());
    }

    #[test]
    fn test_blank_name_rejected() {
        let category = Category::new("  ".to_string(), "phones".to_string());
        assert!(category.is_err());
    }
}
