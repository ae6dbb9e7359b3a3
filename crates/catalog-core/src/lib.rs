//! # Catalog Core
//!
//! Domain entities, services, and repository traits for the catalog backend.

pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
