//! Domain errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Product not found: {0}")]
    ProductNotFoundById(String),

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Category name already exists: {0}")]
    CategoryNameAlreadyExists(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Queue error: {0}")]
    QueueError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
