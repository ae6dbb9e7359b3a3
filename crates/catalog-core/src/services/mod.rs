//! Domain services

pub mod category_service;
pub mod health;
pub mod product_service;
pub mod slug;

pub use category_service::{CategoryFields, CategoryService};
pub use health::{HealthAggregator, HealthProbe, HealthReport, OverallStatus, ProbeStatus};
pub use product_service::{ProductFields, ProductService};
