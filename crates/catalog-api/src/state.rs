use std::sync::Arc;

use catalog_core::services::{CategoryService, HealthAggregator, ProductService};
use catalog_infrastructure::{
    FsBlobStore, InProcessDispatcher, PgCategoryRepository, PgProductRepository,
};

pub type Products = ProductService<PgProductRepository, InProcessDispatcher>;
pub type Categories = CategoryService<PgCategoryRepository, PgProductRepository>;

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<Products>,
    pub categories: Arc<Categories>,
    pub blobs: Arc<FsBlobStore>,
    pub health: Arc<HealthAggregator>,
}
