pub mod category_repo_impl;
pub mod product_repo_impl;

pub use category_repo_impl::PgCategoryRepository;
pub use product_repo_impl::PgProductRepository;
