//! Domain entities

pub mod category;
pub mod product;

pub use category::Category;
pub use product::Product;
