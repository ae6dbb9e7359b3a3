//! # Catalog Infrastructure
//!
//! Adapters for the catalog-core ports: Postgres repositories, filesystem
//! blob storage, the in-process task dispatcher, and health probes.

pub mod database;
pub mod probes;
pub mod queue;
pub mod storage;

pub use database::connection::create_pool;
pub use database::postgres::{PgCategoryRepository, PgProductRepository};
pub use probes::{BrokerProbe, DatabaseProbe};
pub use queue::InProcessDispatcher;
pub use storage::FsBlobStore;
