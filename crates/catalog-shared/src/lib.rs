//! # Catalog Shared
//!
//! Configuration and telemetry shared across the catalog crates.

pub mod config;
pub mod telemetry;

pub use config::AppConfig;
