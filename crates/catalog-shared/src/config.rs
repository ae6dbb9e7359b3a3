//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
    pub thumbnail: ThumbnailSettings,
    pub dispatcher: DispatcherSettings,
    pub health: HealthSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub root: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ThumbnailSettings {
    pub max_dimension: u32,
    pub quality: u8,
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DispatcherSettings {
    pub queue_capacity: usize,
    pub workers: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HealthSettings {
    pub probe_timeout_ms: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "catalog-api")?
            .set_default("database.max_connections", 10)?
            .set_default("database.acquire_timeout_secs", 3)?
            .set_default("storage.root", "media")?
            .set_default("thumbnail.max_dimension", 300)?
            .set_default("thumbnail.quality", 85)?
            .set_default("thumbnail.max_attempts", 5)?
            .set_default("thumbnail.backoff_base_ms", 200)?
            .set_default("dispatcher.queue_capacity", 256)?
            .set_default("dispatcher.workers", 2)?
            .set_default("health.probe_timeout_ms", 1000)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;
        config.try_deserialize()
    }
}
