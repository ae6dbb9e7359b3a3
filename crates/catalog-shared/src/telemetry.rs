//! Telemetry setup
//!
//! Development gets human-readable logs; every other environment emits JSON
//! lines. `RUST_LOG` overrides the per-environment defaults.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppSettings;

pub fn init_telemetry(app: &AppSettings) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&app.env)));
    let registry = tracing_subscriber::registry().with(env_filter);

    if app.env == "development" {
        registry.with(fmt::layer()).init();
    } else {
        registry.with(fmt::layer().json()).init();
    }
}

fn default_directives(env: &str) -> &'static str {
    if env == "development" {
        "info,catalog_api=debug,catalog_core=debug,catalog_infrastructure=debug,\
         catalog_worker=debug"
    } else {
        "info"
    }
}
