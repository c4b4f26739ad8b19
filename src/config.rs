use anyhow::Result;
use config::{Config, Environment, File};
use migration::{Migrator, MigratorTrait};
use moka::future::Cache;
use sea_orm::Database;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::schemas::AppState;

/// Runtime settings, layered from defaults, an optional `fintrack.toml`
/// and `FINTRACK_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    /// Maximum number of cached entries
    pub cache_capacity: u64,
    /// Cache time-to-live in seconds
    pub cache_ttl_secs: u64,
    /// Days ahead planned occurrences are materialized
    pub horizon_days: u32,
    /// Default dashboard window in days
    pub overview_days: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://fintrack.db?mode=rwc".to_string(),
            bind_address: "0.0.0.0:3000".to_string(),
            cache_capacity: 1000,
            cache_ttl_secs: 300,
            horizon_days: 90,
            overview_days: 30,
        }
    }
}

impl Settings {
    /// Load settings; `.env` is read first so it can feed the environment layer.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Settings::default();

        let settings = Config::builder()
            .set_default("database_url", defaults.database_url)?
            .set_default("bind_address", defaults.bind_address)?
            .set_default("cache_capacity", defaults.cache_capacity as i64)?
            .set_default("cache_ttl_secs", defaults.cache_ttl_secs as i64)?
            .set_default("horizon_days", defaults.horizon_days as i64)?
            .set_default("overview_days", defaults.overview_days as i64)?
            .add_source(File::with_name("fintrack").required(false))
            .add_source(Environment::with_prefix("FINTRACK"))
            .build()?
            .try_deserialize::<Settings>()?;

        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }
}

/// Initialize application state from settings
pub async fn initialize_app_state(settings: Settings) -> Result<AppState> {
    info!("Connecting to database: {}", settings.database_url);
    let db = Database::connect(&settings.database_url).await?;

    let cache = Cache::builder()
        .max_capacity(settings.cache_capacity)
        .time_to_live(Duration::from_secs(settings.cache_ttl_secs))
        .build();

    Ok(AppState {
        db,
        cache,
        settings,
    })
}

/// Initialize application state, optionally applying pending migrations first
pub async fn initialize_app_state_with_migrations(settings: Settings, migrate: bool) -> Result<AppState> {
    let state = initialize_app_state(settings).await?;
    if migrate {
        info!("Running database migrations");
        Migrator::up(&state.db, None).await?;
    }
    Ok(state)
}
