use anyhow::{anyhow, Result};
use chrono::{Days, Local};
use sea_orm::Database;
use tracing::{info, trace};

use crate::config::Settings;
use crate::services::{loans, planned};

/// Materialize occurrences up to the configured horizon and mark late loan payments overdue.
pub async fn materialize(settings: &Settings) -> Result<()> {
    trace!("Entering materialize function");
    let today = Local::now().date_naive();
    let horizon = today
        .checked_add_days(Days::new(u64::from(settings.horizon_days)))
        .ok_or_else(|| anyhow!("horizon of {} days is out of range", settings.horizon_days))?;

    let db = Database::connect(&settings.database_url).await?;

    let materialized = planned::materialize_all(&db, horizon).await?;
    info!(
        "Created {} occurrences across {} plans up to {}",
        materialized.created, materialized.plans, materialized.horizon
    );

    let refreshed = loans::refresh_overdue(&db, today).await?;
    info!("Marked {} loan payments overdue", refreshed.updated);

    println!(
        "materialized {} occurrences up to {}, {} loan payments now overdue",
        materialized.created, materialized.horizon, refreshed.updated
    );
    Ok(())
}
