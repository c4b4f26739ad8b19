use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tracing::{debug, error, info};

/// Connect to `database_url` and apply every pending migration.
pub async fn init_database(database_url: &str) -> Result<()> {
    info!("Initializing database");
    debug!("Database URL: {}", database_url);

    let db = Database::connect(database_url).await.map_err(|e| {
        error!("Failed to connect to database '{}': {}", database_url, e);
        e
    })?;

    let pending = Migrator::get_pending_migrations(&db).await?.len();
    debug!("{} migrations pending", pending);

    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run database migrations: {}", e);
        return Err(e.into());
    }

    info!("Database initialized, {} migrations applied", pending);
    Ok(())
}
