use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, DbErr};

use crate::config::DatabaseConfig;

/// Opens a pooled connection to the database described by `config`.
#[tracing::instrument(skip(config), fields(host = %config.host, dbname = %config.dbname))]
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(config.connection_url()).await?;
    tracing::info!("Connected to database");
    Ok(db)
}

/// Applies every pending migration. Migrations that already ran are skipped.
#[tracing::instrument(skip(db))]
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    migration::Migrator::up(db, None).await?;
    tracing::info!("Database migrations applied successfully");
    Ok(())
}
