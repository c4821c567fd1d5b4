use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement};
use tracing::debug;

use crate::error::StoreError;

pub async fn connect(database_url: &str) -> Result<DatabaseConnection, StoreError> {
    let db = Database::connect(database_url).await?;

    if db.get_database_backend() == DbBackend::Sqlite {
        db.execute(Statement::from_string(DbBackend::Sqlite, "PRAGMA journal_mode=WAL".to_string()))
            .await?;
        db.execute(Statement::from_string(
            DbBackend::Sqlite,
            "PRAGMA synchronous=NORMAL".to_string(),
        ))
        .await?;
    }

    Ok(db)
}

/// Applies pending migrations. Safe to call on every start.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), StoreError> {
    Migrator::up(db, None).await?;
    debug!("database migrations applied");
    Ok(())
}
