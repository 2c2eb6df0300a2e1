#![cfg(test)]
use migration::MigratorTrait;
use models::db::connect_with_config;
use sea_orm::DatabaseConnection;

/// Fresh SQLite database in the temp dir, migrated with `M`.
///
/// Every call gets its own file so tests never share state.
pub async fn sqlite_db<M: MigratorTrait>() -> Result<DatabaseConnection, anyhow::Error> {
    let path = std::env::temp_dir().join(format!("service-test-{}.db", uuid::Uuid::new_v4()));
    let cfg = configs::DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        max_connections: 1,
        min_connections: 1,
        ..Default::default()
    };
    let db = connect_with_config(&cfg).await?;
    M::up(&db, None).await?;
    Ok(db)
}
