//! MySQL access: connection pool, the SQL gateway, and the import error log.

pub mod gateway;
pub mod models;
pub mod repositories;

use sqlx::mysql::MySqlPoolOptions;

pub use gateway::MySqlGateway;

pub type DbPool = sqlx::MySqlPool;

/// Create a connection pool from a database URL.
///
/// Statements such as `SET SQL_SAFE_UPDATES = 0` are connection-scoped, so
/// callers relying on them across requests should keep `max_connections`
/// at 1.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    MySqlPoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect(database_url)
        .await
}

/// Run a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations under `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
