//! Repository for the `import_error_log` table.

use async_trait::async_trait;
use fleetdesk_core::error::CoreError;
use fleetdesk_core::importer::{ErrorLog, ErrorLogEntry};
use fleetdesk_core::types::DbId;

use crate::models::import_error::{CreateImportErrorEntry, ImportErrorEntry};
use crate::DbPool;

/// Column list for import_error_log queries.
const COLUMNS: &str = "id, error_message, context, related_sql, created_at";

/// Upper bound on rows returned by [`ImportErrorRepo::list_recent`].
pub const MAX_LIST_LIMIT: i64 = 500;

/// Provides data-access methods for import error entries.
pub struct ImportErrorRepo;

impl ImportErrorRepo {
    /// Record a failed statement and return the stored row.
    pub async fn create(
        pool: &DbPool,
        input: &CreateImportErrorEntry,
    ) -> Result<ImportErrorEntry, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO import_error_log (error_message, context, related_sql) VALUES (?, ?, ?)",
        )
        .bind(&input.error_message)
        .bind(&input.context)
        .bind(&input.related_sql)
        .execute(pool)
        .await?;

        Self::find_by_id(pool, result.last_insert_id() as DbId)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(
        pool: &DbPool,
        id: DbId,
    ) -> Result<Option<ImportErrorEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM import_error_log WHERE id = ?");
        sqlx::query_as::<_, ImportErrorEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Most recent entries first. `limit` is clamped to `1..=MAX_LIST_LIMIT`.
    pub async fn list_recent(
        pool: &DbPool,
        limit: i64,
    ) -> Result<Vec<ImportErrorEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM import_error_log
             ORDER BY created_at DESC, id DESC
             LIMIT ?"
        );
        sqlx::query_as::<_, ImportErrorEntry>(&query)
            .bind(limit.clamp(1, MAX_LIST_LIMIT))
            .fetch_all(pool)
            .await
    }
}

/// [`ErrorLog`] that persists entries through [`ImportErrorRepo`].
#[derive(Debug, Clone)]
pub struct DbErrorLog {
    pool: DbPool,
}

impl DbErrorLog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ErrorLog for DbErrorLog {
    async fn log_error(
        &self,
        error: &str,
        context: &str,
        related_sql: &str,
    ) -> Result<(), CoreError> {
        let input = CreateImportErrorEntry {
            error_message: error.to_string(),
            context: context.to_string(),
            related_sql: Some(related_sql.to_string()).filter(|s| !s.is_empty()),
        };
        let entry = ImportErrorRepo::create(&self.pool, &input)
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to write import error log: {e}")))?;
        tracing::debug!(id = entry.id, context, "Import error logged");
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ErrorLogEntry>, CoreError> {
        let limit = i64::try_from(limit).unwrap_or(MAX_LIST_LIMIT);
        let entries = ImportErrorRepo::list_recent(&self.pool, limit)
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to read import error log: {e}")))?;
        Ok(entries.into_iter().map(ErrorLogEntry::from).collect())
    }
}
