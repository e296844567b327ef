//! Models for the `import_error_log` table.

use fleetdesk_core::importer::ErrorLogEntry;
use fleetdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `import_error_log` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImportErrorEntry {
    pub id: DbId,
    pub error_message: String,
    pub context: String,
    pub related_sql: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for recording a failed statement.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateImportErrorEntry {
    pub error_message: String,
    pub context: String,
    pub related_sql: Option<String>,
}

impl From<ImportErrorEntry> for ErrorLogEntry {
    fn from(entry: ImportErrorEntry) -> Self {
        Self {
            id: entry.id,
            error_message: entry.error_message,
            context: entry.context,
            related_sql: entry.related_sql,
            created_at: entry.created_at,
        }
    }
}
