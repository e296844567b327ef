//! [`QueryGateway`] backed by a MySQL pool.
//!
//! Statements go over the text protocol exactly as received, so anything the
//! server accepts (DDL, `SET`, `INSERT IGNORE`, ...) works. Cells are
//! converted to JSON by column type: integers and floating point become
//! numbers, `JSON` columns are parsed, `NULL` is `null`, and everything else
//! (including `DECIMAL` and temporal types) is returned as text.

use async_trait::async_trait;
use fleetdesk_core::gateway::{returns_rows, GatewayError, QueryGateway, QueryResults, WriteResult};
use fleetdesk_core::types::Row;
use futures::TryStreamExt;
use serde_json::Value;
use sqlx::mysql::{MySqlDatabaseError, MySqlRow};
use sqlx::{Column, Either, Row as _, TypeInfo};

use crate::DbPool;

const INTEGER_TYPES: &[&str] = &[
    "BOOLEAN",
    "TINYINT",
    "SMALLINT",
    "MEDIUMINT",
    "INT",
    "BIGINT",
    "YEAR",
];

#[derive(Debug, Clone)]
pub struct MySqlGateway {
    pool: DbPool,
}

impl MySqlGateway {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl QueryGateway for MySqlGateway {
    async fn execute(&self, sql: &str) -> Result<QueryResults, GatewayError> {
        let mut stream = sqlx::raw_sql(sql).fetch_many(&self.pool);

        let mut rows = Vec::new();
        let mut write = WriteResult::default();

        while let Some(item) = stream.try_next().await.map_err(map_sqlx_error)? {
            match item {
                Either::Left(done) => {
                    write.affected_rows += done.rows_affected();
                    write.insert_id = done.last_insert_id();
                }
                Either::Right(row) => rows.push(row_to_json(&row)),
            }
        }

        if !rows.is_empty() || returns_rows(sql) {
            Ok(QueryResults::Rows(rows))
        } else {
            Ok(QueryResults::Write(write))
        }
    }
}

/// Convert a driver error into the gateway taxonomy, keeping the server's
/// message, SQLSTATE and error number verbatim.
pub fn map_sqlx_error(err: sqlx::Error) -> GatewayError {
    match &err {
        sqlx::Error::Database(db_err) => {
            let errno = db_err
                .try_downcast_ref::<MySqlDatabaseError>()
                .map(MySqlDatabaseError::number);
            GatewayError::QueryExecution {
                message: db_err.message().to_string(),
                sql_state: db_err.code().map(|c| c.into_owned()),
                errno,
            }
        }
        _ => GatewayError::execution(err.to_string()),
    }
}

fn row_to_json(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .map(|column| {
            let ordinal = column.ordinal();
            let raw = row
                .try_get_unchecked::<Option<Vec<u8>>, _>(ordinal)
                .ok()
                .flatten();
            let value = match raw {
                Some(bytes) => cell_to_json(column.type_info().name(), &bytes),
                None => Value::Null,
            };
            (column.name().to_string(), value)
        })
        .collect()
}

/// Convert one text-protocol cell to JSON by its column type name.
pub fn cell_to_json(type_name: &str, bytes: &[u8]) -> Value {
    let text = String::from_utf8_lossy(bytes);
    let base = type_name.split_whitespace().next().unwrap_or_default();

    if base == "NULL" {
        return Value::Null;
    }

    if INTEGER_TYPES.contains(&base) {
        if let Ok(n) = text.parse::<i64>() {
            return Value::from(n);
        }
        if let Ok(n) = text.parse::<u64>() {
            return Value::from(n);
        }
    } else if base == "FLOAT" || base == "DOUBLE" {
        if let Some(n) = text.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
            return Value::Number(n);
        }
    } else if base == "JSON" {
        if let Ok(parsed) = serde_json::from_str(&text) {
            return parsed;
        }
    }

    Value::String(text.into_owned())
}
