//! The query gateway contract.
//!
//! A gateway executes one arbitrary SQL statement and reports either the
//! rows it produced or the write metadata the driver returned. It is a
//! transparent proxy: no allow-list, no transaction wrapping, no timeout.
//! [`run_query`] layers the request rules shared by every transport on top
//! (trimming, the missing-query check, the `insertId` rule).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::Row;

/// Leading keywords of statements that produce a result set.
const ROW_RETURNING_KEYWORDS: &[&str] = &["SELECT", "SHOW", "DESCRIBE", "DESC", "EXPLAIN", "WITH"];

/// Errors surfaced by a [`QueryGateway`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The request carried no SQL text (or only whitespace).
    #[error("SQL query is required")]
    MissingQuery,

    /// The database rejected the statement. Carries the driver's message,
    /// SQLSTATE and numeric error code verbatim.
    #[error("{message}")]
    QueryExecution {
        message: String,
        sql_state: Option<String>,
        errno: Option<u16>,
    },

    /// The gateway itself could not be reached (HTTP transport only).
    #[error("Gateway request failed: {0}")]
    Transport(String),
}

impl GatewayError {
    /// Shorthand for a driver failure with no SQLSTATE or errno attached.
    pub fn execution(message: impl Into<String>) -> Self {
        GatewayError::QueryExecution {
            message: message.into(),
            sql_state: None,
            errno: None,
        }
    }
}

/// Write metadata reported by the driver for non-row statements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResult {
    pub affected_rows: u64,
    pub insert_id: u64,
}

/// What one statement produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResults {
    Rows(Vec<Row>),
    Write(WriteResult),
}

impl QueryResults {
    /// Number of rows returned, or number of rows affected for writes.
    pub fn row_count(&self) -> u64 {
        match self {
            QueryResults::Rows(rows) => rows.len() as u64,
            QueryResults::Write(write) => write.affected_rows,
        }
    }

    /// Auto-increment id reported for a write, if any.
    pub fn insert_id(&self) -> Option<u64> {
        match self {
            QueryResults::Rows(_) => None,
            QueryResults::Write(write) => Some(write.insert_id),
        }
    }

    pub fn into_rows(self) -> Vec<Row> {
        match self {
            QueryResults::Rows(rows) => rows,
            QueryResults::Write(_) => Vec::new(),
        }
    }
}

/// The uniform success envelope of the gateway endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryEnvelope {
    pub results: QueryResults,
    pub row_count: u64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_id: Option<u64>,
}

/// Executes a single SQL statement.
#[async_trait]
pub trait QueryGateway: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<QueryResults, GatewayError>;
}

/// Run one gateway request.
///
/// The statement is trimmed; a missing or blank statement fails with
/// [`GatewayError::MissingQuery`] without touching the gateway. Statements
/// beginning with `INSERT` (case-insensitive) get `insert_id` populated from
/// the driver's auto-increment feedback.
pub async fn run_query<G>(gateway: &G, sql: Option<&str>) -> Result<QueryEnvelope, GatewayError>
where
    G: QueryGateway + ?Sized,
{
    let sql = sql
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(GatewayError::MissingQuery)?;

    tracing::debug!(sql, "Executing SQL");

    let results = gateway.execute(sql).await.inspect_err(|e| {
        tracing::error!(error = %e, sql, "SQL error");
    })?;

    let row_count = results.row_count();
    let insert_id = if is_insert(sql) {
        results.insert_id()
    } else {
        None
    };

    tracing::debug!(row_count, "Query executed successfully");

    Ok(QueryEnvelope {
        results,
        row_count,
        success: true,
        insert_id,
    })
}

/// Upper-cased first keyword of a statement, ignoring leading parentheses.
pub fn leading_keyword(sql: &str) -> String {
    sql.trim_start()
        .trim_start_matches('(')
        .split(|c: char| c.is_whitespace() || c == '(' || c == ';')
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase()
}

/// Whether the trimmed statement starts with `INSERT`, ignoring case.
pub fn is_insert(sql: &str) -> bool {
    sql.trim().to_ascii_uppercase().starts_with("INSERT")
}

/// Whether a statement produces a result set, even an empty one.
pub fn returns_rows(sql: &str) -> bool {
    ROW_RETURNING_KEYWORDS.contains(&leading_keyword(sql).as_str())
}
