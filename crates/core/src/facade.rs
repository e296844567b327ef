//! Typed convenience operations over a [`QueryGateway`].
//!
//! The façade adds no retry, fallback or escaping beyond the literal rule in
//! [`crate::sql`]. Gateway errors reach the caller unchanged.

use serde_json::Value;

use crate::gateway::{run_query, GatewayError, QueryEnvelope, QueryGateway, QueryResults};
use crate::sql::{self, FieldMap};
use crate::types::Row;

/// Result of an insert: the generated id plus the full gateway envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertResult {
    pub insert_id: Option<u64>,
    pub raw: QueryEnvelope,
}

/// Database access façade.
pub struct Database<'g, G: ?Sized> {
    gateway: &'g G,
}

impl<'g, G: QueryGateway + ?Sized> Database<'g, G> {
    pub fn new(gateway: &'g G) -> Self {
        Self { gateway }
    }

    /// Run a statement and return the full envelope.
    pub async fn execute_query(&self, sql: &str) -> Result<QueryEnvelope, GatewayError> {
        run_query(self.gateway, Some(sql)).await
    }

    /// Run a query and return only its rows.
    pub async fn select(&self, sql: &str) -> Result<Vec<Row>, GatewayError> {
        Ok(self.execute_query(sql).await?.results.into_rows())
    }

    pub async fn insert(&self, sql: &str) -> Result<InsertResult, GatewayError> {
        let raw = self.execute_query(sql).await?;
        Ok(InsertResult {
            insert_id: raw.insert_id,
            raw,
        })
    }

    /// Run an update and return the number of affected rows.
    pub async fn update(&self, sql: &str) -> Result<u64, GatewayError> {
        Ok(affected_rows(&self.execute_query(sql).await?))
    }

    /// Run a delete and return the number of affected rows.
    pub async fn delete(&self, sql: &str) -> Result<u64, GatewayError> {
        Ok(affected_rows(&self.execute_query(sql).await?))
    }

    pub async fn insert_record(
        &self,
        table: &str,
        fields: &FieldMap,
    ) -> Result<InsertResult, GatewayError> {
        self.insert(&sql::insert_statement(table, fields)).await
    }

    /// `where_clause` is inserted verbatim.
    pub async fn update_record(
        &self,
        table: &str,
        fields: &FieldMap,
        where_clause: &str,
    ) -> Result<u64, GatewayError> {
        self.update(&sql::update_statement(table, fields, where_clause))
            .await
    }

    /// `where_clause` is inserted verbatim.
    pub async fn delete_records(&self, table: &str, where_clause: &str) -> Result<u64, GatewayError> {
        self.delete(&sql::delete_statement(table, where_clause)).await
    }

    /// One page of a table (1-based pages).
    pub async fn table_page(
        &self,
        table: &str,
        page: u32,
        limit: u32,
        where_clause: Option<&str>,
    ) -> Result<Vec<Row>, GatewayError> {
        self.select(&sql::page_statement(table, page, limit, where_clause))
            .await
    }

    /// Row count of a table, `0` if the count column is missing.
    pub async fn table_count(
        &self,
        table: &str,
        where_clause: Option<&str>,
    ) -> Result<u64, GatewayError> {
        let rows = self
            .select(&sql::count_statement(table, where_clause))
            .await?;
        Ok(rows
            .first()
            .and_then(|row| row.get("count"))
            .and_then(number_as_u64)
            .unwrap_or(0))
    }

    /// Whether the database answers a trivial query.
    pub async fn test_connection(&self) -> bool {
        match self.select("SELECT 1 as test").await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Database connection test failed");
                false
            }
        }
    }
}

fn affected_rows(envelope: &QueryEnvelope) -> u64 {
    match &envelope.results {
        QueryResults::Write(write) => write.affected_rows,
        QueryResults::Rows(_) => envelope.row_count,
    }
}

/// Read a non-negative integer out of a JSON cell; counts may arrive as
/// numbers or as numeric strings depending on the column type.
pub fn number_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a JSON cell as `f64`, accepting numeric strings (`DECIMAL` columns).
pub fn number_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
