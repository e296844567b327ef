//! SQL text construction for the database façade.
//!
//! Values are rendered as literals, not bound as parameters: text is
//! single-quoted with embedded quotes doubled, `NULL` is written bare, and
//! numbers and booleans are interpolated as-is. Table names, column names and
//! `WHERE` clauses are trusted caller input and inserted verbatim. This keeps
//! the generated statements byte-compatible with the existing front end; it
//! is not an injection defence.

use indexmap::IndexMap;

/// A value that can be written into generated SQL text.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl SqlValue {
    /// Render the value as a SQL literal.
    pub fn to_literal(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Text(s) => quote(s),
            SqlValue::Int(n) => n.to_string(),
            SqlValue::Float(f) => f.to_string(),
            SqlValue::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(value.into())
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        SqlValue::Int(value.into())
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

/// Column name to value, kept in insertion order so generated column lists
/// match the order the caller supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap(IndexMap<String, SqlValue>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn field(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SqlValue)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (column, value) in iter {
            map.insert(column, value);
        }
        map
    }
}

/// Single-quote a string, doubling any embedded single quotes.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `INSERT INTO table (c1, c2) VALUES (v1, v2)`
pub fn insert_statement(table: &str, fields: &FieldMap) -> String {
    let columns = fields
        .iter()
        .map(|(column, _)| column.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let values = fields
        .iter()
        .map(|(_, value)| value.to_literal())
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {table} ({columns}) VALUES ({values})")
}

/// `UPDATE table SET c1 = v1, c2 = v2 WHERE where_clause`
pub fn update_statement(table: &str, fields: &FieldMap, where_clause: &str) -> String {
    let assignments = fields
        .iter()
        .map(|(column, value)| format!("{column} = {}", value.to_literal()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("UPDATE {table} SET {assignments} WHERE {where_clause}")
}

/// `DELETE FROM table WHERE where_clause`
pub fn delete_statement(table: &str, where_clause: &str) -> String {
    format!("DELETE FROM {table} WHERE {where_clause}")
}

/// `SELECT * FROM table [WHERE ...] LIMIT limit OFFSET (page - 1) * limit`
///
/// Pages are 1-based; page 0 is treated as page 1.
pub fn page_statement(table: &str, page: u32, limit: u32, where_clause: Option<&str>) -> String {
    let offset = u64::from(page.max(1) - 1) * u64::from(limit);
    format!(
        "SELECT * FROM {table}{} LIMIT {limit} OFFSET {offset}",
        where_suffix(where_clause)
    )
}

/// `SELECT COUNT(*) as count FROM table [WHERE ...]`
pub fn count_statement(table: &str, where_clause: Option<&str>) -> String {
    format!(
        "SELECT COUNT(*) as count FROM {table}{}",
        where_suffix(where_clause)
    )
}

fn where_suffix(where_clause: Option<&str>) -> String {
    match where_clause.map(str::trim).filter(|w| !w.is_empty()) {
        Some(clause) => format!(" WHERE {clause}"),
        None => String::new(),
    }
}
