/// Auto-increment primary keys in the fleet schema are signed `INT`s.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// One result row as returned by the gateway: column name to JSON value,
/// in column order.
pub type Row = serde_json::Map<String, serde_json::Value>;
