#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::Utc;
use fleetdesk_api::auth::jwt::{generate_access_token, JwtConfig};
use fleetdesk_api::config::ServerConfig;
use fleetdesk_api::router::build_app_router;
use fleetdesk_api::state::AppState;
use fleetdesk_core::error::CoreError;
use fleetdesk_core::gateway::{returns_rows, GatewayError, QueryGateway, QueryResults, WriteResult};
use fleetdesk_core::importer::{ErrorLog, ErrorLogEntry};
use fleetdesk_core::session::SessionContext;
use fleetdesk_core::types::{DbId, Row};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const MULTIPART_BOUNDARY: &str = "fleetdesk-test-boundary";

// ---------------------------------------------------------------------------
// Scripted gateway
// ---------------------------------------------------------------------------

/// In-memory stand-in for MySQL.
///
/// Understands a handful of statement shapes:
///
/// - `SELECT 1 as test`
/// - the login lookup and admin-count queries against `Users`
/// - `INSERT INTO T VALUES (n)`: `T.id` is unique
/// - `INSERT INTO Child VALUES (n)`: references `T.id`
/// - anything mentioning `Missing`: table does not exist
/// - anything starting with `BROKEN`: syntax error
///
/// Other row-returning statements yield no rows; other writes affect none.
pub struct ScriptedGateway {
    pub executed: Mutex<Vec<String>>,
    parents: Mutex<HashSet<String>>,
    users: Vec<(DbId, &'static str)>,
    down: bool,
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self {
            executed: Mutex::new(Vec::new()),
            parents: Mutex::new(HashSet::new()),
            users: vec![(1, "admin"), (2, "alice")],
            down: false,
        }
    }
}

impl ScriptedGateway {
    /// A gateway whose database is unreachable.
    pub fn unreachable() -> Self {
        Self {
            down: true,
            ..Self::default()
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    fn user_row(&self, username: &str) -> Vec<Row> {
        self.users
            .iter()
            .filter(|(_, name)| *name == username)
            .map(|(id, name)| {
                object(json!({
                    "user_id": id,
                    "username": name,
                    "email": format!("{name}@example.com"),
                }))
            })
            .collect()
    }
}

fn object(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

fn last_parenthesized(sql: &str) -> String {
    sql.rsplit('(').next().unwrap_or_default().trim_end_matches(')').to_string()
}

fn quoted(sql: &str) -> String {
    sql.rsplit('=').next().unwrap_or_default().trim().trim_matches('\'').to_string()
}

fn db_error(message: impl Into<String>, sql_state: &str, errno: u16) -> GatewayError {
    GatewayError::QueryExecution {
        message: message.into(),
        sql_state: Some(sql_state.to_string()),
        errno: Some(errno),
    }
}

#[async_trait]
impl QueryGateway for ScriptedGateway {
    async fn execute(&self, sql: &str) -> Result<QueryResults, GatewayError> {
        if self.down {
            return Err(GatewayError::execution("connect ECONNREFUSED 127.0.0.1:3306"));
        }
        self.executed.lock().unwrap().push(sql.to_string());

        if sql == "SELECT 1 as test" {
            return Ok(QueryResults::Rows(vec![object(json!({ "test": 1 }))]));
        }
        if sql.starts_with("SELECT user_id, username, email FROM Users WHERE username = ") {
            return Ok(QueryResults::Rows(self.user_row(&quoted(sql))));
        }
        if sql.starts_with("SELECT COUNT(*) as count FROM Users WHERE username = ") {
            let count = self.user_row(&quoted(sql)).len();
            return Ok(QueryResults::Rows(vec![object(json!({ "count": count }))]));
        }
        if sql.starts_with("INSERT INTO T VALUES (") {
            let value = last_parenthesized(sql);
            let mut parents = self.parents.lock().unwrap();
            if !parents.insert(value.clone()) {
                return Err(db_error(
                    format!("Duplicate entry '{value}' for key 'T.PRIMARY'"),
                    "23000",
                    1062,
                ));
            }
            return Ok(QueryResults::Write(WriteResult {
                affected_rows: 1,
                insert_id: parents.len() as u64,
            }));
        }
        if sql.starts_with("INSERT INTO Child VALUES (") {
            if !self.parents.lock().unwrap().contains(&last_parenthesized(sql)) {
                return Err(db_error(
                    "Cannot add or update a child row: a foreign key constraint fails",
                    "23000",
                    1452,
                ));
            }
            return Ok(QueryResults::Write(WriteResult {
                affected_rows: 1,
                insert_id: 0,
            }));
        }
        if sql.contains("Missing") {
            return Err(db_error("Table 'Final.Missing' doesn't exist", "42S02", 1146));
        }
        if sql.starts_with("BROKEN") {
            return Err(db_error(
                "You have an error in your SQL syntax; check the manual",
                "42000",
                1064,
            ));
        }

        if returns_rows(sql) {
            Ok(QueryResults::Rows(Vec::new()))
        } else {
            Ok(QueryResults::Write(WriteResult::default()))
        }
    }
}

// ---------------------------------------------------------------------------
// Recording error log
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingErrorLog {
    pub entries: Mutex<Vec<ErrorLogEntry>>,
}

#[async_trait]
impl ErrorLog for RecordingErrorLog {
    async fn log_error(
        &self,
        error: &str,
        context: &str,
        related_sql: &str,
    ) -> Result<(), CoreError> {
        let mut entries = self.entries.lock().unwrap();
        let id = entries.len() as DbId + 1;
        entries.push(ErrorLogEntry {
            id,
            error_message: error.to_string(),
            context: context.to_string(),
            related_sql: Some(related_sql.to_string()),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ErrorLogEntry>, CoreError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults and no import delay.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        import_statement_delay_ms: 0,
        sample_data_path: "does-not-exist/test_insert.sql".into(),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Gateway, error log and router sharing one state.
pub struct TestApp {
    pub gateway: Arc<ScriptedGateway>,
    pub error_log: Arc<RecordingErrorLog>,
    pub config: ServerConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_gateway(ScriptedGateway::default())
    }

    pub fn with_gateway(gateway: ScriptedGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
            error_log: Arc::new(RecordingErrorLog::default()),
            config: test_config(),
        }
    }

    /// Build the full application router, with the production middleware
    /// stack, over this app's gateway and error log.
    pub fn router(&self) -> Router {
        let state = AppState {
            gateway: self.gateway.clone(),
            error_log: self.error_log.clone(),
            config: Arc::new(self.config.clone()),
        };
        build_app_router(state, &self.config)
    }

    /// Bearer token for a user, signed with the test secret.
    pub fn token_for(&self, user_id: DbId, username: &str) -> String {
        generate_access_token(&SessionContext::for_user(user_id, username), &self.config.jwt)
            .expect("token generation")
    }

    pub fn admin_token(&self) -> String {
        self.token_for(1, "admin")
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_authed(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value, token: Option<&str>) -> Response<Body> {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    send(app, request).await
}

/// A multipart form with one `file` field.
pub fn multipart_body(file_name: &str, content: &str) -> String {
    format!(
        "--{MULTIPART_BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: application/sql\r\n\r\n\
         {content}\r\n\
         --{MULTIPART_BOUNDARY}--\r\n"
    )
}

pub async fn post_multipart(app: Router, uri: &str, body: String) -> Response<Body> {
    let request = Request::post(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn upload_sql(app: Router, uri: &str, content: &str) -> Response<Body> {
    post_multipart(app, uri, multipart_body("data.sql", content)).await
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
