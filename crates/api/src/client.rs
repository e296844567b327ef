//! [`QueryGateway`] that talks to a running server's `/api/query` endpoint.
//!
//! Lets the façade, importer and reports run from a separate process (a CLI,
//! another service) against the same gateway the browser client uses.

use async_trait::async_trait;
use fleetdesk_core::gateway::{GatewayError, QueryEnvelope, QueryGateway, QueryResults};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

/// Error body returned by the gateway endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GatewayErrorBody {
    error: String,
    #[serde(default)]
    sql_state: Option<String>,
    #[serde(default)]
    errno: Option<u16>,
}

#[derive(Debug, Clone)]
pub struct HttpQueryGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpQueryGateway {
    /// `base_url` is the server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/query", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl QueryGateway for HttpQueryGateway {
    async fn execute(&self, sql: &str) -> Result<QueryResults, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "sql": sql }))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let envelope: QueryEnvelope = response
                .json()
                .await
                .map_err(|e| GatewayError::Transport(e.to_string()))?;
            return Ok(envelope.results);
        }

        let body: GatewayErrorBody = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("HTTP {status}: {e}")))?;

        if status == StatusCode::BAD_REQUEST {
            return Err(GatewayError::MissingQuery);
        }
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            return Err(GatewayError::QueryExecution {
                message: body.error,
                sql_state: body.sql_state,
                errno: body.errno,
            });
        }
        Err(GatewayError::Transport(format!("HTTP {status}: {}", body.error)))
    }
}
