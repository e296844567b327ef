//! Handlers for the raw SQL gateway (`/api/query`).
//!
//! POST takes the statement from a JSON body, GET from the `sql` query
//! parameter. Both run through [`run_query`] and behave identically. A POST
//! body that is absent or not a JSON object with a string `sql` counts as a
//! missing statement.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use fleetdesk_core::gateway::{run_query, QueryEnvelope};
use serde::Deserialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Body of `POST /api/query` and parameters of `GET /api/query`.
#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    pub sql: Option<String>,
}

/// POST /api/query
pub async fn post_query(
    State(state): State<AppState>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> AppResult<Json<QueryEnvelope>> {
    let input = match body {
        Ok(Json(input)) => input,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unusable query body");
            QueryRequest::default()
        }
    };
    execute(&state, input).await
}

/// GET /api/query?sql=...
pub async fn get_query(
    State(state): State<AppState>,
    Query(input): Query<QueryRequest>,
) -> AppResult<Json<QueryEnvelope>> {
    execute(&state, input).await
}

async fn execute(state: &AppState, input: QueryRequest) -> AppResult<Json<QueryEnvelope>> {
    let envelope = run_query(state.gateway.as_ref(), input.sql.as_deref()).await?;
    Ok(Json(envelope))
}
