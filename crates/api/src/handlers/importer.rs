//! Bulk SQL import over HTTP.
//!
//! Every endpoint takes a multipart upload with a `file` field holding the
//! script. `/api/import/preview` only parses it; `/api/import` answers once
//! the whole script has run; the stream variant pushes a `progress` event per
//! statement and a final `summary`.

use std::convert::Infallible;

use axum::extract::{Multipart, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use fleetdesk_core::importer::{parse_statements, ImportProgress, ImportReport, ImportRunner};
use futures::Stream;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// An uploaded script.
#[derive(Debug)]
pub struct SqlUpload {
    pub file_name: String,
    pub content: String,
}

/// Characters of the upload echoed back by [`preview_sql`].
pub const PREVIEW_CHARS: usize = 500;

/// What an upload would run, without running it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub file_name: String,
    pub size_bytes: usize,
    pub statement_count: usize,
    /// The first [`PREVIEW_CHARS`] characters of the raw file.
    pub preview: String,
    pub truncated: bool,
}

impl ImportPreview {
    pub fn new(upload: &SqlUpload) -> Self {
        let mut chars = upload.content.chars();
        let preview: String = chars.by_ref().take(PREVIEW_CHARS).collect();
        Self {
            file_name: upload.file_name.clone(),
            size_bytes: upload.content.len(),
            statement_count: parse_statements(&upload.content).len(),
            preview,
            truncated: chars.next().is_some(),
        }
    }
}

/// Pull the `file` field out of a multipart form. Other fields are ignored.
pub async fn read_upload(mut multipart: Multipart) -> AppResult<SqlUpload> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.sql").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let content = String::from_utf8(data.to_vec())
            .map_err(|_| AppError::BadRequest("Uploaded file must be UTF-8 text".into()))?;
        upload = Some(SqlUpload { file_name, content });
    }

    upload.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))
}

/// POST /api/import/preview
///
/// Parses the uploaded script and reports its statement count. Nothing is
/// executed.
pub async fn preview_sql(multipart: Multipart) -> AppResult<Json<DataResponse<ImportPreview>>> {
    let upload = read_upload(multipart).await?;
    let preview = ImportPreview::new(&upload);
    tracing::debug!(
        file = %preview.file_name,
        statements = preview.statement_count,
        "SQL import preview"
    );
    Ok(Json(DataResponse { data: preview }))
}

/// POST /api/import
///
/// Runs every statement of the uploaded script and returns the report.
/// Statement failures never fail the request.
pub async fn import_sql(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<ImportReport>>> {
    let upload = read_upload(multipart).await?;
    tracing::info!(file = %upload.file_name, bytes = upload.content.len(), "SQL import requested");

    let runner = ImportRunner::new(state.gateway.as_ref(), state.error_log.as_ref())
        .with_delay(state.config.import_statement_delay());

    let summary = runner
        .run_script(&upload.content, |progress| {
            tracing::debug!(
                index = progress.index,
                total = progress.total,
                percent = progress.percent,
                "Import progress"
            );
        })
        .await;

    Ok(Json(DataResponse {
        data: ImportReport::from(&summary),
    }))
}

/// POST /api/import/stream
///
/// Same as [`import_sql`] but streams Server-Sent Events. The import runs in
/// its own task and finishes even if the client goes away.
pub async fn import_sql_stream(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let upload = read_upload(multipart).await?;
    tracing::info!(file = %upload.file_name, bytes = upload.content.len(), "Streaming SQL import requested");

    let (tx, rx) = mpsc::unbounded_channel::<Event>();

    tokio::spawn(async move {
        let runner = ImportRunner::new(state.gateway.as_ref(), state.error_log.as_ref())
            .with_delay(state.config.import_statement_delay());

        let summary = runner
            .run_script(&upload.content, |progress| {
                if let Some(event) = progress_event(progress) {
                    // A closed channel means the client left; keep importing.
                    let _ = tx.send(event);
                }
            })
            .await;

        match Event::default()
            .event("summary")
            .json_data(ImportReport::from(&summary))
        {
            Ok(event) => {
                let _ = tx.send(event);
            }
            Err(e) => tracing::error!(error = %e, "Failed to encode import summary"),
        }
    });

    let stream = UnboundedReceiverStream::new(rx).map(Ok::<_, Infallible>);
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn progress_event(progress: &ImportProgress) -> Option<Event> {
    Event::default()
        .event("progress")
        .json_data(progress)
        .inspect_err(|e| tracing::error!(error = %e, "Failed to encode import progress"))
        .ok()
}
