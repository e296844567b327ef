//! Bulk SQL importer.
//!
//! An uploaded script is cleaned and split into [`RawStatement`]s
//! ([`parser`]), executed one at a time against a gateway ([`runner`]), and
//! each failure is either skipped as benign or recorded as a hard failure
//! ([`classify`]). The run always completes and yields an
//! [`ExecutionSummary`].

pub mod classify;
pub mod parser;
pub mod runner;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

pub use classify::{classify, FailureClass};
pub use parser::{parse_statements, strip_comments, PLACEHOLDER_PASSWORD_HASH};
pub use runner::{ImportRunner, DEFAULT_STATEMENT_DELAY};

/// How many failure messages a report shows before summarising the rest.
pub const MAX_REPORTED_FAILURES: usize = 5;

/// Context label attached to error-log entries written by the importer.
pub const ERROR_LOG_CONTEXT: &str = "SQL Import";

// ── Types ────────────────────────────────────────────────────────────

/// One statement extracted from an uploaded script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStatement {
    /// 1-based position among the extracted statements.
    pub index: usize,
    /// Statement text, trimmed, without the trailing `;`.
    pub text: String,
    /// First and last source line (1-based) the statement occupies.
    pub line_span: Option<(usize, usize)>,
}

/// Benign failure categories that do not count as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    DuplicateKey,
    MissingForeignKey,
    MissingTable,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::DuplicateKey => "duplicate-key",
            SkipReason::MissingForeignKey => "missing-foreign-key",
            SkipReason::MissingTable => "missing-table",
        }
    }
}

/// Result of running one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Success { rows: u64, insert_id: Option<u64> },
    Skipped { reason: SkipReason },
    Failed { message: String },
}

/// Per-reason skip counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipCounts {
    pub duplicate_key: usize,
    pub missing_foreign_key: usize,
    pub missing_table: usize,
}

/// Aggregate over all outcomes of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub skipped_by_reason: SkipCounts,
    /// Every hard failure as `"Statement {index}: {message}"`, in order.
    pub failures: Vec<String>,
}

impl ExecutionSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Fold one statement outcome into the counters.
    pub fn record(&mut self, index: usize, outcome: &ExecutionOutcome) {
        match outcome {
            ExecutionOutcome::Success { .. } => self.succeeded += 1,
            ExecutionOutcome::Skipped { reason } => {
                self.skipped += 1;
                let counts = &mut self.skipped_by_reason;
                match reason {
                    SkipReason::DuplicateKey => counts.duplicate_key += 1,
                    SkipReason::MissingForeignKey => counts.missing_foreign_key += 1,
                    SkipReason::MissingTable => counts.missing_table += 1,
                }
            }
            ExecutionOutcome::Failed { message } => {
                self.failed += 1;
                self.failures.push(format!("Statement {index}: {message}"));
            }
        }
    }

    /// Statements run so far.
    pub fn completed(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }

    /// True when no statement failed hard. Skips do not count.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// The first [`MAX_REPORTED_FAILURES`] failure messages.
    pub fn displayed_failures(&self) -> &[String] {
        &self.failures[..self.failures.len().min(MAX_REPORTED_FAILURES)]
    }

    pub fn omitted_failures(&self) -> usize {
        self.failures.len().saturating_sub(MAX_REPORTED_FAILURES)
    }

    /// Human-readable one-line outcome.
    pub fn message(&self) -> String {
        if self.is_success() {
            format!(
                "SQL file executed successfully! {} statements processed, {} skipped.",
                self.succeeded, self.skipped
            )
        } else {
            let mut message = format!(
                "SQL execution completed with errors. {} statements succeeded, {} skipped, {} failed.",
                self.succeeded, self.skipped, self.failed
            );
            let omitted = self.omitted_failures();
            if omitted > 0 {
                message.push_str(&format!(" ({omitted} more errors not shown)"));
            }
            message
        }
    }
}

/// Wire form of an [`ExecutionSummary`], with the failure list capped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub success: bool,
    pub message: String,
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub skipped_by_reason: SkipCounts,
    pub failures: Vec<String>,
    pub omitted_failures: usize,
}

impl From<&ExecutionSummary> for ImportReport {
    fn from(summary: &ExecutionSummary) -> Self {
        Self {
            success: summary.is_success(),
            message: summary.message(),
            total: summary.total,
            succeeded: summary.succeeded,
            skipped: summary.skipped,
            failed: summary.failed,
            skipped_by_reason: summary.skipped_by_reason,
            failures: summary.displayed_failures().to_vec(),
            omitted_failures: summary.omitted_failures(),
        }
    }
}

/// Emitted after every statement of an import run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportProgress {
    /// Index of the statement that just ran.
    pub index: usize,
    pub total: usize,
    /// Whole-number percentage of statements completed.
    pub percent: u8,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub outcome: ExecutionOutcome,
}

impl ImportProgress {
    pub fn new(index: usize, summary: &ExecutionSummary, outcome: ExecutionOutcome) -> Self {
        let percent = if summary.total == 0 {
            100
        } else {
            (summary.completed() * 100 / summary.total).min(100) as u8
        };
        Self {
            index,
            total: summary.total,
            percent,
            succeeded: summary.succeeded,
            skipped: summary.skipped,
            failed: summary.failed,
            outcome,
        }
    }
}

// ── Error log collaborator ───────────────────────────────────────────

/// One recorded hard failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLogEntry {
    pub id: DbId,
    pub error_message: String,
    pub context: String,
    pub related_sql: Option<String>,
    pub created_at: Timestamp,
}

/// Durable sink for hard import failures.
#[async_trait]
pub trait ErrorLog: Send + Sync {
    async fn log_error(&self, error: &str, context: &str, related_sql: &str)
        -> Result<(), CoreError>;

    /// Most recent entries first. Sinks that keep nothing return none.
    async fn recent(&self, _limit: usize) -> Result<Vec<ErrorLogEntry>, CoreError> {
        Ok(Vec::new())
    }
}

/// An [`ErrorLog`] that only emits a tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorLog;

#[async_trait]
impl ErrorLog for TracingErrorLog {
    async fn log_error(
        &self,
        error: &str,
        context: &str,
        related_sql: &str,
    ) -> Result<(), CoreError> {
        tracing::error!(error, context, sql = related_sql, "Import statement failed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(message: &str) -> ExecutionOutcome {
        ExecutionOutcome::Failed {
            message: message.to_string(),
        }
    }

    #[test]
    fn record_counts_each_outcome_kind() {
        let mut summary = ExecutionSummary::new(4);
        summary.record(1, &ExecutionOutcome::Success { rows: 1, insert_id: Some(1) });
        summary.record(2, &ExecutionOutcome::Skipped { reason: SkipReason::DuplicateKey });
        summary.record(3, &ExecutionOutcome::Skipped { reason: SkipReason::MissingTable });
        summary.record(4, &failed("boom"));

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped_by_reason.duplicate_key, 1);
        assert_eq!(summary.skipped_by_reason.missing_table, 1);
        assert_eq!(summary.failures, vec!["Statement 4: boom".to_string()]);
        assert!(!summary.is_success());
    }

    #[test]
    fn report_caps_failures_and_counts_the_rest() {
        let mut summary = ExecutionSummary::new(8);
        for i in 1..=8 {
            summary.record(i, &failed("Unknown column 'x'"));
        }

        let report = ImportReport::from(&summary);
        assert_eq!(report.failures.len(), MAX_REPORTED_FAILURES);
        assert_eq!(report.failures[0], "Statement 1: Unknown column 'x'");
        assert_eq!(report.omitted_failures, 3);
        assert!(report.message.contains("3 more errors not shown"));
    }

    #[test]
    fn empty_summary_is_a_success() {
        let summary = ExecutionSummary::new(0);
        assert!(summary.is_success());
        assert_eq!(summary.displayed_failures().len(), 0);
        assert_eq!(summary.omitted_failures(), 0);
    }

    #[test]
    fn progress_percent_tracks_completion() {
        let mut summary = ExecutionSummary::new(3);
        let ok = ExecutionOutcome::Success { rows: 0, insert_id: None };
        summary.record(1, &ok);
        assert_eq!(ImportProgress::new(1, &summary, ok.clone()).percent, 33);
        summary.record(2, &ok);
        summary.record(3, &ok);
        assert_eq!(ImportProgress::new(3, &summary, ok).percent, 100);
    }

    #[test]
    fn outcomes_serialize_with_status_tag() {
        let value = serde_json::to_value(ExecutionOutcome::Skipped {
            reason: SkipReason::MissingForeignKey,
        })
        .unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "status": "skipped", "reason": "missing-foreign-key" })
        );
    }

    #[tokio::test]
    async fn tracing_log_accepts_writes_but_keeps_nothing() {
        let log = TracingErrorLog;
        log.log_error("boom", "SQL import", "SELECT 1").await.unwrap();
        assert!(log.recent(10).await.unwrap().is_empty());
    }
}
