//! Sequential execution of parsed statements.

use std::time::Duration;

use super::{
    classify, parse_statements, ErrorLog, ExecutionOutcome, ExecutionSummary, FailureClass,
    ImportProgress, RawStatement, ERROR_LOG_CONTEXT,
};
use crate::gateway::{run_query, QueryGateway};

/// Pause between statements so a long script does not flood the connection.
pub const DEFAULT_STATEMENT_DELAY: Duration = Duration::from_millis(50);

/// Runs statements one after another against a gateway.
///
/// Each statement is awaited before the next one is issued, so a statement
/// may rely on rows inserted by any statement before it. No failure stops
/// the run.
pub struct ImportRunner<'a, G: ?Sized, L: ?Sized> {
    gateway: &'a G,
    error_log: &'a L,
    delay: Duration,
}

impl<'a, G, L> ImportRunner<'a, G, L>
where
    G: QueryGateway + ?Sized,
    L: ErrorLog + ?Sized,
{
    pub fn new(gateway: &'a G, error_log: &'a L) -> Self {
        Self {
            gateway,
            error_log,
            delay: DEFAULT_STATEMENT_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Parse `content` and run every statement in it.
    pub async fn run_script<F>(&self, content: &str, on_progress: F) -> ExecutionSummary
    where
        F: FnMut(&ImportProgress),
    {
        let statements = parse_statements(content);
        self.run(&statements, on_progress).await
    }

    /// Run `statements` in order, calling `on_progress` after each one.
    pub async fn run<F>(&self, statements: &[RawStatement], mut on_progress: F) -> ExecutionSummary
    where
        F: FnMut(&ImportProgress),
    {
        let mut summary = ExecutionSummary::new(statements.len());
        tracing::info!(total = statements.len(), "Starting SQL import");

        for (position, statement) in statements.iter().enumerate() {
            if position > 0 {
                self.pause().await;
            }

            let outcome = self.execute(statement).await;
            summary.record(statement.index, &outcome);
            on_progress(&ImportProgress::new(statement.index, &summary, outcome));
        }

        tracing::info!(
            total = summary.total,
            succeeded = summary.succeeded,
            skipped = summary.skipped,
            failed = summary.failed,
            "SQL import finished"
        );

        summary
    }

    async fn pause(&self) {
        if self.delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.delay).await;
        }
    }

    async fn execute(&self, statement: &RawStatement) -> ExecutionOutcome {
        let index = statement.index;

        let error = match run_query(self.gateway, Some(&statement.text)).await {
            Ok(envelope) => {
                tracing::debug!(index, rows = envelope.row_count, "Statement executed");
                return ExecutionOutcome::Success {
                    rows: envelope.row_count,
                    insert_id: envelope.insert_id,
                };
            }
            Err(e) => e,
        };

        let message = error.to_string();
        match classify(&message) {
            FailureClass::Skip(reason) => {
                tracing::info!(index, reason = reason.as_str(), error = %message, "Statement skipped");
                ExecutionOutcome::Skipped { reason }
            }
            FailureClass::Hard => {
                tracing::warn!(index, error = %message, "Statement failed");
                let context = format!("{ERROR_LOG_CONTEXT} (statement {index})");
                if let Err(log_err) = self
                    .error_log
                    .log_error(&message, &context, &statement.text)
                    .await
                {
                    tracing::error!(index, error = %log_err, "Failed to write import error log");
                }
                ExecutionOutcome::Failed { message }
            }
        }
    }
}
