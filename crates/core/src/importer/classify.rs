//! Failure classification for imported statements.
//!
//! Matching is on lower-cased substrings of the driver message, checked in
//! a fixed order: duplicate key, then missing foreign key, then missing
//! table.

use super::SkipReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Expected, benign failure; counted as skipped.
    Skip(SkipReason),
    /// Anything else; counted as failed and written to the error log.
    Hard,
}

pub fn classify(message: &str) -> FailureClass {
    let message = message.to_lowercase();

    if message.contains("duplicate entry") || message.contains("duplicate key") {
        FailureClass::Skip(SkipReason::DuplicateKey)
    } else if message.contains("foreign key constraint") || message.contains("cannot add or update")
    {
        FailureClass::Skip(SkipReason::MissingForeignKey)
    } else if message.contains("table") && message.contains("doesn't exist") {
        FailureClass::Skip(SkipReason::MissingTable)
    } else {
        FailureClass::Hard
    }
}
