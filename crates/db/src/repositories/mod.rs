//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&DbPool` as the first argument.

pub mod import_error_repo;

pub use import_error_repo::{DbErrorLog, ImportErrorRepo};
