//! Row types for tables the backend owns.

pub mod import_error;
