//! Domain logic for the fleet management backend.
//!
//! Nothing in this crate talks to a database driver or an HTTP stack
//! directly. Everything that executes SQL goes through the
//! [`gateway::QueryGateway`] trait, which the `db` crate implements over
//! MySQL and the `api` crate implements over HTTP.

pub mod error;
pub mod facade;
pub mod gateway;
pub mod importer;
pub mod maintenance;
pub mod reports;
pub mod roles;
pub mod session;
pub mod sql;
pub mod types;
