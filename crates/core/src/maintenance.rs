//! Admin maintenance routines: wiping fleet data and re-seeding the admin
//! account and service types.
//!
//! Unlike the importer, these stop at the first failing statement.

use crate::error::CoreError;
use crate::facade::{number_as_u64, Database};
use crate::gateway::QueryGateway;
use crate::importer::PLACEHOLDER_PASSWORD_HASH;
use crate::roles::ADMIN_USERNAME;
use crate::sql::quote;

/// Text the caller must send back to confirm a full data wipe.
pub const CLEAR_DATA_CONFIRMATION: &str = "CLEAR DATA";

/// Tables emptied by [`clear_all_data`], children before parents.
pub const CLEAR_ORDER: &[&str] = &[
    // junction tables
    "Reminder",
    "MaintenanceEvents_ServiceTypes",
    "ServiceRecords_Parts",
    "ServiceRecords_ServiceTypes",
    "WorkedOn",
    // dependent tables
    "MaintenanceEvents",
    "FuelLog",
    "Expenses",
    "Parts",
    "ServiceRecords",
    "Mechanics",
    "Owns",
    // independent tables
    "ServiceTypes",
    "CarShops",
    "Vehicles",
    "Users",
];

/// Tables whose auto-increment counters restart at 1 after a wipe.
pub const AUTO_INCREMENT_RESETS: &[&str] = &[
    "Users",
    "CarShops",
    "Mechanics",
    "ServiceRecords",
    "Parts",
    "Expenses",
    "FuelLog",
    "MaintenanceEvents",
    "Reminder",
];

/// Service types every fresh database starts with.
pub const DEFAULT_SERVICE_TYPES: &[&str] = &[
    "Oil Change",
    "Tire Rotation",
    "Brake Service",
    "Air Filter Replacement",
    "Battery Replacement",
    "Transmission Service",
    "Engine Tune-up",
    "Coolant Flush",
];

/// The ordered statements that empty every fleet table.
pub fn clear_data_plan() -> Vec<String> {
    let mut plan = vec!["SET SQL_SAFE_UPDATES = 0".to_string()];
    plan.extend(CLEAR_ORDER.iter().map(|t| format!("DELETE FROM `{t}`")));
    plan.push("SET SQL_SAFE_UPDATES = 1".to_string());
    plan.extend(
        AUTO_INCREMENT_RESETS
            .iter()
            .map(|t| format!("ALTER TABLE `{t}` AUTO_INCREMENT = 1")),
    );
    plan
}

fn admin_exists_sql() -> String {
    format!(
        "SELECT COUNT(*) as count FROM Users WHERE username = {}",
        quote(ADMIN_USERNAME)
    )
}

/// Insert statement for the seeded admin account.
pub fn admin_insert_sql() -> String {
    format!(
        "INSERT INTO Users (username, password_hash, email, birthday, registration_date) \
         VALUES ({}, {}, 'admin@example.com', '1990-01-01', CURDATE())",
        quote(ADMIN_USERNAME),
        quote(PLACEHOLDER_PASSWORD_HASH)
    )
}

/// Insert statement used when an admin restores a deleted admin account.
pub fn restored_admin_insert_sql() -> String {
    format!(
        "INSERT INTO Users (username, password_hash, email, birthday, registration_date) \
         VALUES ({}, {}, 'admin@example.com', '2000-01-01', NOW())",
        quote(ADMIN_USERNAME),
        quote(PLACEHOLDER_PASSWORD_HASH)
    )
}

pub fn service_type_insert_sql(service_type: &str) -> String {
    format!(
        "INSERT IGNORE INTO ServiceTypes (service_type) VALUES ({})",
        quote(service_type)
    )
}

/// What [`restore_admin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminRestore {
    Created,
    AlreadyExists,
}

async fn admin_exists<G: QueryGateway + ?Sized>(db: &Database<'_, G>) -> Result<bool, CoreError> {
    let rows = db.select(&admin_exists_sql()).await?;
    let count = rows
        .first()
        .and_then(|row| row.get("count"))
        .and_then(number_as_u64)
        .unwrap_or(0);
    Ok(count > 0)
}

async fn insert_admin_if_missing<G: QueryGateway + ?Sized>(
    db: &Database<'_, G>,
    insert_sql: &str,
) -> Result<AdminRestore, CoreError> {
    if admin_exists(db).await? {
        return Ok(AdminRestore::AlreadyExists);
    }
    db.insert(insert_sql).await?;
    tracing::info!("Admin user created");
    Ok(AdminRestore::Created)
}

/// Insert the admin account unless one already exists.
pub async fn restore_admin<G: QueryGateway + ?Sized>(
    db: &Database<'_, G>,
) -> Result<AdminRestore, CoreError> {
    insert_admin_if_missing(db, &restored_admin_insert_sql()).await
}

/// Insert the default service types, ignoring ones already present.
pub async fn seed_service_types<G: QueryGateway + ?Sized>(
    db: &Database<'_, G>,
) -> Result<(), CoreError> {
    for service_type in DEFAULT_SERVICE_TYPES {
        db.execute_query(&service_type_insert_sql(service_type))
            .await?;
    }
    tracing::info!(count = DEFAULT_SERVICE_TYPES.len(), "Service types inserted");
    Ok(())
}

/// Empty every fleet table, reset counters, then re-seed the admin account
/// and service types.
///
/// `confirmation` must equal [`CLEAR_DATA_CONFIRMATION`]. Returns the number
/// of statements executed by the wipe itself.
pub async fn clear_all_data<G: QueryGateway + ?Sized>(
    db: &Database<'_, G>,
    confirmation: &str,
) -> Result<usize, CoreError> {
    if confirmation != CLEAR_DATA_CONFIRMATION {
        return Err(CoreError::Validation(
            "Confirmation text does not match. Action cancelled.".into(),
        ));
    }

    let plan = clear_data_plan();
    for statement in &plan {
        db.execute_query(statement).await.map_err(|e| {
            tracing::error!(error = %e, statement, "Clearing data failed");
            CoreError::Internal(format!("Failed to clear data: {e}"))
        })?;
    }

    insert_admin_if_missing(db, &admin_insert_sql()).await?;
    seed_service_types(db).await?;

    tracing::info!(statements = plan.len(), "All data cleared");
    Ok(plan.len())
}
