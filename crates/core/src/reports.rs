//! Aggregate fleet analytics.
//!
//! Each report is a single query (or a small fixed set) over the fleet
//! tables. Non-admin sessions see only rows for vehicles they are linked to
//! through `Owns`.

use serde::Serialize;

use crate::facade::{number_as_f64, number_as_u64, Database};
use crate::gateway::{GatewayError, QueryGateway};
use crate::session::ReportScope;
use crate::types::Row;

/// `JOIN Owns ... WHERE o.user_id = ...` for owner scopes, empty otherwise.
fn owner_filter(scope: ReportScope, alias: &str) -> String {
    match scope {
        ReportScope::All => String::new(),
        ReportScope::Owner(user_id) => {
            format!("JOIN Owns o ON {alias}.vin = o.vin WHERE o.user_id = {user_id}")
        }
    }
}

pub fn expenses_by_category_sql(scope: ReportScope) -> String {
    format!(
        "SELECT category, SUM(amount) as total_amount, COUNT(*) as count \
         FROM Expenses e {} \
         GROUP BY category \
         ORDER BY total_amount DESC",
        owner_filter(scope, "e")
    )
}

pub fn avg_service_cost_by_vehicle_sql(scope: ReportScope) -> String {
    format!(
        "SELECT CONCAT(v.year, ' ', v.make, ' ', v.model) as vehicle_info, \
                AVG(sr.cost) as avg_cost, COUNT(*) as service_count \
         FROM ServiceRecords sr \
         LEFT JOIN Vehicles v ON sr.vin = v.vin {} \
         GROUP BY sr.vin, v.make, v.model, v.year \
         ORDER BY avg_cost DESC",
        owner_filter(scope, "sr")
    )
}

pub fn fuel_statistics_sql(scope: ReportScope) -> String {
    format!(
        "SELECT fuel_type, \
                SUM(gallons) as total_gallons, \
                SUM(total_cost) as total_cost, \
                AVG(total_cost / gallons) as avg_price_per_gallon, \
                COUNT(*) as fill_ups \
         FROM FuelLog fl {} \
         GROUP BY fuel_type \
         ORDER BY total_cost DESC",
        owner_filter(scope, "fl")
    )
}

/// Last twelve months with at least one service record.
pub fn service_count_by_month_sql(scope: ReportScope) -> String {
    format!(
        "SELECT DATE_FORMAT(service_date, '%Y-%m') as month, \
                COUNT(*) as service_count, \
                SUM(cost) as total_cost \
         FROM ServiceRecords sr {} \
         GROUP BY DATE_FORMAT(service_date, '%Y-%m') \
         ORDER BY month DESC \
         LIMIT 12",
        owner_filter(scope, "sr")
    )
}

pub fn total_expenses_sql(scope: ReportScope) -> String {
    format!(
        "SELECT SUM(amount) as total_expenses FROM Expenses e {}",
        owner_filter(scope, "e")
    )
}

pub fn total_fuel_cost_sql(scope: ReportScope) -> String {
    format!(
        "SELECT SUM(total_cost) as total_fuel_cost FROM FuelLog fl {}",
        owner_filter(scope, "fl")
    )
}

pub fn service_cost_sql(scope: ReportScope) -> String {
    format!(
        "SELECT SUM(cost) as total_service_cost, AVG(cost) as avg_service_cost \
         FROM ServiceRecords sr {}",
        owner_filter(scope, "sr")
    )
}

pub fn maintenance_total_sql(scope: ReportScope) -> String {
    format!(
        "SELECT COUNT(*) as total_count FROM MaintenanceEvents me {}",
        owner_filter(scope, "me")
    )
}

/// Status breakdown; `total_count` of zero is treated as one so the
/// percentage column never divides by zero.
pub fn maintenance_by_status_sql(scope: ReportScope, total_count: u64) -> String {
    format!(
        "SELECT status, \
                COUNT(*) as count, \
                ROUND(COUNT(*) * 100.0 / {}, 1) as percentage \
         FROM MaintenanceEvents me {} \
         GROUP BY status \
         ORDER BY count DESC",
        total_count.max(1),
        owner_filter(scope, "me")
    )
}

/// Spend totals across expenses, fuel and service records. Missing values
/// (no rows, `NULL` sums) read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSummary {
    pub total_expenses: f64,
    pub total_fuel_cost: f64,
    pub total_service_cost: f64,
    pub avg_service_cost: f64,
}

/// Every report for one scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetReport {
    pub expenses_by_category: Vec<Row>,
    pub avg_service_cost_by_vehicle: Vec<Row>,
    pub fuel_statistics: Vec<Row>,
    pub service_count_by_month: Vec<Row>,
    pub cost_summary: CostSummary,
    pub maintenance_by_status: Vec<Row>,
}

/// Runs the report queries through the façade.
pub struct FleetReports<'a, 'g, G: ?Sized> {
    db: &'a Database<'g, G>,
    scope: ReportScope,
}

impl<'a, 'g, G: QueryGateway + ?Sized> FleetReports<'a, 'g, G> {
    pub fn new(db: &'a Database<'g, G>, scope: ReportScope) -> Self {
        Self { db, scope }
    }

    pub async fn expenses_by_category(&self) -> Result<Vec<Row>, GatewayError> {
        self.db.select(&expenses_by_category_sql(self.scope)).await
    }

    pub async fn avg_service_cost_by_vehicle(&self) -> Result<Vec<Row>, GatewayError> {
        self.db
            .select(&avg_service_cost_by_vehicle_sql(self.scope))
            .await
    }

    pub async fn fuel_statistics(&self) -> Result<Vec<Row>, GatewayError> {
        self.db.select(&fuel_statistics_sql(self.scope)).await
    }

    pub async fn service_count_by_month(&self) -> Result<Vec<Row>, GatewayError> {
        self.db.select(&service_count_by_month_sql(self.scope)).await
    }

    pub async fn cost_summary(&self) -> Result<CostSummary, GatewayError> {
        let expenses = self.db.select(&total_expenses_sql(self.scope)).await?;
        let fuel = self.db.select(&total_fuel_cost_sql(self.scope)).await?;
        let service = self.db.select(&service_cost_sql(self.scope)).await?;

        Ok(CostSummary {
            total_expenses: first_f64(&expenses, "total_expenses"),
            total_fuel_cost: first_f64(&fuel, "total_fuel_cost"),
            total_service_cost: first_f64(&service, "total_service_cost"),
            avg_service_cost: first_f64(&service, "avg_service_cost"),
        })
    }

    pub async fn maintenance_by_status(&self) -> Result<Vec<Row>, GatewayError> {
        let totals = self.db.select(&maintenance_total_sql(self.scope)).await?;
        let total_count = totals
            .first()
            .and_then(|row| row.get("total_count"))
            .and_then(number_as_u64)
            .unwrap_or(0);

        self.db
            .select(&maintenance_by_status_sql(self.scope, total_count))
            .await
    }

    /// Run every report, stopping at the first query error.
    pub async fn all(&self) -> Result<FleetReport, GatewayError> {
        Ok(FleetReport {
            expenses_by_category: self.expenses_by_category().await?,
            avg_service_cost_by_vehicle: self.avg_service_cost_by_vehicle().await?,
            fuel_statistics: self.fuel_statistics().await?,
            service_count_by_month: self.service_count_by_month().await?,
            cost_summary: self.cost_summary().await?,
            maintenance_by_status: self.maintenance_by_status().await?,
        })
    }
}

fn first_f64(rows: &[Row], column: &str) -> f64 {
    rows.first()
        .and_then(|row| row.get(column))
        .and_then(number_as_f64)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::gateway::QueryResults;

    /// Answers by matching a substring of the statement.
    struct CannedGateway {
        answers: Vec<(&'static str, Vec<Row>)>,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl QueryGateway for CannedGateway {
        async fn execute(&self, sql: &str) -> Result<QueryResults, GatewayError> {
            self.seen.lock().unwrap().push(sql.to_string());
            let rows = self
                .answers
                .iter()
                .find(|(needle, _)| sql.contains(needle))
                .map(|(_, rows)| rows.clone())
                .unwrap_or_default();
            Ok(QueryResults::Rows(rows))
        }
    }

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn owner_scope_joins_owns() {
        let sql = expenses_by_category_sql(ReportScope::Owner(7));
        assert!(sql.contains("FROM Expenses e JOIN Owns o ON e.vin = o.vin WHERE o.user_id = 7"));

        let sql = expenses_by_category_sql(ReportScope::All);
        assert!(!sql.contains("Owns"));
    }

    #[test]
    fn maintenance_percentage_never_divides_by_zero() {
        assert!(maintenance_by_status_sql(ReportScope::All, 0).contains("/ 1,"));
        assert!(maintenance_by_status_sql(ReportScope::All, 40).contains("/ 40,"));
    }

    #[tokio::test]
    async fn cost_summary_reads_decimal_strings_and_nulls() {
        let gateway = CannedGateway {
            answers: vec![
                ("total_expenses", vec![row(json!({ "total_expenses": "120.50" }))]),
                ("total_fuel_cost", vec![row(json!({ "total_fuel_cost": null }))]),
                (
                    "total_service_cost",
                    vec![row(json!({ "total_service_cost": 300, "avg_service_cost": "150.0000" }))],
                ),
            ],
            seen: Mutex::new(Vec::new()),
        };
        let db = Database::new(&gateway);

        let summary = FleetReports::new(&db, ReportScope::All)
            .cost_summary()
            .await
            .unwrap();

        assert_eq!(
            summary,
            CostSummary {
                total_expenses: 120.5,
                total_fuel_cost: 0.0,
                total_service_cost: 300.0,
                avg_service_cost: 150.0,
            }
        );
    }

    #[tokio::test]
    async fn maintenance_uses_total_for_percentages() {
        let gateway = CannedGateway {
            answers: vec![
                ("total_count", vec![row(json!({ "total_count": 8 }))]),
                ("GROUP BY status", vec![row(json!({ "status": "done", "count": 8 }))]),
            ],
            seen: Mutex::new(Vec::new()),
        };
        let db = Database::new(&gateway);

        let rows = FleetReports::new(&db, ReportScope::Owner(3))
            .maintenance_by_status()
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        let seen = gateway.seen.lock().unwrap();
        assert!(seen[1].contains("COUNT(*) * 100.0 / 8"));
        assert!(seen[1].contains("o.user_id = 3"));
    }

    #[tokio::test]
    async fn full_report_runs_every_query() {
        let gateway = CannedGateway {
            answers: vec![],
            seen: Mutex::new(Vec::new()),
        };
        let db = Database::new(&gateway);

        let report = FleetReports::new(&db, ReportScope::All).all().await.unwrap();

        assert!(report.expenses_by_category.is_empty());
        assert_eq!(report.cost_summary, CostSummary::default());
        // four grouped reports, three totals, two maintenance queries
        assert_eq!(gateway.seen.lock().unwrap().len(), 9);
    }
}
