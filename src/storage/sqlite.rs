use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::domain::{OrderStatus, ServiceOrder};

use super::{MIGRATION_001_INITIAL, OrderStore};

const SELECT_COLUMNS: &str = "id, caseId, orderDescription, serviceType, department, municipality, \
     difficulty, beneficiary, date, acta, advanceAmount, valueLabor, valueAdditionalDay, \
     valueFailedVisit, valueCivilWorks, valueTransport, iva, reteFuente, reteIca, otherDiscounts, \
     subtotalService, totalService, balanceLabor, balanceToPay, totalAdvances, status, observation";

/// The primary backing table for service orders.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to an existing database at the given path.
    pub async fn connect(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{}", database_path);
        let pool = SqlitePool::connect(&url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Create the database file if needed and run migrations.
    pub async fn init(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{}?mode=rwc", database_path);
        let pool = SqlitePool::connect(&url)
            .await
            .context("Failed to create database")?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    fn row_to_order(row: &sqlx::sqlite::SqliteRow) -> Result<ServiceOrder> {
        let status_str: String = row.get("status");
        let status = OrderStatus::from_str(&status_str)
            .ok_or_else(|| anyhow::anyhow!("Invalid order status: {}", status_str))?;

        Ok(ServiceOrder {
            id: row.get("id"),
            case_id: row.get("caseId"),
            order_description: row.get("orderDescription"),
            service_type: row.get("serviceType"),
            department: row.get("department"),
            municipality: row.get("municipality"),
            difficulty: row.get("difficulty"),
            beneficiary: row.get("beneficiary"),
            date: row.get("date"),
            acta: row.get("acta"),
            advance_amount: row.get("advanceAmount"),
            value_labor: row.get("valueLabor"),
            value_additional_day: row.get("valueAdditionalDay"),
            value_failed_visit: row.get("valueFailedVisit"),
            value_civil_works: row.get("valueCivilWorks"),
            value_transport: row.get("valueTransport"),
            iva: row.get("iva"),
            rete_fuente: row.get("reteFuente"),
            rete_ica: row.get("reteIca"),
            other_discounts: row.get("otherDiscounts"),
            subtotal_service: row.get("subtotalService"),
            total_service: row.get("totalService"),
            balance_labor: row.get("balanceLabor"),
            balance_to_pay: row.get("balanceToPay"),
            total_advances: row.get("totalAdvances"),
            status,
            observation: row.get("observation"),
        })
    }
}

impl OrderStore for SqliteStore {
    async fn list(&self) -> Result<Vec<ServiceOrder>> {
        let query = format!(
            "SELECT {} FROM orders ORDER BY created_at DESC, rowid DESC",
            SELECT_COLUMNS
        );
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list orders")?;

        rows.iter().map(Self::row_to_order).collect()
    }

    async fn upsert(&self, order: &ServiceOrder) -> Result<()> {
        // Full-record replace on id collision; created_at stays untouched so
        // an edited order keeps its place in the listing.
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, caseId, orderDescription, serviceType, department, municipality,
                difficulty, beneficiary, date, acta, advanceAmount, valueLabor,
                valueAdditionalDay, valueFailedVisit, valueCivilWorks, valueTransport,
                iva, reteFuente, reteIca, otherDiscounts, subtotalService, totalService,
                balanceLabor, balanceToPay, totalAdvances, status, observation, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                caseId = excluded.caseId,
                orderDescription = excluded.orderDescription,
                serviceType = excluded.serviceType,
                department = excluded.department,
                municipality = excluded.municipality,
                difficulty = excluded.difficulty,
                beneficiary = excluded.beneficiary,
                date = excluded.date,
                acta = excluded.acta,
                advanceAmount = excluded.advanceAmount,
                valueLabor = excluded.valueLabor,
                valueAdditionalDay = excluded.valueAdditionalDay,
                valueFailedVisit = excluded.valueFailedVisit,
                valueCivilWorks = excluded.valueCivilWorks,
                valueTransport = excluded.valueTransport,
                iva = excluded.iva,
                reteFuente = excluded.reteFuente,
                reteIca = excluded.reteIca,
                otherDiscounts = excluded.otherDiscounts,
                subtotalService = excluded.subtotalService,
                totalService = excluded.totalService,
                balanceLabor = excluded.balanceLabor,
                balanceToPay = excluded.balanceToPay,
                totalAdvances = excluded.totalAdvances,
                status = excluded.status,
                observation = excluded.observation
            "#,
        )
        .bind(&order.id)
        .bind(&order.case_id)
        .bind(&order.order_description)
        .bind(&order.service_type)
        .bind(&order.department)
        .bind(&order.municipality)
        .bind(&order.difficulty)
        .bind(&order.beneficiary)
        .bind(&order.date)
        .bind(&order.acta)
        .bind(order.advance_amount)
        .bind(order.value_labor)
        .bind(order.value_additional_day)
        .bind(order.value_failed_visit)
        .bind(order.value_civil_works)
        .bind(order.value_transport)
        .bind(order.iva)
        .bind(order.rete_fuente)
        .bind(order.rete_ica)
        .bind(order.other_discounts)
        .bind(order.subtotal_service)
        .bind(order.total_service)
        .bind(order.balance_labor)
        .bind(order.balance_to_pay)
        .bind(order.total_advances)
        .bind(order.status.as_str())
        .bind(&order.observation)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save order")?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete order")?;
        Ok(())
    }
}
