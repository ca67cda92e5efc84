// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use saldo::application::OrderService;
use saldo::domain::{OrderStatus, ServiceOrder};
use saldo::storage::SqliteStore;
use tempfile::TempDir;

/// Create a fresh database in a temporary directory and return its path.
pub async fn init_db() -> Result<(String, TempDir)> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir
        .path()
        .join("test.db")
        .to_str()
        .unwrap()
        .to_string();
    SqliteStore::init(&path).await?;
    Ok((path, temp_dir))
}

/// Open a service over an existing database, loading the full order list.
pub async fn connect_service(path: &str) -> Result<OrderService<SqliteStore>> {
    let store = SqliteStore::connect(path).await?;
    Ok(OrderService::load(store).await?)
}

/// Helper to create a test service with a temporary database.
pub async fn test_service() -> Result<(OrderService<SqliteStore>, TempDir)> {
    let (path, temp_dir) = init_db().await?;
    Ok((connect_service(&path).await?, temp_dir))
}

/// A draft with the identifying fields set; monetary fields stay zeroed.
pub fn draft(case_id: &str, beneficiary: &str, date: &str) -> ServiceOrder {
    let mut order = ServiceOrder::new();
    order.case_id = case_id.to_string();
    order.beneficiary = beneficiary.to_string();
    order.date = date.to_string();
    order
}

/// A fully billed order matching the worked settlement example:
/// labor 100000, transport 20000, IVA 19000, withholdings 7000, advance
/// 30000, so computing yields 100000 / 120000 / 132000 / 102000.
pub fn billed_draft(case_id: &str, beneficiary: &str, date: &str) -> ServiceOrder {
    let mut order = draft(case_id, beneficiary, date);
    order.service_type = "INSTALACION".to_string();
    order.department = "Cundinamarca".to_string();
    order.municipality = "Soacha".to_string();
    order.value_labor = 100000;
    order.value_transport = 20000;
    order.iva = 19000;
    order.rete_fuente = 5000;
    order.rete_ica = 2000;
    order.advance_amount = 30000;
    order.status = OrderStatus::Open;
    order
}
