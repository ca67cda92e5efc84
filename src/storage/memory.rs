use std::sync::Mutex;

use anyhow::Result;

use crate::domain::{OrderStatus, ServiceOrder};

use super::OrderStore;

/// In-process fallback store. Keeps the same interface and record shape as
/// the SQLite backend; ordering is newest-first by insertion since there is
/// no creation timestamp to sort on.
pub struct MemoryStore {
    orders: Mutex<Vec<ServiceOrder>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            orders: Mutex::new(Vec::new()),
        }
    }

    /// A store pre-seeded with demo orders, used when no database is
    /// configured so the list/dashboard/export commands have something to
    /// show.
    pub fn with_sample_data() -> Self {
        Self {
            orders: Mutex::new(sample_orders()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderStore for MemoryStore {
    async fn list(&self) -> Result<Vec<ServiceOrder>> {
        Ok(self.orders.lock().expect("order store mutex poisoned").clone())
    }

    async fn upsert(&self, order: &ServiceOrder) -> Result<()> {
        let mut orders = self.orders.lock().expect("order store mutex poisoned");
        match orders.iter_mut().find(|existing| existing.id == order.id) {
            Some(existing) => *existing = order.clone(),
            None => orders.insert(0, order.clone()),
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.orders
            .lock()
            .expect("order store mutex poisoned")
            .retain(|order| order.id != id);
        Ok(())
    }
}

fn sample_order(
    case_id: &str,
    service_type: &str,
    department: &str,
    municipality: &str,
    beneficiary: &str,
    date: &str,
    status: OrderStatus,
) -> ServiceOrder {
    let mut order = ServiceOrder::new();
    order.case_id = case_id.to_string();
    order.service_type = service_type.to_string();
    order.department = department.to_string();
    order.municipality = municipality.to_string();
    order.beneficiary = beneficiary.to_string();
    order.date = date.to_string();
    order.status = status;
    order
}

fn sample_orders() -> Vec<ServiceOrder> {
    let mut orders = Vec::new();

    let mut order = sample_order(
        "CASO-1042",
        "INSTALACION",
        "Cundinamarca",
        "Soacha",
        "Carlos Pérez",
        "15/03/2025",
        OrderStatus::Open,
    );
    order.order_description = "Instalación servicio residencial".to_string();
    order.difficulty = "DDA-2".to_string();
    order.value_labor = 180000;
    order.value_transport = 25000;
    order.iva = 34200;
    order.rete_fuente = 9000;
    order.advance_amount = 50000;
    order.recompute();
    orders.push(order);

    let mut order = sample_order(
        "CASO-1038",
        "MANTENIMIENTO",
        "Antioquia",
        "Envigado",
        "Luisa Ramírez",
        "02/03/2025",
        OrderStatus::Pending,
    );
    order.order_description = "Mantenimiento preventivo nodo".to_string();
    order.value_labor = 120000;
    order.value_additional_day = 60000;
    order.iva = 22800;
    order.rete_fuente = 6000;
    order.rete_ica = 1200;
    order.recompute();
    orders.push(order);

    let mut order = sample_order(
        "CASO-1031",
        "INSTALACION",
        "Cundinamarca",
        "Zipaquirá",
        "Andrés Mejía",
        "18/02/2025",
        OrderStatus::Closed,
    );
    order.order_description = "Instalación enlace dedicado".to_string();
    order.acta = "ACTA-77".to_string();
    order.value_labor = 250000;
    order.value_civil_works = 90000;
    order.value_transport = 40000;
    order.iva = 64600;
    order.rete_fuente = 17000;
    order.advance_amount = 400000;
    order.observation = "Anticipo mayor al saldo, pendiente cruce".to_string();
    order.recompute();
    orders.push(order);

    let mut order = sample_order(
        "CASO-1025",
        "DESINSTALACION",
        "Valle del Cauca",
        "Palmira",
        "Luisa Ramírez",
        "05/02/2025",
        OrderStatus::Closed,
    );
    order.order_description = "Retiro de equipos".to_string();
    order.value_failed_visit = 35000;
    order.value_labor = 80000;
    order.iva = 15200;
    order.rete_fuente = 4000;
    order.recompute();
    orders.push(order);

    orders
}
