use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Pesos, dates};

pub type OrderId = String;

/// Workflow status of a service order. Set directly by the user, never derived
/// from the financial fields. Persisted under the Spanish labels the billing
/// table has always carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "Abierto")]
    Open,
    #[serde(rename = "Pendiente")]
    Pending,
    #[serde(rename = "Cerrado")]
    Closed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "Abierto",
            OrderStatus::Pending => "Pendiente",
            OrderStatus::Closed => "Cerrado",
        }
    }

    /// Accepts both the persisted Spanish labels and plain English names,
    /// case-insensitively.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "abierto" | "open" => Some(OrderStatus::Open),
            "pendiente" | "pending" => Some(OrderStatus::Pending),
            "cerrado" | "closed" => Some(OrderStatus::Closed),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A field-service order with its full billing breakdown.
///
/// The serialized field names are a persistence contract: both store backends
/// and the JSON/CSV surfaces use them verbatim, so they must not be renamed.
/// The four derived balances are only ever written by [`recompute`]
/// (see `balance.rs`); everything else is edited directly.
///
/// [`recompute`]: ServiceOrder::recompute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOrder {
    pub id: OrderId,

    // Description
    pub case_id: String,
    pub order_description: String,
    pub service_type: String,
    pub department: String,
    pub municipality: String,
    pub difficulty: String,
    pub beneficiary: String,
    pub date: String,
    pub acta: String,

    // Advance
    pub advance_amount: Pesos,

    // Service billing
    pub value_labor: Pesos,
    pub value_additional_day: Pesos,
    pub value_failed_visit: Pesos,
    pub value_civil_works: Pesos,
    pub value_transport: Pesos,

    // Taxes and withholdings
    pub iva: Pesos,
    pub rete_fuente: Pesos,
    pub rete_ica: Pesos,
    pub other_discounts: Pesos,

    // Derived balances, written only by recompute
    pub subtotal_service: Pesos,
    pub total_service: Pesos,
    pub balance_labor: Pesos,
    pub balance_to_pay: Pesos,

    /// Retained for compatibility with older exports; nothing computes it.
    pub total_advances: Pesos,

    pub status: OrderStatus,
    pub observation: String,
}

impl ServiceOrder {
    /// A fresh draft: unique id, today's date, every monetary field zeroed,
    /// status Open.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            case_id: String::new(),
            order_description: String::new(),
            service_type: String::new(),
            department: String::new(),
            municipality: String::new(),
            difficulty: String::new(),
            beneficiary: String::new(),
            date: dates::today_display(),
            acta: String::new(),
            advance_amount: 0,
            value_labor: 0,
            value_additional_day: 0,
            value_failed_visit: 0,
            value_civil_works: 0,
            value_transport: 0,
            iva: 0,
            rete_fuente: 0,
            rete_ica: 0,
            other_discounts: 0,
            subtotal_service: 0,
            total_service: 0,
            balance_labor: 0,
            balance_to_pay: 0,
            total_advances: 0,
            status: OrderStatus::Open,
            observation: String::new(),
        }
    }
}

impl Default for ServiceOrder {
    fn default() -> Self {
        Self::new()
    }
}
