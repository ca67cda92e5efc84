use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::domain::{OrderStatus, Pesos, ServiceOrder};

#[derive(Debug, Clone, Serialize)]
pub struct GroupCount {
    pub name: String,
    pub count: usize,
}

/// The control-panel numbers for a set of orders (usually already
/// date-filtered by the caller).
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_orders: usize,
    pub active_technicians: usize,
    pub open_orders: usize,
    pub pending_orders: usize,
    pub closed_orders: usize,
    /// Sum of every order's total service value (gross invoiced).
    pub total_invoiced: Pesos,
    /// Sum of every order's net payable; negative entries pull it down.
    pub total_balance_to_pay: Pesos,
    pub by_department: Vec<GroupCount>,
    pub by_service_type: Vec<GroupCount>,
}

pub fn summarize(orders: &[&ServiceOrder]) -> DashboardSummary {
    let technicians: HashSet<&str> = orders.iter().map(|o| o.beneficiary.as_str()).collect();

    DashboardSummary {
        total_orders: orders.len(),
        active_technicians: technicians.len(),
        open_orders: count_status(orders, OrderStatus::Open),
        pending_orders: count_status(orders, OrderStatus::Pending),
        closed_orders: count_status(orders, OrderStatus::Closed),
        total_invoiced: orders.iter().map(|o| o.total_service).sum(),
        total_balance_to_pay: orders.iter().map(|o| o.balance_to_pay).sum(),
        by_department: group_counts(orders, |o| o.department.as_str()),
        by_service_type: group_counts(orders, |o| o.service_type.as_str()),
    }
}

fn count_status(orders: &[&ServiceOrder], status: OrderStatus) -> usize {
    orders.iter().filter(|o| o.status == status).count()
}

fn group_counts<'a>(
    orders: &[&'a ServiceOrder],
    key: impl Fn(&'a ServiceOrder) -> &'a str,
) -> Vec<GroupCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for order in orders {
        *counts.entry(key(*order)).or_insert(0) += 1;
    }

    let mut groups: Vec<GroupCount> = counts
        .into_iter()
        .map(|(name, count)| GroupCount {
            name: name.to_string(),
            count,
        })
        .collect();
    // Largest groups first; BTreeMap already settled name order for ties.
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups
}
