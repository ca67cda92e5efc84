use chrono::NaiveDate;

use crate::domain::{OrderStatus, ServiceOrder, dates};
use crate::storage::OrderStore;

use super::AppError;

/// Outcome of an optimistic save. The in-memory view is updated before the
/// store confirms; on store failure the previous view is restored and the
/// error handed back for display rather than raised.
#[derive(Debug)]
pub enum SaveOutcome {
    Saved,
    RolledBack { error: anyhow::Error },
}

/// Outcome of an optimistic delete. On store failure the whole list is
/// re-read from the store to resynchronize, which is cheaper to reason about
/// than undoing a partial removal.
#[derive(Debug)]
pub enum DeleteOutcome {
    Deleted,
    Resynced { error: anyhow::Error },
}

/// Criteria for narrowing the order list: one free-text search over
/// case/beneficiary/department, per-column contains filters, an exact status
/// and an inclusive service-date range.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub search: Option<String>,
    pub case_id: Option<String>,
    pub service_type: Option<String>,
    /// Matches either the department or the municipality.
    pub location: Option<String>,
    pub beneficiary: Option<String>,
    pub status: Option<OrderStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl OrderFilter {
    pub fn matches(&self, order: &ServiceOrder) -> bool {
        if let Some(term) = &self.search {
            let hit = contains_ci(&order.case_id, term)
                || contains_ci(&order.beneficiary, term)
                || contains_ci(&order.department, term);
            if !hit {
                return false;
            }
        }

        if self.from.is_some() || self.to.is_some() {
            // Orders whose date text doesn't parse can't land in any range.
            let Some(date) = dates::parse_display_date(&order.date) else {
                return false;
            };
            if self.from.is_some_and(|from| date < from) {
                return false;
            }
            if self.to.is_some_and(|to| date > to) {
                return false;
            }
        }

        if let Some(case_id) = &self.case_id {
            if !contains_ci(&order.case_id, case_id) {
                return false;
            }
        }
        if let Some(service_type) = &self.service_type {
            if !contains_ci(&order.service_type, service_type) {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !contains_ci(&order.department, location)
                && !contains_ci(&order.municipality, location)
            {
                return false;
            }
        }
        if let Some(beneficiary) = &self.beneficiary {
            if !contains_ci(&order.beneficiary, beneficiary) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if order.status != status {
                return false;
            }
        }

        true
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// High-level order operations over a store backend. Holds the in-memory
/// view (most recently created first) that listing, filtering and the
/// dashboard read from; persistence runs behind it with optimistic updates.
pub struct OrderService<S> {
    store: S,
    orders: Vec<ServiceOrder>,
}

impl<S: OrderStore> OrderService<S> {
    /// Load the full order list from the store.
    pub async fn load(store: S) -> Result<Self, AppError> {
        let orders = store.list().await?;
        Ok(Self { store, orders })
    }

    pub fn orders(&self) -> &[ServiceOrder] {
        &self.orders
    }

    pub fn find(&self, id: &str) -> Option<&ServiceOrder> {
        self.orders.iter().find(|order| order.id == id)
    }

    pub fn get(&self, id: &str) -> Result<&ServiceOrder, AppError> {
        self.find(id)
            .ok_or_else(|| AppError::OrderNotFound(id.to_string()))
    }

    /// A fresh zeroed draft, not yet part of the view.
    pub fn new_draft(&self) -> ServiceOrder {
        ServiceOrder::new()
    }

    /// Clone a stored order for editing. The stored record stays untouched
    /// until the draft comes back through `save`.
    pub fn open_draft(&self, id: &str) -> Result<ServiceOrder, AppError> {
        self.get(id).cloned()
    }

    pub fn filtered(&self, filter: &OrderFilter) -> Vec<&ServiceOrder> {
        self.orders
            .iter()
            .filter(|order| filter.matches(order))
            .collect()
    }

    /// Persist a draft as a whole record: applied to the view immediately
    /// (new orders at the front), then written through. Derived fields go in
    /// exactly as they are on the draft — stale or not.
    pub async fn save(&mut self, draft: ServiceOrder) -> SaveOutcome {
        let snapshot = self.orders.clone();
        match self.orders.iter_mut().find(|order| order.id == draft.id) {
            Some(existing) => *existing = draft.clone(),
            None => self.orders.insert(0, draft.clone()),
        }

        match self.store.upsert(&draft).await {
            Ok(()) => SaveOutcome::Saved,
            Err(error) => {
                tracing::warn!(order = %draft.id, %error, "save failed, restoring previous view");
                self.orders = snapshot;
                SaveOutcome::RolledBack { error }
            }
        }
    }

    /// Remove an order: dropped from the view immediately, then deleted from
    /// the store. If the store refuses, the view is re-read wholesale so it
    /// cannot drift; if even that fails, the pre-delete snapshot comes back.
    pub async fn delete(&mut self, id: &str) -> Result<DeleteOutcome, AppError> {
        if self.find(id).is_none() {
            return Err(AppError::OrderNotFound(id.to_string()));
        }

        let snapshot = self.orders.clone();
        self.orders.retain(|order| order.id != id);

        match self.store.delete(id).await {
            Ok(()) => Ok(DeleteOutcome::Deleted),
            Err(error) => {
                tracing::warn!(order = %id, %error, "delete failed, reloading from store");
                match self.store.list().await {
                    Ok(orders) => self.orders = orders,
                    Err(_) => self.orders = snapshot,
                }
                Ok(DeleteOutcome::Resynced { error })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(case_id: &str, beneficiary: &str, date: &str, status: OrderStatus) -> ServiceOrder {
        let mut order = ServiceOrder::new();
        order.case_id = case_id.to_string();
        order.beneficiary = beneficiary.to_string();
        order.date = date.to_string();
        order.status = status;
        order
    }

    #[test]
    fn test_search_matches_case_beneficiary_department() {
        let mut o = order("CASO-77", "Carlos Pérez", "01/01/2025", OrderStatus::Open);
        o.department = "Antioquia".to_string();

        let by_case = OrderFilter {
            search: Some("caso-77".into()),
            ..Default::default()
        };
        let by_tech = OrderFilter {
            search: Some("pérez".into()),
            ..Default::default()
        };
        let by_dept = OrderFilter {
            search: Some("antio".into()),
            ..Default::default()
        };
        let miss = OrderFilter {
            search: Some("bogotá".into()),
            ..Default::default()
        };

        assert!(by_case.matches(&o));
        assert!(by_tech.matches(&o));
        assert!(by_dept.matches(&o));
        assert!(!miss.matches(&o));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let o = order("C", "T", "15/03/2025", OrderStatus::Open);
        let filter = OrderFilter {
            from: NaiveDate::from_ymd_opt(2025, 3, 15),
            to: NaiveDate::from_ymd_opt(2025, 3, 15),
            ..Default::default()
        };
        assert!(filter.matches(&o));

        let before = OrderFilter {
            from: NaiveDate::from_ymd_opt(2025, 3, 16),
            ..Default::default()
        };
        assert!(!before.matches(&o));
    }

    #[test]
    fn test_unparseable_date_excluded_only_when_range_set() {
        let o = order("C", "T", "sin fecha", OrderStatus::Open);
        assert!(OrderFilter::default().matches(&o));

        let ranged = OrderFilter {
            from: NaiveDate::from_ymd_opt(2025, 1, 1),
            ..Default::default()
        };
        assert!(!ranged.matches(&o));
    }

    #[test]
    fn test_location_matches_department_or_municipality() {
        let mut o = order("C", "T", "01/01/2025", OrderStatus::Open);
        o.department = "Cundinamarca".to_string();
        o.municipality = "Soacha".to_string();

        let by_dept = OrderFilter {
            location: Some("cundina".into()),
            ..Default::default()
        };
        let by_town = OrderFilter {
            location: Some("soacha".into()),
            ..Default::default()
        };
        assert!(by_dept.matches(&o));
        assert!(by_town.matches(&o));
    }

    #[test]
    fn test_status_filter_is_exact() {
        let o = order("C", "T", "01/01/2025", OrderStatus::Pending);
        let pending = OrderFilter {
            status: Some(OrderStatus::Pending),
            ..Default::default()
        };
        let closed = OrderFilter {
            status: Some(OrderStatus::Closed),
            ..Default::default()
        };
        assert!(pending.matches(&o));
        assert!(!closed.matches(&o));
    }
}
