use super::{Pesos, ServiceOrder};

/// The raw monetary inputs a balance is settled from: the five billed line
/// items, the advance already paid out, and the four tax/discount amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BalanceInputs {
    pub labor: Pesos,
    pub additional_day: Pesos,
    pub failed_visit: Pesos,
    pub civil_works: Pesos,
    pub transport: Pesos,
    pub advance: Pesos,
    pub iva: Pesos,
    pub rete_fuente: Pesos,
    pub rete_ica: Pesos,
    pub other_discounts: Pesos,
}

/// The four derived balances. Always produced together; never edited directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DerivedBalances {
    pub subtotal_service: Pesos,
    pub total_service: Pesos,
    pub balance_labor: Pesos,
    pub balance_to_pay: Pesos,
}

/// Settle an order's balances from its raw inputs.
///
/// The pipeline, in order:
/// 1. subtotal = labor charges excluding transport
/// 2. total service = subtotal + transport
/// 3. withheld = reteFuente + reteIca + otherDiscounts. IVA is not in this
///    group: it is billed on top of the service, the others are withheld
///    from it.
/// 4. labor balance = total service + IVA - withheld
/// 5. balance to pay = labor balance - advance
///
/// Total function: every i64 input produces a result. Negative inputs are not
/// rejected and propagate arithmetically, and a negative balance to pay (an
/// advance exceeding the settled labor) is preserved, never clamped.
pub fn derive_balances(inputs: &BalanceInputs) -> DerivedBalances {
    let subtotal_service =
        inputs.labor + inputs.additional_day + inputs.failed_visit + inputs.civil_works;

    let total_service = subtotal_service + inputs.transport;

    let withheld = inputs.rete_fuente + inputs.rete_ica + inputs.other_discounts;

    let balance_labor = total_service + inputs.iva - withheld;

    let balance_to_pay = balance_labor - inputs.advance;

    DerivedBalances {
        subtotal_service,
        total_service,
        balance_labor,
        balance_to_pay,
    }
}

impl ServiceOrder {
    /// The raw inputs of this order, as the engine sees them.
    pub fn balance_inputs(&self) -> BalanceInputs {
        BalanceInputs {
            labor: self.value_labor,
            additional_day: self.value_additional_day,
            failed_visit: self.value_failed_visit,
            civil_works: self.value_civil_works,
            transport: self.value_transport,
            advance: self.advance_amount,
            iva: self.iva,
            rete_fuente: self.rete_fuente,
            rete_ica: self.rete_ica,
            other_discounts: self.other_discounts,
        }
    }

    /// Recompute the four derived balances from the current raw inputs,
    /// overwriting them on the order, and return the fresh values.
    ///
    /// This is the only way derived fields change, and it only runs when
    /// explicitly invoked: editing a raw field does not re-derive anything,
    /// so an order saved without a recompute keeps whatever balances it had.
    pub fn recompute(&mut self) -> DerivedBalances {
        let derived = derive_balances(&self.balance_inputs());
        self.subtotal_service = derived.subtotal_service;
        self.total_service = derived.total_service;
        self.balance_labor = derived.balance_labor;
        self.balance_to_pay = derived.balance_to_pay;
        derived
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> BalanceInputs {
        BalanceInputs {
            labor: 100000,
            additional_day: 0,
            failed_visit: 0,
            civil_works: 0,
            transport: 20000,
            advance: 30000,
            iva: 19000,
            rete_fuente: 5000,
            rete_ica: 2000,
            other_discounts: 0,
        }
    }

    #[test]
    fn test_worked_example() {
        let derived = derive_balances(&inputs());
        assert_eq!(derived.subtotal_service, 100000);
        assert_eq!(derived.total_service, 120000);
        assert_eq!(derived.balance_labor, 132000);
        assert_eq!(derived.balance_to_pay, 102000);
    }

    #[test]
    fn test_subtotal_ignores_transport_and_taxes() {
        let mut varied = inputs();
        varied.transport = 999999;
        varied.iva = 123456;
        varied.rete_fuente = 777;
        varied.rete_ica = 888;
        varied.other_discounts = 999;

        assert_eq!(
            derive_balances(&varied).subtotal_service,
            derive_balances(&inputs()).subtotal_service
        );
    }

    #[test]
    fn test_subtotal_sums_all_labor_items() {
        let derived = derive_balances(&BalanceInputs {
            labor: 1,
            additional_day: 2,
            failed_visit: 4,
            civil_works: 8,
            ..Default::default()
        });
        assert_eq!(derived.subtotal_service, 15);
        assert_eq!(derived.total_service, 15);
    }

    #[test]
    fn test_total_service_adds_transport() {
        let derived = derive_balances(&inputs());
        assert_eq!(
            derived.total_service,
            derived.subtotal_service + inputs().transport
        );
    }

    #[test]
    fn test_iva_is_added_not_withheld() {
        let with_iva = derive_balances(&BalanceInputs {
            labor: 100000,
            iva: 19000,
            ..Default::default()
        });
        assert_eq!(with_iva.balance_labor, 119000);

        let withheld_only = derive_balances(&BalanceInputs {
            labor: 100000,
            rete_fuente: 19000,
            ..Default::default()
        });
        assert_eq!(withheld_only.balance_labor, 81000);
    }

    #[test]
    fn test_negative_balance_is_preserved() {
        let derived = derive_balances(&BalanceInputs {
            advance: 500000,
            ..Default::default()
        });
        assert_eq!(derived.balance_labor, 0);
        assert_eq!(derived.balance_to_pay, -500000);
    }

    #[test]
    fn test_negative_inputs_propagate() {
        let derived = derive_balances(&BalanceInputs {
            labor: -1000,
            transport: 500,
            ..Default::default()
        });
        assert_eq!(derived.subtotal_service, -1000);
        assert_eq!(derived.total_service, -500);
        assert_eq!(derived.balance_to_pay, -500);
    }

    #[test]
    fn test_all_zero_inputs() {
        assert_eq!(
            derive_balances(&BalanceInputs::default()),
            DerivedBalances::default()
        );
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut order = ServiceOrder::new();
        order.value_labor = 100000;
        order.value_transport = 20000;
        order.iva = 19000;
        order.rete_fuente = 5000;
        order.rete_ica = 2000;
        order.advance_amount = 30000;

        let first = order.recompute();
        let second = order.recompute();
        assert_eq!(first, second);
        assert_eq!(order.balance_to_pay, 102000);
    }

    #[test]
    fn test_recompute_overwrites_derived_fields() {
        let mut order = ServiceOrder::new();
        order.value_labor = 50000;
        order.recompute();
        assert_eq!(order.subtotal_service, 50000);
        assert_eq!(order.total_service, 50000);
        assert_eq!(order.balance_labor, 50000);
        assert_eq!(order.balance_to_pay, 50000);

        // Raw edits leave the derived fields alone until the next recompute.
        order.value_labor = 80000;
        assert_eq!(order.subtotal_service, 50000);
        order.recompute();
        assert_eq!(order.subtotal_service, 80000);
    }

    #[test]
    fn test_recompute_leaves_legacy_total_advances_alone() {
        let mut order = ServiceOrder::new();
        order.total_advances = 12345;
        order.value_labor = 1000;
        order.recompute();
        assert_eq!(order.total_advances, 12345);
    }
}
