use std::io::Write;

use anyhow::Result;

use crate::domain::ServiceOrder;

/// Export column labels, in the order downstream spreadsheets expect them.
/// `totalAdvances` is deliberately absent: it never made it into the report
/// layout and consumers don't look for it.
pub const EXPORT_HEADERS: [&str; 26] = [
    "ID Sistema",
    "Caso",
    "Descripción Orden",
    "Servicio",
    "Departamento",
    "Municipio",
    "Dificultad (DDA)",
    "Beneficiario",
    "Fecha",
    "Acta",
    "Valor Labor",
    "Día Adicional",
    "Visita Fallida",
    "Obras Civiles",
    "Transportes",
    "Subtotal Servicio",
    "Total Servicio",
    "IVA",
    "Retención Fuente",
    "Rete ICA",
    "Otros Descuentos",
    "Saldo Labor",
    "Anticipo",
    "Neto a Pagar",
    "Estado",
    "Observaciones",
];

fn record_fields(order: &ServiceOrder) -> [String; 26] {
    [
        order.id.clone(),
        order.case_id.clone(),
        order.order_description.clone(),
        order.service_type.clone(),
        order.department.clone(),
        order.municipality.clone(),
        order.difficulty.clone(),
        order.beneficiary.clone(),
        order.date.clone(),
        order.acta.clone(),
        order.value_labor.to_string(),
        order.value_additional_day.to_string(),
        order.value_failed_visit.to_string(),
        order.value_civil_works.to_string(),
        order.value_transport.to_string(),
        order.subtotal_service.to_string(),
        order.total_service.to_string(),
        order.iva.to_string(),
        order.rete_fuente.to_string(),
        order.rete_ica.to_string(),
        order.other_discounts.to_string(),
        order.balance_labor.to_string(),
        order.advance_amount.to_string(),
        order.balance_to_pay.to_string(),
        order.status.as_str().to_string(),
        order.observation.clone(),
    ]
}

/// Write the given orders as CSV. Numbers are emitted bare (so spreadsheet
/// formulas keep working), text is quoted only where needed. A UTF-8 BOM is
/// prepended so Excel reads the accented labels correctly.
/// Returns the number of exported rows.
pub fn export_orders_csv<W: Write>(mut writer: W, orders: &[&ServiceOrder]) -> Result<usize> {
    writer.write_all("\u{feff}".as_bytes())?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(EXPORT_HEADERS)?;

    let mut count = 0;
    for order in orders {
        csv_writer.write_record(record_fields(order))?;
        count += 1;
    }

    csv_writer.flush()?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderStatus;

    fn export_to_string(orders: &[&ServiceOrder]) -> String {
        let mut buffer = Vec::new();
        export_orders_csv(&mut buffer, orders).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_header_row() {
        let output = export_to_string(&[]);
        let header = output.lines().next().unwrap();
        assert_eq!(
            header,
            "\u{feff}ID Sistema,Caso,Descripción Orden,Servicio,Departamento,Municipio,\
             Dificultad (DDA),Beneficiario,Fecha,Acta,Valor Labor,Día Adicional,\
             Visita Fallida,Obras Civiles,Transportes,Subtotal Servicio,Total Servicio,\
             IVA,Retención Fuente,Rete ICA,Otros Descuentos,Saldo Labor,Anticipo,\
             Neto a Pagar,Estado,Observaciones"
        );
    }

    #[test]
    fn test_numbers_are_bare_and_text_quoted_when_needed() {
        let mut order = ServiceOrder::new();
        order.case_id = "CASO-1".to_string();
        order.observation = "pendiente, ver acta".to_string();
        order.value_labor = 100000;
        order.advance_amount = -30000;
        order.status = OrderStatus::Pending;
        order.recompute();

        let output = export_to_string(&[&order]);
        let row = output.lines().nth(1).unwrap();

        assert!(row.contains(",100000,"));
        assert!(row.contains(",-30000,"));
        assert!(row.contains("\"pendiente, ver acta\""));
        assert!(row.contains("Pendiente"));
    }

    #[test]
    fn test_row_count() {
        let a = ServiceOrder::new();
        let b = ServiceOrder::new();
        let mut buffer = Vec::new();
        let count = export_orders_csv(&mut buffer, &[&a, &b]).unwrap();
        assert_eq!(count, 2);
        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(output.lines().count(), 3);
    }
}
