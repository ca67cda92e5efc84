use anyhow::Result;
use saldo::application::OrderFilter;
use saldo::domain::OrderStatus;
use saldo::io::{EXPORT_HEADERS, export_orders_csv};

mod common;
use common::{billed_draft, draft, test_service};

#[tokio::test]
async fn test_export_covers_the_filtered_set() -> Result<()> {
    let (mut service, _temp) = test_service().await?;

    let mut computed = billed_draft("CASO-EXP", "Carlos", "15/03/2025");
    computed.recompute();
    service.save(computed).await;
    service.save(draft("CASO-OTRO", "Luisa", "01/01/2025")).await;

    let filter = OrderFilter {
        search: Some("caso-exp".to_string()),
        ..Default::default()
    };
    let orders = service.filtered(&filter);

    let mut buffer = Vec::new();
    let count = export_orders_csv(&mut buffer, &orders)?;
    assert_eq!(count, 1);

    let output = String::from_utf8(buffer)?;
    let mut lines = output.lines();
    let header = lines.next().unwrap();
    assert_eq!(header.matches(',').count(), EXPORT_HEADERS.len() - 1);
    assert!(header.starts_with("\u{feff}ID Sistema,Caso,"));
    assert!(header.ends_with("Estado,Observaciones"));

    let row = lines.next().unwrap();
    assert!(row.contains("CASO-EXP"));
    assert!(row.contains("15/03/2025"));
    // Derived balances from the worked example, emitted as bare numbers.
    assert!(row.contains(",100000,"));
    assert!(row.contains(",120000,"));
    assert!(row.contains(",132000,"));
    assert!(row.contains(",102000"));
    assert!(lines.next().is_none());

    Ok(())
}

#[tokio::test]
async fn test_export_all_statuses_and_negatives() -> Result<()> {
    let (mut service, _temp) = test_service().await?;

    let mut overpaid = draft("CASO-NEG", "Carlos", "01/01/2025");
    overpaid.advance_amount = 500000;
    overpaid.status = OrderStatus::Closed;
    overpaid.recompute();
    service.save(overpaid).await;

    let orders = service.filtered(&OrderFilter::default());
    let mut buffer = Vec::new();
    export_orders_csv(&mut buffer, &orders)?;

    let output = String::from_utf8(buffer)?;
    let row = output.lines().nth(1).unwrap();
    assert!(row.contains("Cerrado"));
    assert!(row.contains(",-500000,"));

    Ok(())
}
