//! Editing session scenarios across items, totals and export naming

use chrono::NaiveDate;
use invoice_model::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn session() -> InvoiceSession {
    let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    let number = default_invoice_number(date, &mut StdRng::seed_from_u64(7));
    InvoiceSession::new(DocumentMetadata::new(number, date), ItemDefaults::default())
}

#[test]
fn test_editing_flow_updates_totals() {
    let mut session = session();
    let first = session.items()[0].id;
    session.set_description(first, "Discovery workshop").unwrap();
    assert_eq!(session.set_quantity(first, "4").unwrap(), 100.0);

    let second = session.add_item();
    session.set_unit(second, Unit::Pages).unwrap();
    session.set_unit_rate(second, " 12.5 per page").unwrap();
    assert_eq!(session.set_quantity(second, "10").unwrap(), 125.0);

    let totals = session.totals();
    assert_eq!(totals.subtotal, 225.0);
    assert_eq!(totals.total, 225.0);
    assert_eq!(totals.balance_due, 225.0);
    assert_eq!(format_money(&session.metadata().currency_symbol, totals.total), "£225.00");

    session.remove_item(first).unwrap();
    assert_eq!(session.totals().total, 125.0);
    assert!(matches!(session.remove_item(second), Err(ModelError::LastItem)));
    assert!(matches!(session.remove_item(first), Err(ModelError::ItemNotFound(_))));
}

#[test]
fn test_snapshot_names_the_export() {
    let mut session = session();
    session.metadata_mut().client.name = " Acme \t Widgets  Ltd ".to_string();
    let snapshot = session.snapshot();

    let number = snapshot.metadata.display_invoice_number().to_string();
    assert!(number.starts_with("INV202610"));
    assert_eq!(
        export_file_name(&snapshot.metadata),
        format!("Invoice-{}-Acme_Widgets_Ltd.pdf", number)
    );
}

#[test]
fn test_blank_fields_use_fallbacks() {
    let mut session = session();
    session.metadata_mut().invoice_number = "   ".to_string();
    let snapshot = session.snapshot();
    assert_eq!(export_file_name(&snapshot.metadata), "Invoice-INV0001-Client_Name.pdf");
}

proptest! {
    #[test]
    fn prop_session_total_matches_item_amounts(
        entries in proptest::collection::vec((0.0f64..10_000.0, 0.0f64..500.0), 1..20)
    ) {
        let mut session = session();
        let first = session.items()[0].id;
        let mut ids = vec![first];
        for _ in 1..entries.len() {
            ids.push(session.add_item());
        }
        for (id, (rate, qty)) in ids.iter().zip(&entries) {
            session.set_unit_rate(*id, &rate.to_string()).unwrap();
            session.set_quantity(*id, &qty.to_string()).unwrap();
        }

        let snapshot = session.snapshot();
        prop_assert_eq!(session.totals(), snapshot.totals());

        let mut reversed = snapshot.items.clone();
        reversed.reverse();
        prop_assert_eq!(TotalsCalculator::total(&reversed), session.totals().total);
    }
}
