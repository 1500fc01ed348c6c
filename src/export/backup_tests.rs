#![allow(clippy::unwrap_used)]

use super::*;
use chrono::TimeZone;
use rust_decimal_macros::dec;

use crate::db::MemoryStore;
use crate::models::{RecurringInput, TransactionInput};

fn seeded_store() -> Store<MemoryStore> {
    let mut store = Store::load(MemoryStore::default()).unwrap();
    store
        .add_transaction(&TransactionInput::new(
            TxnType::Expense,
            "Lazer",
            dec!(80.25),
            "Cinema",
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        ))
        .unwrap();
    store.set_budget("Lazer", dec!(300)).unwrap();
    store
        .add_recurring(RecurringInput {
            kind: TxnType::Income,
            day: 5,
            description: "Salário".into(),
            amount: dec!(5000),
            category: None,
        })
        .unwrap();
    store
}

#[test]
fn test_default_backup_name() {
    let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    assert_eq!(default_backup_name(day), "finance_backup_2024-03-09.json");
}

#[test]
fn test_render_backup_shape() {
    let store = seeded_store();
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
    let json: serde_json::Value = serde_json::from_str(&render_backup(&store, now).unwrap()).unwrap();

    assert_eq!(json["version"], "1.0");
    assert_eq!(json["exportDate"], "2024-03-10T12:00:00.000Z");
    assert_eq!(json["transactions"][0]["type"], "expense");
    assert_eq!(json["transactions"][0]["date"], "2024-03-09");
    assert_eq!(json["budgets"]["Lazer"], 300.0);
    assert!(json.get("recurringItems").is_none());
}

#[test]
fn test_backup_restores_into_fresh_store() {
    let source = seeded_store();
    let json = render_backup(&source, Utc::now()).unwrap();

    let mut target = Store::load(MemoryStore::default()).unwrap();
    let count = restore(&mut target, parse_backup(&json).unwrap()).unwrap();

    assert_eq!(count, 1);
    assert_eq!(target.transactions(), source.transactions());
    assert_eq!(target.budgets(), source.budgets());
    assert!(target.recurring_items().is_empty());
}

#[test]
fn test_parse_legacy_backup() {
    let json = r#"{
        "transactions": [
            {"id": 1709251200000.123, "type": "income", "category": "Freelance",
             "amount": 1200.5, "description": "Logo", "date": "2024-03-01"},
            {"type": "expense", "category": "Outros", "amount": "19.90",
             "description": "Presente", "date": "2024-03-02"}
        ],
        "budgets": {"Outros": 100, "Lazer": 0},
        "version": "1.0",
        "exportDate": "2024-03-10T09:30:00.000Z"
    }"#;
    let backup = parse_backup(json).unwrap();
    assert_eq!(backup.exported_on(), Some("2024-03-10"));
    assert_eq!(backup.version.as_deref(), Some("1.0"));

    let mut store = seeded_store();
    restore(&mut store, backup).unwrap();
    assert_eq!(store.transactions().len(), 2);
    assert_eq!(store.transactions()[0].amount, dec!(1200.5));
    assert_eq!(store.transactions()[1].amount, dec!(19.90));
    assert_ne!(store.transactions()[0].id, store.transactions()[1].id);
    assert_eq!(store.budgets().len(), 1);
    assert_eq!(store.recurring_items().len(), 1);
}

#[test]
fn test_restore_clamps_dates_past_month_end() {
    let json = r#"{
        "transactions": [
            {"id": 1, "type": "expense", "category": "Moradia", "amount": 1500,
             "description": "Aluguel", "date": "2024-02-31"},
            {"id": 2, "type": "expense", "category": "Moradia", "amount": 1500,
             "description": "Aluguel", "date": "2023-04-31"}
        ],
        "budgets": {}
    }"#;
    let mut store = Store::load(MemoryStore::default()).unwrap();
    assert_eq!(restore(&mut store, parse_backup(json).unwrap()).unwrap(), 2);

    let dates: Vec<String> = store.transactions().iter().map(|t| t.date.to_string()).collect();
    assert_eq!(dates, ["2024-02-29", "2023-04-30"]);
}

#[test]
fn test_restore_with_bad_date_changes_nothing() {
    let mut store = seeded_store();
    let before = store.transactions().to_vec();
    for date in ["2024-13-01", "2024-02-00", "02/03/2024", "yesterday"] {
        let json = format!(
            r#"{{"transactions": [{{"type": "income", "category": "Outros", "amount": 1,
                "description": "x", "date": "{date}"}}], "budgets": {{}}}}"#
        );
        let backup = parse_backup(&json).unwrap();
        assert!(
            matches!(restore(&mut store, backup), Err(FinanceError::Validation(_))),
            "accepted {date}"
        );
    }
    assert_eq!(store.transactions(), before.as_slice());
    assert_eq!(store.budgets().len(), 1);
}

#[test]
fn test_backup_amounts_are_exact() {
    let mut store = Store::load(MemoryStore::default()).unwrap();
    let json = r#"{"transactions": [{"id": 3, "type": "income", "category": "Outros",
        "amount": 12345678901234567.89, "description": "Herança", "date": "2024-03-01"}],
        "budgets": {}}"#;
    restore(&mut store, parse_backup(json).unwrap()).unwrap();
    assert_eq!(store.transactions()[0].amount, dec!(12345678901234567.89));

    let rendered = render_backup(&store, Utc::now()).unwrap();
    assert!(rendered.contains("12345678901234567.89"), "{rendered}");
}

#[test]
fn test_backup_without_budgets_is_rejected() {
    let store = seeded_store();
    let before = store.transactions().to_vec();

    let err = parse_backup(r#"{"transactions": []}"#).unwrap_err();
    assert!(matches!(err, FinanceError::Validation(_)));
    assert_eq!(store.transactions(), before.as_slice());
}

#[test]
fn test_non_object_backups_are_rejected() {
    for json in ["[]", "42", "null", "not json", r#"{"budgets": {}}"#] {
        assert!(
            matches!(parse_backup(json), Err(FinanceError::Validation(_))),
            "accepted {json}"
        );
    }
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("backup.json");
    let store = seeded_store();

    assert_eq!(write_backup(&path, &store).unwrap(), 1);
    let backup = read_backup(&path).unwrap();
    assert_eq!(backup.transactions.len(), 1);
    assert!(read_backup(&dir.path().join("missing.json")).is_err());
}
