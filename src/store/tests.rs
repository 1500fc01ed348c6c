#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;
use crate::db::{Database, MemoryStore};
use crate::error::FinanceError;
use crate::models::{Tier, TxnType};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn month(s: &str) -> MonthKey {
    s.parse().unwrap()
}

fn store() -> Store<MemoryStore> {
    Store::load(MemoryStore::default()).unwrap()
}

fn groceries(amount: rust_decimal::Decimal) -> TransactionInput {
    TransactionInput::new(
        TxnType::Expense,
        "Alimentação",
        amount,
        "Mercado",
        date("2024-03-10"),
    )
}

fn rent_item() -> RecurringInput {
    RecurringInput {
        kind: TxnType::Expense,
        day: 5,
        description: "Aluguel".into(),
        amount: dec!(1500),
        category: None,
    }
}

fn record_changes<K: KeyValueStore>(store: &mut Store<K>) -> Rc<RefCell<Vec<Change>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    store.on_change(move |change| sink.borrow_mut().push(change));
    seen
}

// ── Loading ───────────────────────────────────────────────────

#[test]
fn test_load_empty() {
    let store = store();
    assert!(store.transactions().is_empty());
    assert!(store.budgets().is_empty());
    assert!(store.recurring_items().is_empty());
}

#[test]
fn test_load_rejects_corrupt_json() {
    let kv = MemoryStore::default();
    kv.set(TRANSACTIONS_KEY, "{not json").unwrap();
    let err = Store::load(kv).err().unwrap();
    assert!(matches!(
        err,
        FinanceError::Storage(StorageError::Corrupt { ref key, .. }) if key == TRANSACTIONS_KEY
    ));
}

#[test]
fn test_load_drops_nonpositive_budgets() {
    let kv = MemoryStore::default();
    kv.set(BUDGETS_KEY, r#"{"Lazer": 0, "Moradia": 1200}"#).unwrap();
    let store = Store::load(kv).unwrap();
    assert_eq!(store.budgets().len(), 1);
    assert_eq!(store.budgets()["Moradia"], dec!(1200));
}

#[test]
fn test_ids_continue_after_stored_records() {
    let kv = MemoryStore::default();
    kv.set(
        TRANSACTIONS_KEY,
        r#"[{"id":7,"type":"income","category":"Salário","amount":10,"description":"x","date":"2024-03-01"}]"#,
    )
    .unwrap();
    kv.set(
        RECURRING_KEY,
        r#"[{"id":12,"type":"expense","day":5,"description":"Aluguel","amount":1500,"category":"Moradia"}]"#,
    )
    .unwrap();
    let mut store = Store::load(kv).unwrap();
    let added = store.add_transaction(&groceries(dec!(20))).unwrap();
    assert_eq!(added.transactions()[0].id, 13);
}

// ── Persistence ───────────────────────────────────────────────

#[test]
fn test_mutations_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fintrack.db");
    {
        let mut store = Store::load(Database::open(&path).unwrap()).unwrap();
        store.add_transaction(&groceries(dec!(42.50))).unwrap();
        store.set_budget("alimentação", dec!(800)).unwrap();
        store.add_recurring(rent_item()).unwrap();
    }

    let store = Store::load(Database::open(&path).unwrap()).unwrap();
    assert_eq!(store.transactions().len(), 1);
    assert_eq!(store.transactions()[0].amount, dec!(42.50));
    assert_eq!(store.budgets()["Alimentação"], dec!(800));
    assert_eq!(store.recurring_items().len(), 1);
    assert_eq!(store.recurring_items()[0].category, "Moradia");
}

#[test]
fn test_precise_amounts_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fintrack.db");
    Database::open(&path)
        .unwrap()
        .set(
            TRANSACTIONS_KEY,
            r#"[{"id":1,"type":"income","category":"Outros","amount":12345678901234567.89,"description":"Herança","date":"2024-03-01"}]"#,
        )
        .unwrap();
    {
        let mut store = Store::load(Database::open(&path).unwrap()).unwrap();
        assert_eq!(store.transactions()[0].amount, dec!(12345678901234567.89));
        store.add_transaction(&groceries(dec!(0.10))).unwrap();
    }

    let raw = Database::open(&path).unwrap().get(TRANSACTIONS_KEY).unwrap().unwrap();
    assert!(raw.contains("12345678901234567.89"), "{raw}");
    let store = Store::load(Database::open(&path).unwrap()).unwrap();
    assert_eq!(store.transactions()[0].amount, dec!(12345678901234567.89));
    assert_eq!(store.transactions()[1].amount, dec!(0.10));
}

#[test]
fn test_failed_validation_changes_nothing() {
    let mut store = store();
    let seen = record_changes(&mut store);
    let bad = TransactionInput::new(
        TxnType::Expense,
        "Alimentação",
        dec!(10),
        "   ",
        date("2024-03-10"),
    );
    assert!(matches!(
        store.add_transaction(&bad),
        Err(FinanceError::Validation(_))
    ));
    assert!(store.transactions().is_empty());
    assert!(seen.borrow().is_empty());
}

// ── Change listeners ──────────────────────────────────────────

#[test]
fn test_listeners_run_in_order_after_each_mutation() {
    let mut store = store();
    let order = Rc::new(RefCell::new(Vec::new()));
    for tag in ["first", "second"] {
        let sink = Rc::clone(&order);
        store.on_change(move |change| sink.borrow_mut().push((tag, change)));
    }

    store.add_transaction(&groceries(dec!(10))).unwrap();
    store.set_budget("Lazer", dec!(200)).unwrap();

    assert_eq!(
        *order.borrow(),
        vec![
            ("first", Change::Transactions),
            ("second", Change::Transactions),
            ("first", Change::Budgets),
            ("second", Change::Budgets),
        ]
    );
}

// ── Transactions ──────────────────────────────────────────────

#[test]
fn test_installments_are_stored_individually() {
    let mut store = store();
    store
        .add_transaction(&groceries(dec!(300)).with_installments(3))
        .unwrap();
    assert_eq!(store.transactions().len(), 3);
    assert_eq!(store.list_for_month(month("2024-04")).len(), 1);
    assert_eq!(
        store.list_for_month(month("2024-05"))[0].description,
        "Mercado (3/3)"
    );
}

#[test]
fn test_edit_replaces_record_in_place() {
    let mut store = store();
    let id = store.add_transaction(&groceries(dec!(10))).unwrap().transactions()[0].id;
    let replacement = TransactionInput::new(
        TxnType::Income,
        "Freelance",
        dec!(900),
        " Site ",
        date("2024-03-12"),
    )
    .with_installments(4);

    let updated = store.edit_transaction(id, &replacement).unwrap();
    assert_eq!(updated.id, id);
    assert_eq!(updated.description, "Site");
    assert_eq!(store.transactions().len(), 1);
    assert_eq!(store.transaction(id), Some(&updated));
}

#[test]
fn test_edit_and_delete_unknown_id() {
    let mut store = store();
    store.add_transaction(&groceries(dec!(10))).unwrap();
    assert!(matches!(
        store.edit_transaction(999, &groceries(dec!(1))),
        Err(FinanceError::NotFound(999))
    ));
    assert!(matches!(
        store.delete_transaction(999),
        Err(FinanceError::NotFound(999))
    ));
    assert_eq!(store.transactions().len(), 1);
}

#[test]
fn test_delete_transaction() {
    let mut store = store();
    let added = store
        .add_transaction(&groceries(dec!(90)).with_installments(3))
        .unwrap();
    let middle = added.transactions()[1].id;
    assert_eq!(store.delete_transaction(middle).unwrap(), 1);
    assert_eq!(store.transactions().len(), 2);
    assert!(store.transaction(middle).is_none());
}

// ── Views ─────────────────────────────────────────────────────

#[test]
fn test_summary_and_budget_status_follow_month() {
    let mut store = store();
    store
        .add_transaction(&TransactionInput::new(
            TxnType::Income,
            "Salário",
            dec!(5000),
            "Salário",
            date("2024-03-01"),
        ))
        .unwrap();
    store.add_transaction(&groceries(dec!(760))).unwrap();
    store.set_budget("Alimentação", dec!(800)).unwrap();

    assert_eq!(store.spending(month("2024-03"))["Alimentação"], dec!(760));
    assert!(store.spending(month("2024-04")).is_empty());

    let summary = store.summary(month("2024-03"));
    assert_eq!(summary.income, dec!(5000));
    assert_eq!(summary.expense, dec!(760));
    assert_eq!(summary.balance, dec!(4240));

    let status = store.budget_status(month("2024-03"));
    assert_eq!(status.len(), 1);
    assert_eq!(status[0].tier, Tier::Critical);

    let april = store.budget_status(month("2024-04"));
    assert_eq!(april[0].spent, dec!(0));
    assert_eq!(april[0].tier, Tier::Ok);
    assert_eq!(store.summary(month("2024-04")), Summary::default());
}

#[test]
fn test_clearing_budget() {
    let mut store = store();
    store.set_budget("Lazer", dec!(300)).unwrap();
    store.set_budget("lazer", dec!(0)).unwrap();
    assert!(store.budgets().is_empty());
    assert!(store.set_budget("Salário", dec!(10)).is_err());
}

#[test]
fn test_sub_cent_budget_limit_is_rejected() {
    let mut store = store();
    let seen = record_changes(&mut store);
    assert!(matches!(
        store.set_budget("Lazer", dec!(0.0000000000000000000000000001)),
        Err(FinanceError::Validation(_))
    ));
    assert!(store.budgets().is_empty());
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_extreme_stored_amounts_do_not_overflow_reads() {
    let kv = MemoryStore::default();
    let max = rust_decimal::Decimal::MAX;
    kv.set(
        TRANSACTIONS_KEY,
        &format!(
            r#"[{{"id":1,"type":"expense","category":"Lazer","amount":"{max}","description":"a","date":"2024-03-01"}},
                {{"id":2,"type":"expense","category":"Lazer","amount":"{max}","description":"b","date":"2024-03-02"}}]"#
        ),
    )
    .unwrap();
    kv.set(BUDGETS_KEY, r#"{"Lazer": 100}"#).unwrap();
    let store = Store::load(kv).unwrap();

    let march = month("2024-03");
    assert_eq!(store.summary(march).expense, max);
    assert_eq!(store.spending(march)["Lazer"], max);
    let status = store.budget_status(march);
    assert_eq!(status[0].percentage, dec!(100));
    assert_eq!(status[0].tier, Tier::Critical);
}

// ── Fixed entries ─────────────────────────────────────────────

#[test]
fn test_apply_recurring_twice_adds_nothing_new() {
    let mut store = store();
    store.add_recurring(rent_item()).unwrap();
    let seen = record_changes(&mut store);

    let first = store.apply_recurring(month("2024-03")).unwrap();
    assert_eq!(first.added, 1);
    assert_eq!(first.transactions[0].date, date("2024-03-05"));

    let second = store.apply_recurring(month("2024-03")).unwrap();
    assert_eq!(second.added, 0);
    assert_eq!(store.transactions().len(), 1);
    assert_eq!(*seen.borrow(), vec![Change::Transactions]);
}

#[test]
fn test_delete_recurring_keeps_posted_transactions() {
    let mut store = store();
    let item = store.add_recurring(rent_item()).unwrap();
    store.apply_recurring(month("2024-03")).unwrap();

    let removed = store.delete_recurring(item.id).unwrap();
    assert_eq!(removed.description, "Aluguel");
    assert!(store.recurring_items().is_empty());
    assert_eq!(store.transactions().len(), 1);
    assert!(matches!(
        store.delete_recurring(item.id),
        Err(FinanceError::NotFound(_))
    ));
}

// ── Bulk ──────────────────────────────────────────────────────

#[test]
fn test_replace_all_keeps_recurring_and_dedups_ids() {
    let mut store = store();
    store.add_transaction(&groceries(dec!(10))).unwrap();
    store.add_recurring(rent_item()).unwrap();

    let incoming = |desc: &str| Transaction {
        id: 0,
        kind: TxnType::Expense,
        category: "Lazer".into(),
        amount: dec!(50),
        description: desc.into(),
        date: date("2024-02-02"),
    };
    let mut budgets = Budgets::new();
    budgets.insert("Lazer".into(), dec!(400));
    budgets.insert("Outros".into(), dec!(-1));

    store
        .replace_all(
            vec![
                (Some(50), incoming("a")),
                (Some(50), incoming("b")),
                (None, incoming("c")),
            ],
            budgets,
        )
        .unwrap();

    let ids: Vec<u64> = store.transactions().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![50, 51, 52]);
    assert_eq!(store.budgets().len(), 1);
    assert_eq!(store.recurring_items().len(), 1);
}

#[test]
fn test_wipe_clears_memory_and_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fintrack.db");
    {
        let mut store = Store::load(Database::open(&path).unwrap()).unwrap();
        store.add_transaction(&groceries(dec!(10))).unwrap();
        store.set_budget("Lazer", dec!(100)).unwrap();
        store.add_recurring(rent_item()).unwrap();
        let seen = record_changes(&mut store);

        store.wipe().unwrap();
        assert!(store.transactions().is_empty());
        assert!(store.budgets().is_empty());
        assert!(store.recurring_items().is_empty());
        assert_eq!(*seen.borrow(), vec![Change::Wiped]);
    }

    let reopened = Store::load(Database::open(&path).unwrap()).unwrap();
    assert!(reopened.transactions().is_empty());
    assert!(reopened.recurring_items().is_empty());
}
