#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// ── TxnType ───────────────────────────────────────────────────

#[test]
fn test_txn_type_parse() {
    assert_eq!(TxnType::parse("income"), Some(TxnType::Income));
    assert_eq!(TxnType::parse("EXPENSE"), Some(TxnType::Expense));
    assert_eq!(TxnType::parse("receita"), Some(TxnType::Income));
    assert_eq!(TxnType::parse("despesa"), Some(TxnType::Expense));
    assert_eq!(TxnType::parse("transfer"), None);
}

#[test]
fn test_txn_type_labels() {
    assert_eq!(TxnType::Income.label(), "Receita");
    assert_eq!(TxnType::Expense.label(), "Despesa");
    assert_eq!(format!("{}", TxnType::Expense), "expense");
}

#[test]
fn test_transaction_json_shape() {
    let txn = Transaction {
        id: 7,
        kind: TxnType::Expense,
        category: "Transporte".into(),
        amount: dec!(25.5),
        description: "Bus".into(),
        date: date("2024-05-10"),
    };
    let json = serde_json::to_value(&txn).unwrap();
    assert_eq!(json["type"], "expense");
    assert_eq!(json["date"], "2024-05-10");
    assert_eq!(json["amount"].as_f64(), Some(25.5));

    let back: Transaction = serde_json::from_value(json).unwrap();
    assert_eq!(back, txn);
}

#[test]
fn test_transaction_accepts_integer_amount() {
    let txn: Transaction = serde_json::from_str(
        r#"{"id":1,"type":"income","category":"Salário","amount":3000,"description":"Pay","date":"2024-01-05"}"#,
    )
    .unwrap();
    assert_eq!(txn.amount, dec!(3000));
    assert!(txn.is_income());
    assert!(!txn.is_expense());
}

// ── Categories ────────────────────────────────────────────────

#[test]
fn test_category_sets() {
    assert!(is_valid_category(TxnType::Expense, "Transporte"));
    assert!(!is_valid_category(TxnType::Income, "Transporte"));
    assert!(is_valid_category(TxnType::Income, "Salário"));
    assert!(is_valid_category(TxnType::Income, "Outros"));
    assert!(is_valid_category(TxnType::Expense, "Outros"));
    assert_eq!(categories_for(TxnType::Expense).len(), 7);
    assert_eq!(categories_for(TxnType::Income).len(), 5);
}

#[test]
fn test_find_category_case_insensitive() {
    assert_eq!(find_category(TxnType::Expense, "moradia"), Some("Moradia"));
    assert_eq!(find_category(TxnType::Expense, " SAÚDE "), Some("Saúde"));
    assert_eq!(find_category(TxnType::Income, "moradia"), None);
}

#[test]
fn test_find_category_ignores_accents() {
    assert_eq!(find_category(TxnType::Expense, "saude"), Some("Saúde"));
    assert_eq!(find_category(TxnType::Expense, "alimentacao"), Some("Alimentação"));
    assert_eq!(find_category(TxnType::Income, "salario"), Some("Salário"));
    assert!(!is_valid_category(TxnType::Income, "salario"));
}

#[test]
fn test_default_category() {
    assert_eq!(default_category(TxnType::Income), "Salário");
    assert_eq!(default_category(TxnType::Expense), "Moradia");
}

// ── MonthKey ──────────────────────────────────────────────────

#[test]
fn test_month_parse_and_display() {
    let m: MonthKey = "2024-03".parse().unwrap();
    assert_eq!(m.year(), 2024);
    assert_eq!(m.month(), 3);
    assert_eq!(m.to_string(), "2024-03");

    let short: MonthKey = "2024-3".parse().unwrap();
    assert_eq!(short, m);
}

#[test]
fn test_month_parse_invalid() {
    assert!("2024-13".parse::<MonthKey>().is_err());
    assert!("2024".parse::<MonthKey>().is_err());
    assert!("24-03".parse::<MonthKey>().is_err());
    assert!("march".parse::<MonthKey>().is_err());
    assert!("".parse::<MonthKey>().is_err());
}

#[test]
fn test_month_parse_error_is_validation() {
    let err: crate::error::FinanceError = "2024-13".parse::<MonthKey>().unwrap_err();
    assert!(matches!(err, crate::error::FinanceError::Validation(_)));
    assert!(err.to_string().contains("2024-13"));
}

#[test]
fn test_month_contains() {
    let m: MonthKey = "2024-03".parse().unwrap();
    assert!(m.contains(date("2024-03-01")));
    assert!(m.contains(date("2024-03-31")));
    assert!(!m.contains(date("2024-04-01")));
    assert!(!m.contains(date("2023-03-15")));
}

#[test]
fn test_month_navigation_wraps_years() {
    let dec_2023: MonthKey = "2023-12".parse().unwrap();
    assert_eq!(dec_2023.next().to_string(), "2024-01");
    assert_eq!(dec_2023.next().prev(), dec_2023);
}

#[test]
fn test_month_day_clamps() {
    let april: MonthKey = "2024-04".parse().unwrap();
    assert_eq!(april.day(31), date("2024-04-30"));
    assert_eq!(april.day(5), date("2024-04-05"));

    let feb_leap: MonthKey = "2024-02".parse().unwrap();
    assert_eq!(feb_leap.day(30), date("2024-02-29"));
    let feb: MonthKey = "2023-02".parse().unwrap();
    assert_eq!(feb.last_day(), date("2023-02-28"));
}

// ── Budgets ───────────────────────────────────────────────────

#[test]
fn test_budget_status_over() {
    let status = BudgetStatus {
        category: "Lazer".into(),
        spent: dec!(150),
        limit: dec!(100),
        percentage: dec!(100),
        tier: Tier::Critical,
    };
    assert!(status.is_over());
    assert_eq!(status.tier.to_string(), "critical");
}
