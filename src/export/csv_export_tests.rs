#![allow(clippy::unwrap_used)]

use super::*;
use chrono::NaiveDate;
use rust_decimal_macros::dec;

use crate::models::TxnType;

fn sample() -> Vec<Transaction> {
    vec![
        Transaction {
            id: 2,
            kind: TxnType::Expense,
            category: "Moradia".into(),
            amount: dec!(1500),
            description: "Aluguel".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        },
        Transaction {
            id: 1,
            kind: TxnType::Income,
            category: "Salário".into(),
            amount: dec!(4250.5),
            description: "Salário; março".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        },
    ]
}

#[test]
fn test_default_csv_name() {
    let month: MonthKey = "2024-03".parse().unwrap();
    assert_eq!(default_csv_name(month), "financas_2024-03.csv");
}

#[test]
fn test_write_rows_layout() {
    let mut buf = Vec::new();
    let count = write_rows(&mut buf, &sample()).unwrap();
    assert_eq!(count, 2);

    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Data;Tipo;Categoria;Descricao;Valor");
    assert_eq!(lines[1], "2024-03-05;Despesa;Moradia;Aluguel;1500,00");
    // A delimiter inside a field gets quoted.
    assert_eq!(lines[2], "2024-03-01;Receita;Salário;\"Salário; março\";4250,50");
}

#[test]
fn test_export_month_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    assert_eq!(export_month(&path, &sample()).unwrap(), 2);
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn test_export_empty_month_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    assert_eq!(export_month(&path, &[]).unwrap(), 0);
    assert!(!path.exists());
}
