mod budget;
mod ids;
mod recurring;

pub(crate) use budget::{apply_limit, evaluate};
pub(crate) use ids::{IdSequence, IdSource};
pub(crate) use recurring::{build_item, materialize, Materialized};

use chrono::Months;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;

use crate::error::{FinanceError, Result};
use crate::models::{is_valid_category, MonthKey, Transaction, TransactionInput};
use crate::ui::util::format_amount;

/// Upper bound on installments per submission.
pub(crate) const MAX_INSTALLMENTS: u32 = 360;

/// Largest amount or budget limit accepted: one trillion.
pub(crate) const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Result of adding a transaction.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Added {
    Single(Transaction),
    Installments(Vec<Transaction>),
}

impl Added {
    pub(crate) fn transactions(&self) -> &[Transaction] {
        match self {
            Self::Single(txn) => std::slice::from_ref(txn),
            Self::Installments(txns) => txns,
        }
    }
}

/// Monthly dashboard totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Summary {
    pub(crate) income: Decimal,
    pub(crate) expense: Decimal,
    pub(crate) balance: Decimal,
}

/// Amounts and limits are whole cents no larger than [`MAX_AMOUNT`].
pub(crate) fn check_amount(amount: Decimal) -> Result<()> {
    if amount.normalize().scale() > 2 {
        return Err(FinanceError::validation(format!(
            "Amount has more than two decimal places: {amount}"
        )));
    }
    if amount.abs() > MAX_AMOUNT {
        return Err(FinanceError::validation(format!(
            "Amount exceeds {}: {amount}",
            format_amount(MAX_AMOUNT)
        )));
    }
    Ok(())
}

pub(crate) fn validate_input(input: &TransactionInput) -> Result<()> {
    if input.description.trim().is_empty() {
        return Err(FinanceError::validation("Description is required"));
    }
    if input.amount < Decimal::ZERO {
        return Err(FinanceError::validation(format!(
            "Amount must not be negative: {}",
            input.amount
        )));
    }
    check_amount(input.amount)?;
    if !is_valid_category(input.kind, &input.category) {
        return Err(FinanceError::validation(format!(
            "'{}' is not an {} category",
            input.category, input.kind
        )));
    }
    if input.installments > MAX_INSTALLMENTS {
        return Err(FinanceError::validation(format!(
            "At most {MAX_INSTALLMENTS} installments are allowed"
        )));
    }
    Ok(())
}

/// Build the transaction(s) for a new submission without storing them.
pub(crate) fn build_transactions(input: &TransactionInput, ids: &mut impl IdSource) -> Result<Added> {
    validate_input(input)?;

    if input.installments <= 1 {
        return Ok(Added::Single(Transaction {
            id: ids.next_id(),
            kind: input.kind,
            category: input.category.clone(),
            amount: input.amount,
            description: input.description.trim().to_string(),
            date: input.date,
        }));
    }

    let count = input.installments;
    let part = installment_amount(input.amount, count);
    let description = input.description.trim();
    let mut txns = Vec::with_capacity(count as usize);
    for i in 0..count {
        let date = input
            .date
            .checked_add_months(Months::new(i))
            .ok_or_else(|| FinanceError::validation("Installment date out of range"))?;
        txns.push(Transaction {
            id: ids.next_id(),
            kind: input.kind,
            category: input.category.clone(),
            amount: part,
            description: format!("{description} ({}/{count})", i + 1),
            date,
        });
    }
    Ok(Added::Installments(txns))
}

/// One installment of `total` split `count` ways, rounded to cents on its own.
/// The rounding remainder is not carried into any installment.
pub(crate) fn installment_amount(total: Decimal, count: u32) -> Decimal {
    if count == 0 {
        return total;
    }
    (total / Decimal::from(count)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Transactions dated inside `month`, newest first. Same-day entries keep insertion order.
pub(crate) fn list_for_month(all: &[Transaction], month: MonthKey) -> Vec<Transaction> {
    let mut txns: Vec<Transaction> = all
        .iter()
        .filter(|t| month.contains(t.date))
        .cloned()
        .collect();
    txns.sort_by(|a, b| b.date.cmp(&a.date));
    txns
}

/// Totals saturate at `Decimal::MAX` instead of overflowing.
pub(crate) fn summarize(txns: &[Transaction]) -> Summary {
    let income = total(txns.iter().filter(|t| t.is_income()));
    let expense = total(txns.iter().filter(|t| t.is_expense()));
    Summary {
        income,
        expense,
        balance: income.saturating_sub(expense),
    }
}

fn total<'a>(txns: impl Iterator<Item = &'a Transaction>) -> Decimal {
    txns.fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.amount))
}

/// Expense totals grouped by category.
pub(crate) fn spending_by_category(txns: &[Transaction]) -> BTreeMap<String, Decimal> {
    let mut map = BTreeMap::new();
    for txn in txns.iter().filter(|t| t.is_expense()) {
        let spent = map.entry(txn.category.clone()).or_insert(Decimal::ZERO);
        *spent = spent.saturating_add(txn.amount);
    }
    map
}

/// Case-insensitive match against every visible column of a row.
pub(crate) fn search(txns: &[Transaction], term: &str) -> Vec<Transaction> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return txns.to_vec();
    }
    txns.iter()
        .filter(|t| {
            let row = format!(
                "{} {} {} {} {} {}",
                t.date,
                t.date.format("%d/%m/%Y"),
                t.kind.label(),
                t.category,
                t.description,
                format_amount(t.amount)
            );
            row.to_lowercase().contains(&term)
        })
        .cloned()
        .collect()
}
