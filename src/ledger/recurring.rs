use rust_decimal::Decimal;

use super::IdSource;
use crate::error::{FinanceError, Result};
use crate::models::{
    default_category, find_category, MonthKey, RecurringInput, RecurringItem, Transaction,
};

/// Outcome of posting fixed entries into a month.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Materialized {
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) added: usize,
}

/// Project each fixed entry onto `month`, skipping entries already posted.
///
/// An entry counts as posted when a transaction with the same date,
/// description and amount exists, either in `existing` or earlier in this
/// run. Type and category do not take part in the match. A day past the end
/// of the month lands on the month's last day.
pub(crate) fn materialize(
    items: &[RecurringItem],
    existing: &[Transaction],
    month: MonthKey,
    ids: &mut impl IdSource,
) -> Materialized {
    let mut out = Materialized::default();

    for item in items {
        let date = month.day(u32::from(item.day));
        let already_posted = existing
            .iter()
            .chain(out.transactions.iter())
            .any(|t| t.date == date && t.description == item.description && t.amount == item.amount);
        if already_posted {
            tracing::debug!(item = item.id, %date, "fixed entry already posted");
            continue;
        }

        out.transactions.push(Transaction {
            id: ids.next_id(),
            kind: item.kind,
            category: item.category.clone(),
            amount: item.amount,
            description: item.description.clone(),
            date,
        });
    }

    out.added = out.transactions.len();
    out
}

pub(crate) fn build_item(input: RecurringInput, ids: &mut impl IdSource) -> Result<RecurringItem> {
    let description = input.description.trim();
    if description.is_empty() {
        return Err(FinanceError::validation("Description is required"));
    }
    if input.amount <= Decimal::ZERO {
        return Err(FinanceError::validation("Amount must be greater than zero"));
    }
    super::check_amount(input.amount)?;
    if !(1..=31).contains(&input.day) {
        return Err(FinanceError::validation(format!(
            "Day must be between 1 and 31, got {}",
            input.day
        )));
    }

    let category = match input.category.as_deref() {
        Some(name) => find_category(input.kind, name).ok_or_else(|| {
            FinanceError::validation(format!("'{name}' is not an {} category", input.kind))
        })?,
        None => default_category(input.kind),
    };

    Ok(RecurringItem {
        id: ids.next_id(),
        kind: input.kind,
        day: input.day,
        description: description.to_string(),
        amount: input.amount,
        category: category.to_string(),
    })
}
