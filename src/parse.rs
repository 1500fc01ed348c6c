use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{FinanceError, Result};
use crate::ledger;
use crate::models::{categories_for, find_category, RecurringInput, TransactionInput, TxnType};

/// Parse a user-typed amount. Accepts `100`, `100.5`, `100,50`, `1.234,56`
/// and an optional `R$` prefix. At most two decimal places.
pub(crate) fn parse_amount(s: &str) -> Result<Decimal> {
    let trimmed = s.trim();
    let cleaned = trimmed.trim_start_matches("R$").trim();
    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.to_string()
    };
    let amount = Decimal::from_str(&normalized)
        .map_err(|_| FinanceError::validation(format!("Invalid amount: {trimmed}")))?;
    ledger::check_amount(amount)?;
    Ok(amount)
}

/// `YYYY-MM-DD`, `DD/MM/YYYY` or `today`.
pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("today") || s.eq_ignore_ascii_case("hoje") {
        return Ok(Local::now().date_naive());
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(FinanceError::validation(format!(
        "Invalid date '{s}'. Use YYYY-MM-DD"
    )))
}

pub(crate) fn parse_kind(s: &str) -> Result<TxnType> {
    TxnType::parse(s.trim()).ok_or_else(|| {
        FinanceError::validation(format!("Invalid type '{s}'. Use income or expense"))
    })
}

pub(crate) fn parse_id(s: &str) -> Result<u64> {
    s.trim()
        .trim_start_matches('#')
        .parse()
        .map_err(|_| FinanceError::validation(format!("Invalid id: {s}")))
}

/// Canonical category for `kind`, or a validation error listing the valid ones.
pub(crate) fn parse_category(kind: TxnType, s: &str) -> Result<&'static str> {
    find_category(kind, s).ok_or_else(|| {
        FinanceError::validation(format!(
            "'{s}' is not an {kind} category. Choose one of: {}",
            categories_for(kind).join(", ")
        ))
    })
}

/// `x3` or `3x`.
fn parse_installments(token: &str) -> Option<u32> {
    let lower = token.to_lowercase();
    let digits = lower
        .strip_prefix('x')
        .or_else(|| lower.strip_suffix('x'))?;
    digits.parse().ok()
}

/// `<type> <category> <amount> <date> <description...> [xN]`
pub(crate) fn parse_transaction_args(args: &[&str]) -> Result<TransactionInput> {
    let (input, rest) = parse_fields(
        args,
        "Usage: <income|expense> <category> <amount> <YYYY-MM-DD> <description> [xN]",
    )?;
    match rest.split_last() {
        Some((last, head)) if !head.is_empty() => match parse_installments(last) {
            Some(n) => Ok(TransactionInput {
                description: head.join(" "),
                ..input
            }
            .with_installments(n)),
            None => Ok(input),
        },
        _ => Ok(input),
    }
}

/// `<type> <category> <amount> <date> <description...>`
///
/// Edits never split, so every word after the date is kept in the
/// description, including a trailing `2x`.
pub(crate) fn parse_edit_args(args: &[&str]) -> Result<TransactionInput> {
    parse_fields(
        args,
        "Usage: <income|expense> <category> <amount> <YYYY-MM-DD> <description>",
    )
    .map(|(input, _)| input)
}

/// The four leading fields plus the description words that follow them.
fn parse_fields<'a, 'b>(args: &'a [&'b str], usage: &str) -> Result<(TransactionInput, &'a [&'b str])> {
    let [kind, category, amount, date, rest @ ..] = args else {
        return Err(FinanceError::validation(usage));
    };

    let kind = parse_kind(kind)?;
    let category = parse_category(kind, category)?;
    let amount = parse_amount(amount)?;
    let date = parse_date(date)?;

    Ok((TransactionInput::new(kind, category, amount, rest.join(" "), date), rest))
}

/// `<type> <day> <amount> [category] <description...>`
///
/// The token after the amount is taken as the category only when it names one
/// and more words follow it.
pub(crate) fn parse_recurring_args(args: &[&str]) -> Result<RecurringInput> {
    let [kind, day, amount, rest @ ..] = args else {
        return Err(FinanceError::validation(
            "Usage: <income|expense> <day> <amount> [category] <description>",
        ));
    };

    let kind = parse_kind(kind)?;
    let day: u8 = day
        .trim()
        .parse()
        .map_err(|_| FinanceError::validation(format!("Invalid day: {day}")))?;
    let amount = parse_amount(amount)?;

    let (category, words) = match rest {
        [first, tail @ ..] if !tail.is_empty() => match find_category(kind, first) {
            Some(name) => (Some(name.to_string()), tail),
            None => (None, rest),
        },
        _ => (None, rest),
    };

    Ok(RecurringInput {
        kind,
        day,
        description: words.join(" "),
        amount,
        category,
    })
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
