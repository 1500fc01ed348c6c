use anyhow::Context;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::db::KeyValueStore;
use crate::error::{FinanceError, Result, StorageError};
use crate::models::{Budgets, MonthKey, Transaction, TxnType};
use crate::store::Store;

const BACKUP_VERSION: &str = "1.0";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BackupOut<'a> {
    transactions: &'a [Transaction],
    budgets: &'a Budgets,
    version: &'static str,
    export_date: String,
}

/// A parsed backup file, not yet applied.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Backup {
    pub(crate) transactions: Vec<BackupTransaction>,
    pub(crate) budgets: Budgets,
    #[serde(default)]
    pub(crate) version: Option<String>,
    #[serde(default)]
    pub(crate) export_date: Option<String>,
}

impl Backup {
    /// Calendar date part of `exportDate`, for confirmation prompts.
    pub(crate) fn exported_on(&self) -> Option<&str> {
        self.export_date.as_deref().and_then(|d| d.get(..10))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BackupTransaction {
    /// Older files carry fractional ids; those are replaced on restore.
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(rename = "type")]
    kind: TxnType,
    category: String,
    amount: Decimal,
    description: String,
    /// Kept as text: fixed entries may carry days past the month's end.
    date: String,
}

pub(crate) fn default_backup_name(today: NaiveDate) -> String {
    format!("finance_backup_{}.json", today.format("%Y-%m-%d"))
}

pub(crate) fn render_backup<K: KeyValueStore>(store: &Store<K>, now: DateTime<Utc>) -> Result<String> {
    let out = BackupOut {
        transactions: store.transactions(),
        budgets: store.budgets(),
        version: BACKUP_VERSION,
        export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    serde_json::to_string_pretty(&out).map_err(|source| {
        FinanceError::from(StorageError::Encode {
            key: "backup".into(),
            source,
        })
    })
}

/// Reject anything that is not an object carrying both `transactions` and `budgets`.
pub(crate) fn parse_backup(json: &str) -> Result<Backup> {
    serde_json::from_str(json).map_err(|e| {
        tracing::warn!(error = %e, "backup rejected");
        FinanceError::validation(format!("Invalid backup file: {e}"))
    })
}

/// `YYYY-MM-DD`. A day past the end of its month is clamped to the last day,
/// so `2024-02-31` becomes `2024-02-29`.
fn restore_date(raw: &str) -> Result<NaiveDate> {
    let invalid = || FinanceError::validation(format!("Invalid backup file: bad date '{raw}'"));
    let mut parts = raw.trim().splitn(3, '-');
    let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let day: u32 = day.parse().map_err(|_| invalid())?;
    if !(1..=31).contains(&day) {
        return Err(invalid());
    }
    let month = MonthKey::new(year, month).ok_or_else(invalid)?;
    Ok(month.day(day))
}

/// Replace transactions and budgets with the backup's. Fixed entries stay.
/// Every row is checked before anything is replaced.
pub(crate) fn restore<K: KeyValueStore>(store: &mut Store<K>, backup: Backup) -> Result<usize> {
    let transactions = backup
        .transactions
        .into_iter()
        .map(|b| -> Result<(Option<u64>, Transaction)> {
            let id = b.id.as_ref().and_then(serde_json::Value::as_u64);
            let txn = Transaction {
                id: 0,
                kind: b.kind,
                category: b.category,
                amount: b.amount,
                description: b.description,
                date: restore_date(&b.date)?,
            };
            Ok((id, txn))
        })
        .collect::<Result<Vec<_>>>()?;
    let count = transactions.len();
    store.replace_all(transactions, backup.budgets)?;
    Ok(count)
}

pub(crate) fn write_backup<K: KeyValueStore>(path: &Path, store: &Store<K>) -> anyhow::Result<usize> {
    let json = render_backup(store, Utc::now())?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "backup written");
    Ok(store.transactions().len())
}

pub(crate) fn read_backup(path: &Path) -> anyhow::Result<Backup> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parse_backup(&json)?)
}

#[cfg(test)]
#[path = "backup_tests.rs"]
mod tests;
