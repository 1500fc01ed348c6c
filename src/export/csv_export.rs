use anyhow::{Context, Result};
use std::io;
use std::path::Path;

use crate::models::{MonthKey, Transaction};
use crate::ui::util::decimal_comma;

const HEADER: [&str; 5] = ["Data", "Tipo", "Categoria", "Descricao", "Valor"];

pub(crate) fn default_csv_name(month: MonthKey) -> String {
    format!("financas_{month}.csv")
}

/// Write `txns` as semicolon-separated rows with a header. Returns the row count.
pub(crate) fn write_rows<W: io::Write>(writer: W, txns: &[Transaction]) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(writer);

    wtr.write_record(HEADER)?;
    for t in txns {
        wtr.write_record([
            t.date.format("%Y-%m-%d").to_string(),
            t.kind.label().to_string(),
            t.category.clone(),
            t.description.clone(),
            decimal_comma(t.amount),
        ])?;
    }
    wtr.flush().context("Failed to flush CSV output")?;
    Ok(txns.len())
}

/// Export one month's transactions to `path`. Nothing is written for an empty month.
pub(crate) fn export_month(path: &Path, txns: &[Transaction]) -> Result<usize> {
    if txns.is_empty() {
        return Ok(0);
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let count = write_rows(file, txns)?;
    tracing::info!(path = %path.display(), count, "month exported");
    Ok(count)
}

#[cfg(test)]
#[path = "csv_export_tests.rs"]
mod tests;
