use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::db::Database;
use crate::export;
use crate::ledger::Added;
use crate::models::{categories_for, MonthKey, Tier, TxnType};
use crate::parse;
use crate::store::Store;
use crate::ui::util::format_amount;

pub(crate) fn as_cli(args: &[String], store: &mut Store<Database>) -> Result<()> {
    let rest = &args[2..];
    match args[1].as_str() {
        "add" | "a" => cli_add(rest, store),
        "edit" => cli_edit(rest, store),
        "delete" | "rm" => cli_delete(rest, store),
        "list" | "ls" => cli_list(rest, store),
        "summary" | "s" => cli_summary(rest, store),
        "budget" => cli_budget(rest, store),
        "budgets" => cli_budgets(rest, store),
        "recurring" | "fixed" => cli_recurring(rest, store),
        "export" => cli_export(rest, store),
        "backup" => cli_backup(rest, store),
        "restore" => cli_restore(rest, store),
        "wipe" => cli_wipe(rest, store),
        "categories" => {
            cli_categories();
            Ok(())
        }
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("fintrack {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("fintrack: local-only personal finance tracker");
    println!();
    println!("Usage: fintrack [command]");
    println!();
    println!("Commands:");
    println!("  (none)                              Launch interactive TUI");
    println!("  add <type> <category> <amount> <date> <description> [xN]");
    println!("                                      Add a transaction, optionally in N installments");
    println!("  edit <id> <type> <category> <amount> <date> <description>");
    println!("                                      Replace a transaction");
    println!("  delete <id> [--yes]                 Delete a transaction");
    println!("  list [YYYY-MM]                      List a month's transactions");
    println!("  summary [YYYY-MM]                   Totals, spending and budgets for a month");
    println!("  budget <category> <amount>          Set a monthly limit (0 clears it)");
    println!("  budgets [YYYY-MM]                   Show budget usage");
    println!("  recurring add <type> <day> <amount> [category] <description>");
    println!("  recurring list                      List fixed entries");
    println!("  recurring delete <id>               Delete a fixed entry");
    println!("  recurring apply [YYYY-MM] [--yes]   Post fixed entries into a month");
    println!("  export [path] [--month YYYY-MM]     Export a month to CSV");
    println!("  backup [path]                       Write a JSON backup");
    println!("  restore <file> [--yes]              Replace transactions and budgets from a backup");
    println!("  wipe [--yes]                        Erase all data");
    println!("  categories                          List categories");
    println!("  --help, -h                          Show this help");
    println!("  --version, -V                       Show version");
    println!();
    println!("Types: income, expense. Dates: YYYY-MM-DD, DD/MM/YYYY or today.");
}

// ── Argument helpers ──────────────────────────────────────────

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// Arguments that are neither flags nor a flag's value.
fn positional(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
        } else if arg == "--month" {
            skip_next = true;
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

fn month_arg(arg: Option<&str>) -> Result<MonthKey> {
    match arg {
        Some(m) => Ok(m.parse()?),
        None => Ok(MonthKey::current()),
    }
}

fn confirm(question: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "s" | "sim"
    ))
}

fn signed(kind: TxnType, amount: rust_decimal::Decimal) -> String {
    match kind {
        TxnType::Income => format!("+{}", format_amount(amount)),
        TxnType::Expense => format!("-{}", format_amount(amount)),
    }
}

// ── Transactions ──────────────────────────────────────────────

fn cli_add(args: &[String], store: &mut Store<Database>) -> Result<()> {
    let input = parse::parse_transaction_args(&positional(args))?;
    match store.add_transaction(&input)? {
        Added::Single(txn) => println!(
            "Added #{}: {} {} ({}) on {}",
            txn.id,
            txn.description,
            signed(txn.kind, txn.amount),
            txn.category,
            txn.date
        ),
        Added::Installments(txns) => {
            println!(
                "Added {} installments of {}",
                txns.len(),
                format_amount(txns.first().map(|t| t.amount).unwrap_or_default())
            );
            for txn in &txns {
                println!("  #{:<6} {}  {}", txn.id, txn.date, txn.description);
            }
        }
    }
    Ok(())
}

fn cli_edit(args: &[String], store: &mut Store<Database>) -> Result<()> {
    let words = positional(args);
    let Some((id, rest)) = words.split_first() else {
        anyhow::bail!("Usage: fintrack edit <id> <type> <category> <amount> <date> <description>");
    };
    let id = parse::parse_id(id)?;
    let input = parse::parse_edit_args(rest)?;
    let txn = store.edit_transaction(id, &input)?;
    println!(
        "Updated #{}: {} {} ({}) on {}",
        txn.id,
        txn.description,
        signed(txn.kind, txn.amount),
        txn.category,
        txn.date
    );
    Ok(())
}

fn cli_delete(args: &[String], store: &mut Store<Database>) -> Result<()> {
    let Some(id) = positional(args).first().copied() else {
        anyhow::bail!("Usage: fintrack delete <id> [--yes]");
    };
    let id = parse::parse_id(id)?;
    let description = store
        .transaction(id)
        .map(|t| t.description.clone())
        .ok_or(crate::error::FinanceError::NotFound(id))?;

    if !confirm(&format!("Delete '{description}'?"), has_flag(args, "--yes"))? {
        println!("Cancelled");
        return Ok(());
    }
    store.delete_transaction(id)?;
    println!("Deleted '{description}'");
    Ok(())
}

fn cli_list(args: &[String], store: &mut Store<Database>) -> Result<()> {
    let month = month_arg(positional(args).first().copied())?;
    let txns = store.list_for_month(month);
    if txns.is_empty() {
        println!("No transactions for {month}");
        return Ok(());
    }

    println!(
        "{:<6} {:<10} {:<8} {:<14} {:<30} {:>16}",
        "ID", "Date", "Type", "Category", "Description", "Amount"
    );
    println!("{}", "─".repeat(89));
    for t in &txns {
        println!(
            "{:<6} {:<10} {:<8} {:<14} {:<30} {:>16}",
            t.id,
            t.date.format("%d/%m/%Y"),
            t.kind.label(),
            t.category,
            crate::ui::util::truncate(&t.description, 30),
            signed(t.kind, t.amount),
        );
    }
    Ok(())
}

fn cli_summary(args: &[String], store: &mut Store<Database>) -> Result<()> {
    let month = month_arg(positional(args).first().copied())?;
    let summary = store.summary(month);
    let spending = store.spending(month);

    println!("fintrack: {month}");
    println!("{}", "─".repeat(40));
    println!("  Income:    {:>16}", format_amount(summary.income));
    println!("  Expenses:  {:>16}", format_amount(summary.expense));
    println!("  Balance:   {:>16}", format_amount(summary.balance));

    if !spending.is_empty() {
        println!();
        println!("Spending by Category:");
        for (name, amount) in &spending {
            println!("  {name:<24} {:>16}", format_amount(*amount));
        }
    }

    print_budget_table(store, month);

    if !store.recurring_items().is_empty() {
        println!();
        println!(
            "{} fixed entries on file. Post them with: fintrack recurring apply {month}",
            store.recurring_items().len()
        );
    }
    Ok(())
}

// ── Budgets ───────────────────────────────────────────────────

fn cli_budget(args: &[String], store: &mut Store<Database>) -> Result<()> {
    let words = positional(args);
    let [category, amount] = words.as_slice() else {
        anyhow::bail!("Usage: fintrack budget <category> <amount>");
    };
    let limit = parse::parse_amount(amount)?;
    let name = store.set_budget(category, limit)?;
    if store.budgets().contains_key(name) {
        println!("Budget for {name} set to {}", format_amount(limit));
    } else {
        println!("Budget for {name} cleared");
    }
    Ok(())
}

fn cli_budgets(args: &[String], store: &mut Store<Database>) -> Result<()> {
    let month = month_arg(positional(args).first().copied())?;
    if store.budgets().is_empty() {
        println!("No budgets. Set one with: fintrack budget <category> <amount>");
        return Ok(());
    }
    print_budget_table(store, month);
    Ok(())
}

fn print_budget_table(store: &Store<Database>, month: MonthKey) {
    let statuses = store.budget_status(month);
    if statuses.is_empty() {
        return;
    }
    println!();
    println!("Budgets for {month}:");
    for status in &statuses {
        let marker = match status.tier {
            Tier::Ok => "",
            Tier::Warning => "  !",
            Tier::Critical if status.is_over() => "  !! over",
            Tier::Critical => "  !!",
        };
        println!(
            "  {:<14} {:>14} / {:<14} {:>5.1}%{marker}",
            status.category,
            format_amount(status.spent),
            format_amount(status.limit),
            status.percentage,
        );
    }
}

// ── Fixed entries ─────────────────────────────────────────────

fn cli_recurring(args: &[String], store: &mut Store<Database>) -> Result<()> {
    let sub = args.first().map(String::as_str).unwrap_or("list");
    let rest = args.get(1..).unwrap_or_default();
    match sub {
        "add" => {
            let input = parse::parse_recurring_args(&positional(rest))?;
            let item = store.add_recurring(input)?;
            println!(
                "Added fixed entry #{}: day {} {} {} ({})",
                item.id,
                item.day,
                item.description,
                signed(item.kind, item.amount),
                item.category
            );
            Ok(())
        }
        "list" | "ls" => {
            let items = store.recurring_items();
            if items.is_empty() {
                println!("No fixed entries");
                return Ok(());
            }
            println!(
                "{:<6} {:<4} {:<8} {:<14} {:<30} {:>16}",
                "ID", "Day", "Type", "Category", "Description", "Amount"
            );
            println!("{}", "─".repeat(83));
            for item in items {
                println!(
                    "{:<6} {:<4} {:<8} {:<14} {:<30} {:>16}",
                    item.id,
                    item.day,
                    item.kind.label(),
                    item.category,
                    crate::ui::util::truncate(&item.description, 30),
                    signed(item.kind, item.amount),
                );
            }
            Ok(())
        }
        "delete" | "rm" => {
            let Some(id) = positional(rest).first().copied() else {
                anyhow::bail!("Usage: fintrack recurring delete <id>");
            };
            let item = store.delete_recurring(parse::parse_id(id)?)?;
            println!("Deleted fixed entry '{}'", item.description);
            Ok(())
        }
        "apply" => {
            let month = month_arg(positional(rest).first().copied())?;
            if store.recurring_items().is_empty() {
                println!("No fixed entries to post");
                return Ok(());
            }
            let question = format!("Post all fixed entries into {month}?");
            if !confirm(&question, has_flag(rest, "--yes"))? {
                println!("Cancelled");
                return Ok(());
            }
            let out = store.apply_recurring(month)?;
            if out.added == 0 {
                println!("Fixed entries are already posted for {month}");
            } else {
                println!("Posted {} fixed entries into {month}", out.added);
            }
            Ok(())
        }
        other => anyhow::bail!("Unknown recurring command: {other}. Use add, list, delete or apply"),
    }
}

// ── Files ─────────────────────────────────────────────────────

fn cli_export(args: &[String], store: &mut Store<Database>) -> Result<()> {
    let month = month_arg(flag_value(args, "--month"))?;
    let path = positional(args)
        .first()
        .map(|p| PathBuf::from(super::shellexpand(p)))
        .unwrap_or_else(|| PathBuf::from(export::default_csv_name(month)));

    let count = export::export_month(&path, &store.list_for_month(month))?;
    if count == 0 {
        println!("No data to export for {month}");
    } else {
        println!("Exported {count} transactions to {}", path.display());
    }
    Ok(())
}

fn cli_backup(args: &[String], store: &mut Store<Database>) -> Result<()> {
    let path = positional(args)
        .first()
        .map(|p| PathBuf::from(super::shellexpand(p)))
        .unwrap_or_else(|| {
            PathBuf::from(export::default_backup_name(chrono::Local::now().date_naive()))
        });
    let count = export::write_backup(&path, &*store)?;
    println!("Backed up {count} transactions to {}", path.display());
    Ok(())
}

fn cli_restore(args: &[String], store: &mut Store<Database>) -> Result<()> {
    let Some(file) = positional(args).first().copied() else {
        anyhow::bail!("Usage: fintrack restore <file> [--yes]");
    };
    let backup = export::read_backup(&PathBuf::from(super::shellexpand(file)))?;

    let question = format!(
        "Replace current transactions and budgets with the backup from {} (version {}, {} transactions)?",
        backup.exported_on().unwrap_or("an unknown date"),
        backup.version.as_deref().unwrap_or("?"),
        backup.transactions.len()
    );
    if !confirm(&question, has_flag(args, "--yes"))? {
        println!("Cancelled");
        return Ok(());
    }
    let count = export::restore(store, backup)?;
    println!("Restored {count} transactions");
    Ok(())
}

fn cli_wipe(args: &[String], store: &mut Store<Database>) -> Result<()> {
    if !confirm(
        "This erases ALL records permanently. Are you sure?",
        has_flag(args, "--yes"),
    )? {
        println!("Cancelled");
        return Ok(());
    }
    store.wipe()?;
    println!("All data erased");
    Ok(())
}

fn cli_categories() {
    for kind in [TxnType::Expense, TxnType::Income] {
        println!("{}: {}", kind.label(), categories_for(kind).join(", "));
    }
}
