use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use super::app::{App, InputMode, PendingAction, Screen};
use super::util::format_amount;
use crate::db::Database;
use crate::export;
use crate::ledger::Added;
use crate::models::{categories_for, MonthKey, TxnType};
use crate::parse;
use crate::store::Store;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Store<Database>) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit fintrack", cmd_quit, r);
    register_command!("quit", "Quit fintrack", cmd_quit, r);
    register_command!("d", "Go to Dashboard", cmd_dashboard, r);
    register_command!("dashboard", "Go to Dashboard", cmd_dashboard, r);
    register_command!("t", "Go to Transactions", cmd_transactions, r);
    register_command!("transactions", "Go to Transactions", cmd_transactions, r);
    register_command!("b", "Go to Budgets", cmd_budgets, r);
    register_command!("budgets", "Go to Budgets", cmd_budgets, r);
    register_command!("f", "Go to Fixed entries", cmd_fixed, r);
    register_command!("fixed", "Go to Fixed entries", cmd_fixed, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("month", "Set month (e.g. :month 2024-01)", cmd_month, r);
    register_command!("m", "Set month (e.g. :m 2024-01)", cmd_month, r);
    register_command!("next-month", "Go to next month", cmd_next_month, r);
    register_command!("prev-month", "Go to previous month", cmd_prev_month, r);
    register_command!(
        "search",
        "Search transactions (e.g. :search mercado)",
        cmd_search,
        r
    );
    register_command!("s", "Search transactions (e.g. :s mercado)", cmd_search, r);
    register_command!(
        "add",
        "Add transaction (e.g. :add expense lazer 45,90 2024-03-09 Cinema x2)",
        cmd_add,
        r
    );
    register_command!(
        "a",
        "Add transaction (e.g. :a income salario 5000 today Salary)",
        cmd_add,
        r
    );
    register_command!(
        "edit",
        "Edit selected transaction (prefills the command bar)",
        cmd_edit,
        r
    );
    register_command!(
        "delete",
        "Delete selected transaction",
        cmd_delete,
        r
    );
    register_command!(
        "budget",
        "Set budget (e.g. :budget Lazer 300; 0 clears)",
        cmd_budget,
        r
    );
    register_command!(
        "recur",
        "Add fixed entry (e.g. :recur expense 5 1500 moradia Rent)",
        cmd_recur,
        r
    );
    register_command!(
        "delete-recur",
        "Delete selected fixed entry",
        cmd_delete_recur,
        r
    );
    register_command!(
        "apply",
        "Post fixed entries into the current month",
        cmd_apply,
        r
    );
    register_command!(
        "export",
        "Export month to CSV (e.g. :export ~/financas.csv)",
        cmd_export,
        r
    );
    register_command!(
        "backup",
        "Write JSON backup (e.g. :backup ~/backup.json)",
        cmd_backup,
        r
    );
    register_command!(
        "restore",
        "Restore transactions and budgets from a backup file",
        cmd_restore,
        r
    );
    register_command!("wipe", "Erase all data", cmd_wipe, r);
    register_command!(
        "categories",
        "List categories",
        cmd_categories,
        r
    );

    r
});

pub(crate) fn handle_command(
    input: &str,
    app: &mut App,
    store: &mut Store<Database>,
) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, store)?;
    } else {
        // Try fuzzy match
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

/// Run the action the user just confirmed.
pub(crate) fn confirm_pending(app: &mut App, store: &mut Store<Database>) -> anyhow::Result<()> {
    let Some(action) = app.pending_action.take() else {
        return Ok(());
    };
    app.input_mode = InputMode::Normal;

    match action {
        PendingAction::DeleteTransaction { id, description } => {
            store.delete_transaction(id)?;
            app.set_status(format!("Deleted '{description}'"));
        }
        PendingAction::DeleteRecurring { id, description } => {
            store.delete_recurring(id)?;
            app.set_status(format!("Deleted fixed entry '{description}'"));
        }
        PendingAction::ApplyRecurring { month } => {
            let out = store.apply_recurring(month)?;
            if out.added == 0 {
                app.set_status(format!("Fixed entries are already posted for {month}"));
            } else {
                app.set_status(format!("Posted {} fixed entries into {month}", out.added));
            }
        }
        PendingAction::Restore { backup } => {
            let count = export::restore(store, *backup)?;
            app.set_status(format!("Restored {count} transactions"));
        }
        PendingAction::Wipe => {
            store.wipe()?;
            app.set_status("All data erased");
        }
    }
    Ok(())
}

pub(crate) fn cancel_pending(app: &mut App) {
    app.pending_action = None;
    app.input_mode = InputMode::Normal;
    app.set_status("Cancelled");
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

fn words(args: &str) -> Vec<&str> {
    args.split_whitespace().collect()
}

fn target_path(args: &str, default_name: String) -> PathBuf {
    if args.is_empty() {
        PathBuf::from(default_name)
    } else {
        PathBuf::from(crate::run::shellexpand(args))
    }
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _store: &mut Store<Database>) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_dashboard(_args: &str, app: &mut App, _store: &mut Store<Database>) -> anyhow::Result<()> {
    app.screen = Screen::Dashboard;
    Ok(())
}

fn cmd_transactions(_args: &str, app: &mut App, _store: &mut Store<Database>) -> anyhow::Result<()> {
    app.screen = Screen::Transactions;
    Ok(())
}

fn cmd_budgets(_args: &str, app: &mut App, _store: &mut Store<Database>) -> anyhow::Result<()> {
    app.screen = Screen::Budgets;
    Ok(())
}

fn cmd_fixed(_args: &str, app: &mut App, _store: &mut Store<Database>) -> anyhow::Result<()> {
    app.screen = Screen::Recurring;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _store: &mut Store<Database>) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_month(args: &str, app: &mut App, store: &mut Store<Database>) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_month(MonthKey::current(), store);
        app.set_status(format!("Month: {}", app.current_month));
        return Ok(());
    }

    // Accept "2024-01", "2024-1", "01", "1"
    let text = if args.len() <= 2 {
        format!("{}-{args}", app.current_month.year())
    } else {
        args.to_string()
    };

    match text.parse::<MonthKey>() {
        Ok(month) => {
            app.set_month(month, store);
            app.set_status(format!("Switched to month: {month}"));
        }
        Err(e) => app.set_status(e.to_string()),
    }
    Ok(())
}

fn cmd_next_month(_args: &str, app: &mut App, store: &mut Store<Database>) -> anyhow::Result<()> {
    let month = app.current_month.next();
    app.set_month(month, store);
    app.set_status(format!("Month: {month}"));
    Ok(())
}

fn cmd_prev_month(_args: &str, app: &mut App, store: &mut Store<Database>) -> anyhow::Result<()> {
    let month = app.current_month.prev();
    app.set_month(month, store);
    app.set_status(format!("Month: {month}"));
    Ok(())
}

fn cmd_search(args: &str, app: &mut App, store: &mut Store<Database>) -> anyhow::Result<()> {
    app.search_input = args.to_string();
    app.screen = Screen::Transactions;
    app.refresh_transactions(store);

    if args.is_empty() {
        app.set_status("Search cleared");
    } else {
        app.set_status(format!("Searching: {args}"));
    }

    Ok(())
}

fn cmd_add(args: &str, app: &mut App, store: &mut Store<Database>) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status(
            "Usage: :add <income|expense> <category> <amount> <date> <description> [xN]",
        );
        return Ok(());
    }

    let input = match parse::parse_transaction_args(&words(args)) {
        Ok(input) => input,
        Err(e) => {
            app.set_status(e.to_string());
            return Ok(());
        }
    };

    match store.add_transaction(&input) {
        Ok(Added::Single(txn)) => app.set_status(format!(
            "Added: {} {} on {}",
            txn.description,
            format_amount(txn.amount),
            txn.date.format("%d/%m/%Y")
        )),
        Ok(Added::Installments(txns)) => app.set_status(format!(
            "Added {} installments of {}",
            txns.len(),
            format_amount(txns.first().map(|t| t.amount).unwrap_or_default())
        )),
        Err(crate::error::FinanceError::Validation(msg)) => app.set_status(msg),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn cmd_edit(args: &str, app: &mut App, store: &mut Store<Database>) -> anyhow::Result<()> {
    if args.is_empty() {
        let Some(txn) = app.selected_transaction() else {
            app.set_status("Navigate to Transactions and select one first");
            return Ok(());
        };
        app.command_input = format!(
            "edit {} {} {} {} {} {}",
            txn.id,
            txn.kind,
            txn.category,
            txn.amount,
            txn.date,
            txn.description
        );
        app.input_mode = InputMode::Command;
        return Ok(());
    }

    let all = words(args);
    let Some((id, rest)) = all.split_first() else {
        return Ok(());
    };
    let result = parse::parse_id(id)
        .and_then(|id| Ok((id, parse::parse_edit_args(rest)?)))
        .and_then(|(id, input)| store.edit_transaction(id, &input));

    match result {
        Ok(txn) => app.set_status(format!("Updated: {}", txn.description)),
        Err(crate::error::FinanceError::Storage(e)) => return Err(e.into()),
        Err(e) => app.set_status(e.to_string()),
    }
    Ok(())
}

fn cmd_delete(_args: &str, app: &mut App, _store: &mut Store<Database>) -> anyhow::Result<()> {
    if app.screen != Screen::Transactions || app.transactions.is_empty() {
        app.set_status("Navigate to Transactions and select one first");
        return Ok(());
    }

    if let Some(txn) = app.selected_transaction() {
        let (id, description) = (txn.id, txn.description.clone());
        app.ask(
            format!("Delete '{description}'?"),
            PendingAction::DeleteTransaction { id, description },
        );
    }
    Ok(())
}

fn cmd_budget(args: &str, app: &mut App, store: &mut Store<Database>) -> anyhow::Result<()> {
    // Last token is the amount, everything before is the category name
    let parts: Vec<&str> = args.rsplitn(2, ' ').collect();
    if parts.len() < 2 {
        app.set_status("Usage: :budget <category> <amount>. Example: :budget Lazer 300");
        return Ok(());
    }

    let result = parse::parse_amount(parts[0]).and_then(|limit| {
        store
            .set_budget(parts[1].trim(), limit)
            .map(|name| (name, limit))
    });

    match result {
        Ok((name, limit)) if limit > rust_decimal::Decimal::ZERO => {
            app.screen = Screen::Budgets;
            app.set_status(format!("Budget set: {name} = {}", format_amount(limit)));
        }
        Ok((name, _)) => app.set_status(format!("Budget cleared for {name}")),
        Err(crate::error::FinanceError::Storage(e)) => return Err(e.into()),
        Err(e) => app.set_status(e.to_string()),
    }
    Ok(())
}

fn cmd_recur(args: &str, app: &mut App, store: &mut Store<Database>) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :recur <income|expense> <day> <amount> [category] <description>");
        return Ok(());
    }

    let result = parse::parse_recurring_args(&words(args)).and_then(|input| store.add_recurring(input));
    match result {
        Ok(item) => {
            app.screen = Screen::Recurring;
            app.set_status(format!(
                "Fixed entry added: {} on day {} ({})",
                item.description, item.day, item.category
            ));
        }
        Err(crate::error::FinanceError::Storage(e)) => return Err(e.into()),
        Err(e) => app.set_status(e.to_string()),
    }
    Ok(())
}

fn cmd_delete_recur(args: &str, app: &mut App, _store: &mut Store<Database>) -> anyhow::Result<()> {
    let target = if args.is_empty() {
        if app.screen != Screen::Recurring {
            app.set_status("Navigate to Fixed and select an entry first");
            return Ok(());
        }
        app.selected_recurring()
    } else {
        match parse::parse_id(args) {
            Ok(id) => app.recurring.iter().find(|r| r.id == id),
            Err(e) => {
                app.set_status(e.to_string());
                return Ok(());
            }
        }
    };

    match target {
        Some(item) => {
            let (id, description) = (item.id, item.description.clone());
            app.ask(
                format!("Delete fixed entry '{description}'?"),
                PendingAction::DeleteRecurring { id, description },
            );
        }
        None => app.set_status("No fixed entry selected"),
    }
    Ok(())
}

fn cmd_apply(args: &str, app: &mut App, _store: &mut Store<Database>) -> anyhow::Result<()> {
    if app.recurring.is_empty() {
        app.set_status("No fixed entries. Add one with :recur");
        return Ok(());
    }
    let month = if args.is_empty() {
        app.current_month
    } else {
        match args.parse::<MonthKey>() {
            Ok(m) => m,
            Err(e) => {
                app.set_status(e.to_string());
                return Ok(());
            }
        }
    };
    app.ask(
        format!("Post all fixed entries into {month}?"),
        PendingAction::ApplyRecurring { month },
    );
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, store: &mut Store<Database>) -> anyhow::Result<()> {
    let month = app.current_month;
    let path = target_path(args, export::default_csv_name(month));

    let count = export::export_month(&path, &store.list_for_month(month))?;
    if count == 0 {
        app.set_status(format!("No data to export for {month}"));
    } else {
        app.set_status(format!("Exported {count} transactions to {}", path.display()));
    }
    Ok(())
}

fn cmd_backup(args: &str, app: &mut App, store: &mut Store<Database>) -> anyhow::Result<()> {
    let today = chrono::Local::now().date_naive();
    let path = target_path(args, export::default_backup_name(today));
    let count = export::write_backup(&path, &*store)?;
    app.set_status(format!("Backed up {count} transactions to {}", path.display()));
    Ok(())
}

fn cmd_restore(args: &str, app: &mut App, _store: &mut Store<Database>) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :restore <backup.json>");
        return Ok(());
    }

    let backup = match export::read_backup(&PathBuf::from(crate::run::shellexpand(args))) {
        Ok(b) => b,
        Err(e) => {
            app.set_status(format!("{e:#}"));
            return Ok(());
        }
    };
    let message = format!(
        "Replace transactions and budgets with the backup from {} ({} transactions)?",
        backup.exported_on().unwrap_or("an unknown date"),
        backup.transactions.len()
    );
    app.ask(
        message,
        PendingAction::Restore {
            backup: Box::new(backup),
        },
    );
    Ok(())
}

fn cmd_wipe(_args: &str, app: &mut App, _store: &mut Store<Database>) -> anyhow::Result<()> {
    app.ask(
        "This erases ALL records permanently. Are you sure?",
        PendingAction::Wipe,
    );
    Ok(())
}

fn cmd_categories(_args: &str, app: &mut App, _store: &mut Store<Database>) -> anyhow::Result<()> {
    app.set_status(format!(
        "Expense: {} | Income: {}",
        categories_for(TxnType::Expense).join(", "),
        categories_for(TxnType::Income).join(", ")
    ));
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
