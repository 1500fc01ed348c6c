use rust_decimal::Decimal;
use std::cell::Cell;
use std::rc::Rc;

use crate::db::KeyValueStore;
use crate::export::Backup;
use crate::ledger::{self, Summary};
use crate::models::{BudgetStatus, MonthKey, RecurringItem, Transaction};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Dashboard,
    Transactions,
    Budgets,
    Recurring,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[
            Self::Dashboard,
            Self::Transactions,
            Self::Budgets,
            Self::Recurring,
        ]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "Dashboard"),
            Self::Transactions => write!(f, "Transactions"),
            Self::Budgets => write!(f, "Budgets"),
            Self::Recurring => write!(f, "Fixed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Search,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Search => write!(f, "SEARCH"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug)]
pub(crate) enum PendingAction {
    DeleteTransaction { id: u64, description: String },
    DeleteRecurring { id: u64, description: String },
    ApplyRecurring { month: MonthKey },
    Restore { backup: Box<Backup> },
    Wipe,
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) search_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) current_month: MonthKey,

    // Dashboard
    pub(crate) summary: Summary,
    pub(crate) spending_by_category: Vec<(String, Decimal)>,

    // Transactions
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) transaction_index: usize,
    pub(crate) transaction_scroll: usize,
    pub(crate) month_transaction_count: usize,

    // Budgets
    pub(crate) budgets: Vec<BudgetStatus>,
    pub(crate) budget_index: usize,
    pub(crate) budget_scroll: usize,

    // Fixed entries
    pub(crate) recurring: Vec<RecurringItem>,
    pub(crate) recurring_index: usize,
    pub(crate) recurring_scroll: usize,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,

    /// Set by the store's change listener; cleared on refresh.
    stale: Rc<Cell<bool>>,
}

impl App {
    pub(crate) fn new() -> Self {
        Self {
            running: true,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            search_input: String::new(),
            status_message: String::new(),
            show_help: false,
            current_month: MonthKey::current(),

            summary: Summary::default(),
            spending_by_category: Vec::new(),

            transactions: Vec::new(),
            transaction_index: 0,
            transaction_scroll: 0,
            month_transaction_count: 0,

            budgets: Vec::new(),
            budget_index: 0,
            budget_scroll: 0,

            recurring: Vec::new(),
            recurring_index: 0,
            recurring_scroll: 0,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,

            stale: Rc::new(Cell::new(true)),
        }
    }

    /// Mark the views stale whenever `store` changes.
    pub(crate) fn watch<K: KeyValueStore>(&self, store: &mut Store<K>) {
        let stale = Rc::clone(&self.stale);
        store.on_change(move |change| {
            tracing::debug!(?change, "views marked stale");
            stale.set(true);
        });
    }

    pub(crate) fn is_stale(&self) -> bool {
        self.stale.get()
    }

    pub(crate) fn refresh_dashboard<K: KeyValueStore>(&mut self, store: &Store<K>) {
        self.summary = store.summary(self.current_month);
        self.spending_by_category = store.spending(self.current_month).into_iter().collect();
        self.spending_by_category.sort_by(|a, b| b.1.cmp(&a.1));
    }

    pub(crate) fn refresh_transactions<K: KeyValueStore>(&mut self, store: &Store<K>) {
        let month = store.list_for_month(self.current_month);
        self.month_transaction_count = month.len();
        self.transactions = ledger::search(&month, &self.search_input);
        clamp_cursor(
            &mut self.transaction_index,
            &mut self.transaction_scroll,
            self.transactions.len(),
        );
    }

    pub(crate) fn refresh_budgets<K: KeyValueStore>(&mut self, store: &Store<K>) {
        self.budgets = store.budget_status(self.current_month);
        clamp_cursor(
            &mut self.budget_index,
            &mut self.budget_scroll,
            self.budgets.len(),
        );
    }

    pub(crate) fn refresh_recurring<K: KeyValueStore>(&mut self, store: &Store<K>) {
        self.recurring = store.recurring_items().to_vec();
        clamp_cursor(
            &mut self.recurring_index,
            &mut self.recurring_scroll,
            self.recurring.len(),
        );
    }

    pub(crate) fn refresh_all<K: KeyValueStore>(&mut self, store: &Store<K>) {
        self.refresh_dashboard(store);
        self.refresh_transactions(store);
        self.refresh_budgets(store);
        self.refresh_recurring(store);
        self.stale.set(false);
    }

    pub(crate) fn set_month<K: KeyValueStore>(&mut self, month: MonthKey, store: &Store<K>) {
        self.current_month = month;
        self.transaction_index = 0;
        self.transaction_scroll = 0;
        self.refresh_all(store);
    }

    pub(crate) fn selected_transaction(&self) -> Option<&Transaction> {
        self.transactions.get(self.transaction_index)
    }

    pub(crate) fn selected_recurring(&self) -> Option<&RecurringItem> {
        self.recurring.get(self.recurring_index)
    }

    pub(crate) fn ask(&mut self, message: impl Into<String>, action: PendingAction) {
        self.confirm_message = message.into();
        self.pending_action = Some(action);
        self.input_mode = InputMode::Confirm;
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

fn clamp_cursor(index: &mut usize, scroll: &mut usize, len: usize) {
    if *index >= len {
        *index = len.saturating_sub(1);
    }
    if *scroll > *index {
        *scroll = *index;
    }
}
