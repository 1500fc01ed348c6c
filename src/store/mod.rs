use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Serialize};

use crate::db::KeyValueStore;
use crate::error::{FinanceError, Result, StorageError};
use crate::ledger::{self, Added, IdSequence, IdSource, Materialized, Summary};
use crate::models::{
    BudgetStatus, Budgets, MonthKey, RecurringInput, RecurringItem, Transaction, TransactionInput,
};

pub(crate) const TRANSACTIONS_KEY: &str = "transactions";
pub(crate) const BUDGETS_KEY: &str = "budgets";
pub(crate) const RECURRING_KEY: &str = "recurringItems";

/// What a successful mutation touched. Passed to change listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Change {
    Transactions,
    Budgets,
    Recurring,
    Restored,
    Wiped,
}

type Listener = Box<dyn FnMut(Change)>;

/// In-memory records mirrored into a key-value store.
///
/// Every mutation persists the keys it touched and then calls the change
/// listeners in the order they were registered.
pub(crate) struct Store<K: KeyValueStore> {
    kv: K,
    transactions: Vec<Transaction>,
    budgets: Budgets,
    recurring: Vec<RecurringItem>,
    ids: IdSequence,
    listeners: Vec<Listener>,
}

impl<K: KeyValueStore> Store<K> {
    pub(crate) fn load(kv: K) -> Result<Self> {
        let transactions: Vec<Transaction> = read_key(&kv, TRANSACTIONS_KEY)?;
        let mut budgets: Budgets = read_key(&kv, BUDGETS_KEY)?;
        let recurring: Vec<RecurringItem> = read_key(&kv, RECURRING_KEY)?;
        budgets.retain(|_, limit| *limit > Decimal::ZERO);

        let max_id = transactions
            .iter()
            .map(|t| t.id)
            .chain(recurring.iter().map(|r| r.id))
            .max()
            .unwrap_or(0);

        tracing::debug!(
            transactions = transactions.len(),
            budgets = budgets.len(),
            recurring = recurring.len(),
            "records loaded"
        );

        Ok(Self {
            kv,
            transactions,
            budgets,
            recurring,
            ids: IdSequence::starting_after(max_id),
            listeners: Vec::new(),
        })
    }

    /// Register a callback run after every successful mutation.
    pub(crate) fn on_change(&mut self, listener: impl FnMut(Change) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // ── Reads ─────────────────────────────────────────────────

    pub(crate) fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub(crate) fn budgets(&self) -> &Budgets {
        &self.budgets
    }

    pub(crate) fn recurring_items(&self) -> &[RecurringItem] {
        &self.recurring
    }

    pub(crate) fn transaction(&self, id: u64) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub(crate) fn list_for_month(&self, month: MonthKey) -> Vec<Transaction> {
        ledger::list_for_month(&self.transactions, month)
    }

    pub(crate) fn summary(&self, month: MonthKey) -> Summary {
        ledger::summarize(&self.list_for_month(month))
    }

    /// Expense totals per category for `month`.
    pub(crate) fn spending(&self, month: MonthKey) -> BTreeMap<String, Decimal> {
        ledger::spending_by_category(&self.list_for_month(month))
    }

    pub(crate) fn budget_status(&self, month: MonthKey) -> Vec<BudgetStatus> {
        ledger::evaluate(&self.budgets, &self.list_for_month(month))
    }

    // ── Transactions ──────────────────────────────────────────

    pub(crate) fn add_transaction(&mut self, input: &TransactionInput) -> Result<Added> {
        let added = ledger::build_transactions(input, &mut self.ids)?;
        self.transactions.extend_from_slice(added.transactions());
        tracing::info!(
            count = added.transactions().len(),
            kind = %input.kind,
            category = %input.category,
            "transaction added"
        );
        self.commit(Change::Transactions)?;
        Ok(added)
    }

    /// Replace the stored transaction `id` with `input`. Installments in `input` are ignored.
    pub(crate) fn edit_transaction(
        &mut self,
        id: u64,
        input: &TransactionInput,
    ) -> Result<Transaction> {
        ledger::validate_input(input)?;
        let slot = self
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(FinanceError::NotFound(id))?;

        *slot = Transaction {
            id,
            kind: input.kind,
            category: input.category.clone(),
            amount: input.amount,
            description: input.description.trim().to_string(),
            date: input.date,
        };
        let updated = slot.clone();
        tracing::info!(id, "transaction edited");
        self.commit(Change::Transactions)?;
        Ok(updated)
    }

    /// Remove every transaction carrying `id`; returns how many went.
    pub(crate) fn delete_transaction(&mut self, id: u64) -> Result<usize> {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        let removed = before - self.transactions.len();
        if removed == 0 {
            return Err(FinanceError::NotFound(id));
        }
        tracing::info!(id, "transaction deleted");
        self.commit(Change::Transactions)?;
        Ok(removed)
    }

    // ── Budgets ───────────────────────────────────────────────

    /// Set an expense category limit; zero or less clears it.
    pub(crate) fn set_budget(&mut self, category: &str, limit: Decimal) -> Result<&'static str> {
        let name = ledger::apply_limit(&mut self.budgets, category, limit)?;
        tracing::info!(category = name, %limit, "budget updated");
        self.commit(Change::Budgets)?;
        Ok(name)
    }

    // ── Fixed entries ─────────────────────────────────────────

    pub(crate) fn add_recurring(&mut self, input: RecurringInput) -> Result<RecurringItem> {
        let item = ledger::build_item(input, &mut self.ids)?;
        self.recurring.push(item.clone());
        tracing::info!(id = item.id, day = item.day, "fixed entry added");
        self.commit(Change::Recurring)?;
        Ok(item)
    }

    pub(crate) fn delete_recurring(&mut self, id: u64) -> Result<RecurringItem> {
        let pos = self
            .recurring
            .iter()
            .position(|r| r.id == id)
            .ok_or(FinanceError::NotFound(id))?;
        let item = self.recurring.remove(pos);
        tracing::info!(id, "fixed entry deleted");
        self.commit(Change::Recurring)?;
        Ok(item)
    }

    /// Post every fixed entry into `month`, skipping those already there.
    /// Nothing is persisted when nothing was added.
    pub(crate) fn apply_recurring(&mut self, month: MonthKey) -> Result<Materialized> {
        let out = ledger::materialize(&self.recurring, &self.transactions, month, &mut self.ids);
        tracing::info!(%month, added = out.added, "fixed entries posted");
        if out.added > 0 {
            self.transactions.extend_from_slice(&out.transactions);
            self.commit(Change::Transactions)?;
        }
        Ok(out)
    }

    // ── Bulk ──────────────────────────────────────────────────

    /// Replace all transactions and budgets. Fixed entries are kept.
    /// `transactions` carry the id they had in the backup, if any; ids that
    /// are missing or already taken get a fresh one.
    pub(crate) fn replace_all(
        &mut self,
        transactions: Vec<(Option<u64>, Transaction)>,
        budgets: Budgets,
    ) -> Result<()> {
        for id in transactions.iter().filter_map(|(id, _)| *id) {
            self.ids.observe(id);
        }
        let mut seen = HashSet::new();
        let mut restored = Vec::with_capacity(transactions.len());
        for (id, mut txn) in transactions {
            txn.id = match id {
                Some(id) if seen.insert(id) => id,
                _ => {
                    let fresh = self.ids.next_id();
                    seen.insert(fresh);
                    fresh
                }
            };
            restored.push(txn);
        }

        self.transactions = restored;
        self.budgets = budgets
            .into_iter()
            .filter(|(_, limit)| *limit > Decimal::ZERO)
            .collect();
        tracing::info!(
            transactions = self.transactions.len(),
            budgets = self.budgets.len(),
            "records restored"
        );
        self.commit(Change::Restored)
    }

    /// Erase every record, persisted and in memory.
    pub(crate) fn wipe(&mut self) -> Result<()> {
        self.transactions.clear();
        self.budgets.clear();
        self.recurring.clear();
        self.ids = IdSequence::default();
        tracing::info!("all records wiped");
        self.commit(Change::Wiped)
    }

    // ── Persistence ───────────────────────────────────────────

    fn commit(&mut self, change: Change) -> Result<()> {
        match change {
            Change::Transactions => self.write(TRANSACTIONS_KEY, &self.transactions)?,
            Change::Budgets => self.write(BUDGETS_KEY, &self.budgets)?,
            Change::Recurring => self.write(RECURRING_KEY, &self.recurring)?,
            Change::Restored => {
                self.write(TRANSACTIONS_KEY, &self.transactions)?;
                self.write(BUDGETS_KEY, &self.budgets)?;
            }
            Change::Wiped => self.kv.clear()?,
        }
        self.notify(change);
        Ok(())
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.kv.set(key, &json)?;
        tracing::debug!(key, bytes = json.len(), "persisted");
        Ok(())
    }

    fn notify(&mut self, change: Change) {
        for listener in &mut self.listeners {
            listener(change);
        }
    }
}

fn read_key<K: KeyValueStore, T: DeserializeOwned + Default>(kv: &K, key: &str) -> Result<T> {
    match kv.get(key)? {
        Some(json) => serde_json::from_str(&json).map_err(|source| {
            FinanceError::from(StorageError::Corrupt {
                key: key.to_string(),
                source,
            })
        }),
        None => Ok(T::default()),
    }
}

#[cfg(test)]
mod tests;
