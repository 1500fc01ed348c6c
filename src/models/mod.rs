mod budget;
mod category;
mod month;
mod recurring;
mod transaction;

pub use budget::{BudgetStatus, Budgets, Tier};
pub use category::{categories_for, default_category, find_category, is_valid_category};
pub use month::MonthKey;
pub use recurring::{RecurringInput, RecurringItem};
pub use transaction::{Transaction, TransactionInput, TxnType};

#[cfg(test)]
mod tests;
