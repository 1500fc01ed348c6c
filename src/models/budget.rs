use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Expense category name -> monthly spending limit. Only positive limits are stored.
pub type Budgets = BTreeMap<String, Decimal>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Ok,
    Warning,
    Critical,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetStatus {
    pub category: String,
    pub spent: Decimal,
    pub limit: Decimal,
    /// Share of the limit used, capped at 100.
    pub percentage: Decimal,
    pub tier: Tier,
}

impl BudgetStatus {
    pub fn is_over(&self) -> bool {
        self.spent > self.limit
    }
}
