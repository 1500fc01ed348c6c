use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnType {
    Income,
    Expense,
}

impl TxnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Label used in exported spreadsheets and on screen.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "Receita",
            Self::Expense => "Despesa",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "income" | "in" | "receita" => Some(Self::Income),
            "expense" | "out" | "despesa" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for TxnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: TxnType,
    pub category: String,
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == TxnType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TxnType::Expense
    }
}

/// What the user submits when adding or editing a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionInput {
    pub kind: TxnType,
    pub category: String,
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
    /// Split into this many monthly installments when greater than one.
    /// Ignored by edits.
    pub installments: u32,
}

impl TransactionInput {
    pub fn new(
        kind: TxnType,
        category: impl Into<String>,
        amount: Decimal,
        description: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            kind,
            category: category.into(),
            amount,
            description: description.into(),
            date,
            installments: 1,
        }
    }

    pub fn with_installments(mut self, count: u32) -> Self {
        self.installments = count;
        self
    }
}
