use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TxnType;

/// Template for a fixed monthly income or expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringItem {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: TxnType,
    /// Day of month, 1-31. Not checked against the length of any month.
    pub day: u8,
    pub description: String,
    pub amount: Decimal,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecurringInput {
    pub kind: TxnType,
    pub day: u8,
    pub description: String,
    pub amount: Decimal,
    /// Falls back to the type's default category when `None`.
    pub category: Option<String>,
}
