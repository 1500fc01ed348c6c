use rust_decimal::Decimal;

use crate::error::{FinanceError, Result};
use crate::models::{find_category, BudgetStatus, Budgets, Tier, Transaction, TxnType};

/// Budget status for every category with a configured limit, in category order.
/// Categories with spending but no limit are left out.
pub(crate) fn evaluate(budgets: &Budgets, filtered: &[Transaction]) -> Vec<BudgetStatus> {
    let spending = super::spending_by_category(filtered);

    budgets
        .iter()
        .filter(|(_, limit)| **limit > Decimal::ZERO)
        .map(|(category, &limit)| {
            let spent = spending.get(category).copied().unwrap_or(Decimal::ZERO);
            let percentage = spent
                .checked_div(limit)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .map_or(Decimal::ONE_HUNDRED, |p| p.min(Decimal::ONE_HUNDRED));
            BudgetStatus {
                category: category.clone(),
                spent,
                limit,
                percentage,
                tier: tier_for(percentage),
            }
        })
        .collect()
}

pub(crate) fn tier_for(percentage: Decimal) -> Tier {
    if percentage >= Decimal::from(90) {
        Tier::Critical
    } else if percentage >= Decimal::from(70) {
        Tier::Warning
    } else {
        Tier::Ok
    }
}

/// Set or clear the limit for an expense category. A limit of zero or less removes it.
/// Returns the canonical category name.
pub(crate) fn apply_limit(budgets: &mut Budgets, category: &str, limit: Decimal) -> Result<&'static str> {
    let name = find_category(TxnType::Expense, category).ok_or_else(|| {
        FinanceError::validation(format!("'{category}' is not an expense category"))
    })?;
    super::check_amount(limit)?;

    if limit > Decimal::ZERO {
        budgets.insert(name.to_string(), limit);
    } else {
        budgets.remove(name);
    }
    Ok(name)
}
