//! Expense totals and per-category summaries.

use std::collections::HashMap;

use serde::Serialize;

use crate::{EngineError, Expense, ExpenseCategory, Money, ResultEngine, util::collate};

/// Running totals over a set of expenses, split by payment status.
///
/// `paid + pending == total` holds after every `add`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExpenseTotals {
    pub count: usize,
    pub total: Money,
    pub paid: Money,
    pub pending: Money,
}

impl ExpenseTotals {
    pub fn add(&mut self, expense: &Expense) -> ResultEngine<()> {
        let overflow = || EngineError::InvalidAmount("expense total too large".to_string());

        let total = self.total.checked_add(expense.amount).ok_or_else(overflow)?;
        if expense.payment_status.is_paid() {
            self.paid = self.paid.checked_add(expense.amount).ok_or_else(overflow)?;
        } else {
            self.pending = self.pending.checked_add(expense.amount).ok_or_else(overflow)?;
        }
        self.total = total;
        self.count += 1;
        Ok(())
    }
}

/// Summary of a (usually filtered) expense list.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExpenseSummary {
    pub totals: ExpenseTotals,
    /// Categories with at least one expense, in collation order.
    pub by_category: Vec<(ExpenseCategory, Money)>,
}

pub fn summarize(expenses: &[Expense]) -> ResultEngine<ExpenseSummary> {
    let mut totals = ExpenseTotals::default();
    let mut by_category: HashMap<ExpenseCategory, Money> = HashMap::new();

    for expense in expenses {
        totals.add(expense)?;
        let entry = by_category.entry(expense.category).or_default();
        *entry = entry
            .checked_add(expense.amount)
            .ok_or_else(|| EngineError::InvalidAmount("category total too large".to_string()))?;
    }

    let mut by_category: Vec<(ExpenseCategory, Money)> = by_category.into_iter().collect();
    by_category.sort_by(|(a, _), (b, _)| collate(a.label(), b.label()));

    Ok(ExpenseSummary {
        totals,
        by_category,
    })
}
