//! Expense filter/sort pipeline.

use chrono::NaiveDate;

use crate::{Expense, ExpenseCategory, PaymentStatus, util::collate};

/// Ordering applied after filtering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExpenseSortBy {
    /// Newest first.
    #[default]
    Date,
    /// Largest first.
    Amount,
    /// Category label, collated ascending.
    Category,
}

impl ExpenseSortBy {
    /// Maps a sort key to an ordering; unknown keys fall back to `Date`.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "amount" => Self::Amount,
            "category" => Self::Category,
            _ => Self::Date,
        }
    }
}

/// Independent optional predicates over an expense list.
///
/// Date bounds are inclusive calendar days compared against the UTC date of
/// each expense. `None` fields impose no constraint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpenseFilter {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub category: Option<ExpenseCategory>,
    pub payment_status: Option<PaymentStatus>,
    pub sort_by: ExpenseSortBy,
}

impl ExpenseFilter {
    pub fn matches(&self, expense: &Expense) -> bool {
        let day = expense.date.date_naive();
        if self.from_date.is_some_and(|from| day < from) {
            return false;
        }
        if self.to_date.is_some_and(|to| day > to) {
            return false;
        }
        if self.category.is_some_and(|c| expense.category != c) {
            return false;
        }
        if self
            .payment_status
            .is_some_and(|s| expense.payment_status != s)
        {
            return false;
        }
        true
    }

    /// Filters then stable-sorts a copy of `expenses`.
    pub fn apply(&self, expenses: &[Expense]) -> Vec<Expense> {
        let mut out: Vec<Expense> = expenses
            .iter()
            .filter(|expense| self.matches(expense))
            .cloned()
            .collect();
        sort_expenses(&mut out, self.sort_by);
        out
    }
}

pub fn sort_expenses(expenses: &mut [Expense], sort_by: ExpenseSortBy) {
    match sort_by {
        ExpenseSortBy::Amount => expenses.sort_by(|a, b| b.amount.cmp(&a.amount)),
        ExpenseSortBy::Category => {
            expenses.sort_by(|a, b| collate(a.category.label(), b.category.label()))
        }
        ExpenseSortBy::Date => expenses.sort_by(|a, b| b.date.cmp(&a.date)),
    }
}
