//! Dashboard aggregation.
//!
//! Pure: takes every farm of a user with its already-fetched expenses and
//! computes the summary cards and the "recent expenses" slice.

use serde::Serialize;

use crate::{Expense, Farm, Money, ResultEngine, stats::ExpenseTotals};

/// How many expenses the dashboard shows as "recent".
pub const RECENT_EXPENSES_LIMIT: usize = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_farms: usize,
    pub total_expenses: Money,
    pub pending_amount: Money,
    pub paid_amount: Money,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Dashboard {
    pub farms: Vec<Farm>,
    /// Most recent expenses across all farms, newest first.
    pub recent_expenses: Vec<Expense>,
    pub stats: DashboardStats,
}

/// Builds the dashboard from farms and their expenses.
///
/// Expenses are concatenated in farm order and stable-sorted by date, newest
/// first, so equal dates keep their input order.
pub fn aggregate(farms: Vec<(Farm, Vec<Expense>)>) -> ResultEngine<Dashboard> {
    let mut totals = ExpenseTotals::default();
    let mut all_expenses = Vec::new();
    let mut all_farms = Vec::with_capacity(farms.len());

    for (farm, expenses) in farms {
        for expense in &expenses {
            totals.add(expense)?;
        }
        all_expenses.extend(expenses);
        all_farms.push(farm);
    }

    all_expenses.sort_by(|a, b| b.date.cmp(&a.date));
    all_expenses.truncate(RECENT_EXPENSES_LIMIT);

    Ok(Dashboard {
        stats: DashboardStats {
            total_farms: all_farms.len(),
            total_expenses: totals.total,
            pending_amount: totals.pending,
            paid_amount: totals.paid,
        },
        farms: all_farms,
        recent_expenses: all_expenses,
    })
}
