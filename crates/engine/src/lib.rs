pub use crops::{CROP_CATEGORIES, SEASONS, category_of};
pub use dashboard::{Dashboard, DashboardStats, RECENT_EXPENSES_LIMIT, aggregate};
pub use documents::{CollectionPath, Document};
pub use error::EngineError;
pub use expense_filter::{ExpenseFilter, ExpenseSortBy, sort_expenses};
pub use expenses::{Expense, ExpenseCategory, ExpenseUpdate, NewExpense, PaymentStatus};
pub use farm_filter::{FarmFilter, FarmSortBy, sort_farms};
pub use farms::{Farm, FarmUpdate, NewFarm};
pub use money::Money;
pub use ops::{Engine, EngineBuilder, Fetched};
pub use stats::{ExpenseSummary, ExpenseTotals, summarize};
pub use tracker::{ExpenseTracker, Latest, Ticket};

mod crops;
mod dashboard;
mod documents;
mod error;
mod expense_filter;
mod expenses;
mod farm_filter;
mod farms;
mod money;
mod ops;
mod stats;
mod tracker;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
