//! Expenses API endpoints

use api_types::expense::{
    CategoryTotal, ExpenseCategory as ApiCategory, ExpenseList, ExpenseListResponse, ExpenseNew,
    ExpenseSummary as ApiSummary, ExpenseUpdate, ExpenseView, PaymentStatus as ApiStatus,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{NaiveDate, Utc};
use engine::{
    Expense, ExpenseCategory, ExpenseFilter, ExpenseSortBy, ExpenseSummary, Money, PaymentStatus,
    summarize,
};

use crate::{EXPENSES_FETCH_FAILED, ServerError, server::ServerState, user};

fn map_category(category: ExpenseCategory) -> ApiCategory {
    match category {
        ExpenseCategory::Seeds => ApiCategory::Seeds,
        ExpenseCategory::Fertilizer => ApiCategory::Fertilizer,
        ExpenseCategory::Pesticides => ApiCategory::Pesticides,
        ExpenseCategory::Labour => ApiCategory::Labour,
        ExpenseCategory::Machinery => ApiCategory::Machinery,
        ExpenseCategory::Irrigation => ApiCategory::Irrigation,
        ExpenseCategory::Transport => ApiCategory::Transport,
        ExpenseCategory::Equipment => ApiCategory::Equipment,
        ExpenseCategory::Other => ApiCategory::Other,
    }
}

fn map_api_category(category: ApiCategory) -> ExpenseCategory {
    match category {
        ApiCategory::Seeds => ExpenseCategory::Seeds,
        ApiCategory::Fertilizer => ExpenseCategory::Fertilizer,
        ApiCategory::Pesticides => ExpenseCategory::Pesticides,
        ApiCategory::Labour => ExpenseCategory::Labour,
        ApiCategory::Machinery => ExpenseCategory::Machinery,
        ApiCategory::Irrigation => ExpenseCategory::Irrigation,
        ApiCategory::Transport => ExpenseCategory::Transport,
        ApiCategory::Equipment => ExpenseCategory::Equipment,
        ApiCategory::Other => ExpenseCategory::Other,
    }
}

fn map_status(status: PaymentStatus) -> ApiStatus {
    match status {
        PaymentStatus::Paid => ApiStatus::Paid,
        PaymentStatus::Pending => ApiStatus::Pending,
    }
}

fn map_api_status(status: ApiStatus) -> PaymentStatus {
    match status {
        ApiStatus::Paid => PaymentStatus::Paid,
        ApiStatus::Pending => PaymentStatus::Pending,
    }
}

pub(crate) fn expense_view(expense: &Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id.clone(),
        farm_id: expense.farm_id.clone(),
        farm_name: expense.farm_name.clone(),
        amount_minor: expense.amount.minor(),
        category: map_category(expense.category),
        payment_status: map_status(expense.payment_status),
        date: expense.date,
        description: expense.description.clone(),
        created_at: expense.created_at,
    }
}

fn summary_view(summary: &ExpenseSummary) -> ApiSummary {
    ApiSummary {
        count: summary.totals.count as u64,
        total_minor: summary.totals.total.minor(),
        paid_minor: summary.totals.paid.minor(),
        pending_minor: summary.totals.pending.minor(),
        by_category: summary
            .by_category
            .iter()
            .map(|(category, total)| CategoryTotal {
                category: map_category(*category),
                total_minor: total.minor(),
            })
            .collect(),
    }
}

/// Returns `None` for a missing or blank query value.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_day(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, ServerError> {
    non_blank(value)
        .map(|value| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map_err(|_| ServerError::Generic(format!("{field} must be YYYY-MM-DD")))
        })
        .transpose()
}

fn filter_from_query(query: &ExpenseList) -> Result<ExpenseFilter, ServerError> {
    let category = non_blank(query.category.as_deref())
        .map(|value| {
            value
                .parse::<ExpenseCategory>()
                .map_err(|err| ServerError::Generic(err.to_string()))
        })
        .transpose()?;
    let payment_status = non_blank(query.payment_status.as_deref())
        .map(|value| {
            value
                .parse::<PaymentStatus>()
                .map_err(|err| ServerError::Generic(err.to_string()))
        })
        .transpose()?;

    Ok(ExpenseFilter {
        from_date: parse_day(query.from_date.as_deref(), "from_date")?,
        to_date: parse_day(query.to_date.as_deref(), "to_date")?,
        category,
        payment_status,
        sort_by: query
            .sort_by
            .as_deref()
            .map(ExpenseSortBy::from_key)
            .unwrap_or_default(),
    })
}

fn money(amount_minor: i64) -> Result<Money, ServerError> {
    Ok(Money::try_from_minor(amount_minor)?)
}

/// Lists a farm's expenses matching the query, with a summary of the result.
pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(farm_id): Path<String>,
    Query(query): Query<ExpenseList>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let filter = filter_from_query(&query)?;
    let expenses = state
        .engine
        .list_expenses(&farm_id, &user.username)
        .await
        .map_err(ServerError::fetch(EXPENSES_FETCH_FAILED))?;

    let expenses = filter.apply(&expenses);
    let summary = summarize(&expenses)?;

    Ok(Json(ExpenseListResponse {
        expenses: expenses.iter().map(expense_view).collect(),
        summary: summary_view(&summary),
    }))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((farm_id, expense_id)): Path<(String, String)>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state
        .engine
        .expense(&farm_id, &expense_id, &user.username)
        .await
        .map_err(ServerError::fetch(EXPENSES_FETCH_FAILED))?;
    Ok(Json(expense_view(&expense)))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(farm_id): Path<String>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let input = engine::NewExpense {
        amount: money(payload.amount_minor)?,
        category: map_api_category(payload.category),
        payment_status: payload
            .payment_status
            .map(map_api_status)
            .unwrap_or_default(),
        date: payload.date.with_timezone(&Utc),
        description: payload.description,
    };
    let expense = state
        .engine
        .new_expense(&farm_id, &input, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(expense_view(&expense))))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((farm_id, expense_id)): Path<(String, String)>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let update = engine::ExpenseUpdate {
        amount: payload.amount_minor.map(money).transpose()?,
        category: payload.category.map(map_api_category),
        payment_status: payload.payment_status.map(map_api_status),
        date: payload.date.map(|date| date.with_timezone(&Utc)),
        description: payload.description.map(Some),
    };
    let expense = state
        .engine
        .update_expense(&farm_id, &expense_id, &update, &user.username)
        .await?;
    Ok(Json(expense_view(&expense)))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((farm_id, expense_id)): Path<(String, String)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_expense(&farm_id, &expense_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
