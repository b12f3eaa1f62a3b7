//! Dashboard API endpoint

use api_types::dashboard::{DashboardResponse, DashboardStats};
use axum::{Extension, Json, extract::State};

use crate::{
    DASHBOARD_FETCH_FAILED, ServerError, expenses::expense_view, farms::farm_view,
    server::ServerState, user,
};

/// Farms, the five most recent expenses and the paid/pending totals.
pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<DashboardResponse>, ServerError> {
    let dashboard = state
        .engine
        .dashboard(&user.username)
        .await
        .map_err(ServerError::fetch(DASHBOARD_FETCH_FAILED))?;

    Ok(Json(DashboardResponse {
        farms: dashboard.farms.iter().map(farm_view).collect(),
        recent_expenses: dashboard.recent_expenses.iter().map(expense_view).collect(),
        stats: DashboardStats {
            total_farms: dashboard.stats.total_farms as u64,
            total_expenses_minor: dashboard.stats.total_expenses.minor(),
            pending_amount_minor: dashboard.stats.pending_amount.minor(),
            paid_amount_minor: dashboard.stats.paid_amount.minor(),
        },
    }))
}
