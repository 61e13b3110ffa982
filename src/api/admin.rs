//! Admin Dashboard Endpoint
//! Mission: Platform totals and the role distribution at a glance

use axum::{extract::State, response::Json};

use crate::error::ApiError;
use crate::models::DashboardStats;
use crate::response::ApiResponse;

use super::AppState;

/// Dashboard statistics - GET /api/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    let stats = state.db.dashboard_stats()?;

    Ok(ApiResponse::ok("Dashboard stats retrieved", stats))
}
