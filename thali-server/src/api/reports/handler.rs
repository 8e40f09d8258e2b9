//! Sales report handlers
//!
//! Every role gets the same aggregation; the caller's scope only decides
//! which locations are included.

use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;
use shared::models::{Capability, DiningTable};

use crate::api::scope_for;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::reports::{ReportFilter, SalesReport, closed_orders, orders_csv};
use crate::utils::AppResult;
use crate::utils::time::date_range_millis;

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// First business date, `YYYY-MM-DD` (default today)
    pub from: Option<String>,
    /// Last business date, inclusive
    pub to: Option<String>,
    pub location_id: Option<i64>,
}

fn filter(state: &ServerState, user: &CurrentUser, query: &ReportQuery) -> AppResult<ReportFilter> {
    user.require(Capability::ReportsView)?;
    let scope = scope_for(state, user, query.location_id)?;
    let (start, end) =
        date_range_millis(query.from.as_deref(), query.to.as_deref(), state.config.business_tz)?;
    Ok(ReportFilter { scope, start, end })
}

/// GET /api/reports/sales?from=&to=&location_id=
pub async fn sales(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<SalesReport>> {
    let filter = filter(&state, &user, &query)?;
    let orders = state.orders.get_all_orders()?;
    Ok(Json(SalesReport::build(&orders, &filter, state.config.business_tz)))
}

/// GET /api/reports/sales.csv - one row per settled order
pub async fn sales_csv(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    let filter = filter(&state, &user, &query)?;
    let orders = closed_orders(state.orders.get_all_orders()?, &filter);
    let tables = state
        .db
        .find::<DiningTable>(|t| filter.scope.allows(t.location_id))?;
    let body = orders_csv(&orders, &tables, state.config.business_tz)?;

    let filename = format!(
        "sales-{}-{}.csv",
        query.from.as_deref().unwrap_or("today"),
        query.to.as_deref().unwrap_or("today")
    );
    tracing::info!(user_id = user.id, rows = orders.len(), "Sales CSV exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    ))
}
