//! Dashboard analytics endpoints: aggregate metrics, the daily sales trend,
//! and the per-customer summary.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::{ok, ApiResponse};
use crate::AppState;
use duka_db::repository::analytics::{
    CustomerSales, DashboardMetrics, PaymentStatusBreakdown, TrendPoint,
};
use duka_db::repository::sale::SaleWithCustomer;

/// Default analytics window in days.
const DEFAULT_PERIOD_DAYS: u32 = 30;

/// How many recent sales / top customers the dashboard shows.
const DASHBOARD_LIST_SIZE: i64 = 5;

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub period: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub days: Option<u32>,
}

/// Everything the dashboard landing page renders, in one payload.
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub metrics: DashboardMetrics,
    pub recent_sales: Vec<SaleWithCustomer>,
    pub top_customers: Vec<CustomerSales>,
    pub sales_trend: Vec<TrendPoint>,
    pub payment_status: Vec<PaymentStatusBreakdown>,
    pub period: String,
}

#[derive(Debug, Serialize)]
pub struct TrendResponse {
    pub trend: Vec<TrendPoint>,
    pub period: String,
}

/// GET /api/analytics
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<ApiResponse<AnalyticsResponse>>, ApiError> {
    let period_days = query.period.unwrap_or(DEFAULT_PERIOD_DAYS);
    let analytics = state.db.analytics();

    let metrics = analytics.metrics(period_days).await?;
    let recent_sales = analytics.recent_sales(DASHBOARD_LIST_SIZE).await?;
    let top_customers = analytics
        .sales_by_customer(Some(DASHBOARD_LIST_SIZE))
        .await?;
    let sales_trend = analytics.sales_trend(period_days).await?;
    let payment_status = analytics.payment_status_breakdown().await?;

    Ok(ok(AnalyticsResponse {
        metrics,
        recent_sales,
        top_customers,
        sales_trend,
        payment_status,
        period: format!("{} days", period_days),
    }))
}

/// GET /api/sales/trend
pub async fn sales_trend(
    State(state): State<AppState>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<ApiResponse<TrendResponse>>, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_PERIOD_DAYS);
    let trend = state.db.analytics().sales_trend(days).await?;

    Ok(ok(TrendResponse {
        trend,
        period: format!("{} days", days),
    }))
}

/// GET /api/sales/by-customer
pub async fn sales_by_customer(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CustomerSales>>>, ApiError> {
    let rows = state.db.analytics().sales_by_customer(None).await?;
    Ok(ok(rows))
}
