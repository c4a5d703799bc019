//! Sale endpoints: checkout (create) and dashboard listing.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::routes::{created, ApiResponse};
use crate::AppState;
use duka_core::{Money, Sale, SaleStatus, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use duka_db::repository::sale::{SaleFilter, SaleWithCustomer};
use duka_payments::CreateSaleRequest;

// =============================================================================
// Request / Response Schemas
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSaleBody {
    pub customer_id: Option<String>,
    pub total_amount_cents: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListSalesQuery {
    pub status: Option<SaleStatus>,
    pub customer_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// List envelope with pagination metadata alongside the rows.
#[derive(Debug, Serialize)]
pub struct SaleListResponse {
    pub success: bool,
    pub data: Vec<SaleWithCustomer>,
    pub pagination: Pagination,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/sales
pub async fn create_sale(
    State(state): State<AppState>,
    Json(body): Json<CreateSaleBody>,
) -> Result<(StatusCode, Json<ApiResponse<Sale>>), ApiError> {
    debug!(?body, "create_sale request");

    let total_amount_cents = body
        .total_amount_cents
        .ok_or_else(|| ApiError::validation("total_amount_cents is required"))?;

    let sale = state
        .workflow
        .create_sale(CreateSaleRequest {
            customer_id: body.customer_id,
            total_amount: Money::from_cents(total_amount_cents),
            notes: body.notes,
        })
        .await?;

    Ok(created(sale))
}

/// GET /api/sales
pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<ListSalesQuery>,
) -> Result<Json<SaleListResponse>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    let offset = query.offset.unwrap_or(0).max(0);

    let filter = SaleFilter {
        status: query.status,
        customer_id: query.customer_id,
        limit,
        offset,
    };

    let rows = state.db.sales().list(&filter).await?;
    let total = state.db.sales().count(&filter).await?;

    Ok(Json(SaleListResponse {
        success: true,
        data: rows,
        pagination: Pagination {
            limit,
            offset,
            total,
            total_pages: (total + limit - 1) / limit,
        },
    }))
}
