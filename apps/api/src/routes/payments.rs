//! Payment endpoints: initiation, verification, and history.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::routes::{ok, ApiResponse};
use crate::AppState;
use duka_core::{Money, Payment, PaymentStatus};
use duka_db::repository::payment::{PaymentFilter, PaymentWithContext};
use duka_payments::{InitiatePaymentRequest, PaymentAck, VerifyReceipt};

// =============================================================================
// Request / Response Schemas
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct InitiatePaymentBody {
    pub sale_id: Option<String>,
    pub phone: Option<String>,
    pub provider: Option<String>,
    pub amount_cents: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentBody {
    pub transaction_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListPaymentsQuery {
    pub transaction_id: Option<String>,
    pub sale_id: Option<String>,
    pub status: Option<PaymentStatus>,
}

/// Initiation payload: the persisted payment plus the provider-facing
/// acknowledgment.
#[derive(Debug, Serialize)]
pub struct InitiateResponse {
    pub payment: Payment,
    pub response: PaymentAck,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/payments
pub async fn initiate_payment(
    State(state): State<AppState>,
    Json(body): Json<InitiatePaymentBody>,
) -> Result<Json<ApiResponse<InitiateResponse>>, ApiError> {
    debug!(?body, "initiate_payment request");

    let (sale_id, phone) = match (body.sale_id, body.phone) {
        (Some(sale_id), Some(phone)) => (sale_id, phone),
        _ => return Err(ApiError::validation("Sale ID and phone number are required")),
    };

    let receipt = state
        .workflow
        .initiate_payment(InitiatePaymentRequest {
            sale_id,
            phone,
            provider: body.provider,
            amount: body.amount_cents.map(Money::from_cents),
        })
        .await?;

    Ok(ok(InitiateResponse {
        payment: receipt.payment,
        response: receipt.acknowledgment,
    }))
}

/// POST /api/payments/verify
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(body): Json<VerifyPaymentBody>,
) -> Result<Json<ApiResponse<VerifyReceipt>>, ApiError> {
    let transaction_id = body
        .transaction_id
        .ok_or_else(|| ApiError::validation("Transaction ID is required"))?;

    debug!(%transaction_id, "verify_payment request");

    let receipt = state.workflow.verify_payment(&transaction_id).await?;
    Ok(ok(receipt))
}

/// GET /api/payments
pub async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<Json<ApiResponse<Vec<PaymentWithContext>>>, ApiError> {
    let rows = state
        .workflow
        .list_payments(&PaymentFilter {
            transaction_id: query.transaction_id,
            sale_id: query.sale_id,
            status: query.status,
            limit: 50,
        })
        .await?;

    Ok(ok(rows))
}
