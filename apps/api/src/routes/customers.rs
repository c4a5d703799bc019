//! Customer master-data endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::routes::{created, ok, ApiResponse};
use crate::AppState;
use duka_core::{validation, Customer, DEFAULT_LIST_LIMIT};

#[derive(Debug, Deserialize)]
pub struct CreateCustomerBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
}

/// POST /api/customers
pub async fn create_customer(
    State(state): State<AppState>,
    Json(body): Json<CreateCustomerBody>,
) -> Result<(StatusCode, Json<ApiResponse<Customer>>), ApiError> {
    let (name, phone) = match (body.name, body.phone) {
        (Some(name), Some(phone)) => (name, phone),
        _ => return Err(ApiError::validation("Name and phone are required")),
    };

    validation::validate_name(&name).map_err(|e| ApiError::validation(e.to_string()))?;
    validation::validate_phone(&phone).map_err(|e| ApiError::validation(e.to_string()))?;

    // Duplicate email surfaces from the store as a UniqueViolation → 409
    let customer = state
        .db
        .customers()
        .create(
            &name,
            body.email.as_deref(),
            &phone,
            body.location.as_deref(),
        )
        .await?;

    Ok(created(customer))
}

/// GET /api/customers
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Customer>>>, ApiError> {
    let customers = state.db.customers().list(DEFAULT_LIST_LIMIT).await?;
    Ok(ok(customers))
}
