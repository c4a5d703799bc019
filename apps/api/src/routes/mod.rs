//! # Route Handlers
//!
//! One module per resource. Handlers stay thin: decode the request schema,
//! call the workflow or a repository, wrap the result in the response
//! envelope. All business rules live below this layer.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

pub mod analytics;
pub mod customers;
pub mod payments;
pub mod products;
pub mod sales;

/// Success envelope: `{"success": true, "data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

/// 200 with the standard envelope.
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}

/// 201 with the standard envelope.
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, ok(data))
}
