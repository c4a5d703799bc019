//! # Duka API
//!
//! HTTP server for the Duka sales & mobile-money payments dashboard.
//!
//! ## Surface
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/sales              create a pending sale (201)              │
//! │  GET  /api/sales              list sales (status/customer filters)     │
//! │  GET  /api/sales/trend        daily order count + volume               │
//! │  GET  /api/sales/by-customer  completed sales per customer             │
//! │  POST /api/payments           initiate a payment against a sale        │
//! │  POST /api/payments/verify    resolve a payment's status               │
//! │  GET  /api/payments           payment history (txid/sale/status)       │
//! │  GET  /api/products           catalog listing                          │
//! │  POST /api/products           create a product (201)                   │
//! │  GET  /api/customers          customer listing                         │
//! │  POST /api/customers          create a customer (201)                  │
//! │  GET  /api/analytics          dashboard aggregates                     │
//! │  GET  /health                 liveness + store round-trip              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every response is `{"success": true, "data": ...}` or
//! `{"success": false, "error": "..."}` with status 200/201, 400, 404, 409,
//! or 500.

pub mod config;
pub mod error;
pub mod routes;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use duka_db::Database;
use duka_payments::PaymentWorkflow;

/// Shared application state.
///
/// Built once in `main()`; every field is an explicitly constructed,
/// dependency-injected client with its lifecycle owned by the process.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub workflow: PaymentWorkflow,
}

/// Builds the application router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/sales",
            get(routes::sales::list_sales).post(routes::sales::create_sale),
        )
        .route("/api/sales/trend", get(routes::analytics::sales_trend))
        .route(
            "/api/sales/by-customer",
            get(routes::analytics::sales_by_customer),
        )
        .route(
            "/api/payments",
            get(routes::payments::list_payments).post(routes::payments::initiate_payment),
        )
        .route("/api/payments/verify", post(routes::payments::verify_payment))
        .route(
            "/api/products",
            get(routes::products::list_products).post(routes::products::create_product),
        )
        .route(
            "/api/customers",
            get(routes::customers::list_customers).post(routes::customers::create_customer),
        )
        .route("/api/analytics", get(routes::analytics::dashboard))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health
async fn health(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    if state.db.health_check().await {
        (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "service": "duka-api" })),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "status": "unhealthy", "service": "duka-api" })),
        )
    }
}
