//! End-to-end tests driving the HTTP router against an in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use duka_api::{router, AppState};
use duka_db::{Database, DbConfig};
use duka_payments::{LogSink, Notifier, PaymentGateway, PaymentWorkflow, SimulatedGateway};

async fn app_with_gateway(gateway: Arc<dyn PaymentGateway>) -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let workflow = PaymentWorkflow::new(db.clone(), gateway, Notifier::spawn(Arc::new(LogSink)));
    router(AppState { db, workflow })
}

async fn app() -> Router {
    app_with_gateway(Arc::new(SimulatedGateway::completing())).await
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_sale_payment_happy_path() {
    let app = app().await;

    // Checkout: 49.99
    let (status, body) = send(
        &app,
        "POST",
        "/api/sales",
        Some(json!({ "total_amount_cents": 4999, "notes": "demo order" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "pending");
    let sale_id = body["data"]["id"].as_str().unwrap().to_string();

    // Initiate mobile-money payment
    let (status, body) = send(
        &app,
        "POST",
        "/api/payments",
        Some(json!({ "sale_id": sale_id, "phone": "0712345678", "provider": "mpesa" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["payment"]["amount_cents"], 4999);
    assert_eq!(body["data"]["payment"]["status"], "pending");
    assert_eq!(body["data"]["response"]["status"], "pending");
    assert!(body["data"]["response"]["instructions"]
        .as_str()
        .unwrap()
        .contains("0712345678"));
    let transaction_id = body["data"]["payment"]["transaction_id"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(transaction_id.starts_with("MPESA"));

    // Verify: simulated gateway completes
    let (status, body) = send(
        &app,
        "POST",
        "/api/payments/verify",
        Some(json!({ "transaction_id": transaction_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["amount_cents"], 4999);
    assert!(body["data"]["verified_at"].is_string());

    // Sale is now completed
    let (status, body) = send(&app, "GET", "/api/sales?status=completed", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["total"], 1);

    // Payment history shows the completed payment with sale context
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/payments?transaction_id={}", transaction_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "completed");
    assert_eq!(rows[0]["sale_status"], "completed");
}

#[tokio::test]
async fn test_create_sale_missing_amount_is_400() {
    let app = app().await;

    let (status, body) = send(&app, "POST", "/api/sales", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("total_amount"));
}

#[tokio::test]
async fn test_create_sale_rejects_zero_amount() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/sales",
        Some(json!({ "total_amount_cents": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_initiate_missing_fields_is_400() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/payments",
        Some(json!({ "phone": "0712345678" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    // Nothing was written
    let (_, body) = send(&app, "GET", "/api/payments", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_initiate_unknown_sale_is_404() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/payments",
        Some(json!({ "sale_id": "no-such-sale", "phone": "0712345678" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_verify_unknown_transaction_is_404() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/payments/verify",
        Some(json!({ "transaction_id": "MPESA000NOPE" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_verify_missing_transaction_id_is_400() {
    let app = app().await;

    let (status, _) = send(&app, "POST", "/api/payments/verify", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_failed_gateway_leaves_sale_pending() {
    let app = app_with_gateway(Arc::new(SimulatedGateway::failing())).await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/sales",
        Some(json!({ "total_amount_cents": 4999 })),
    )
    .await;
    let sale_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = send(
        &app,
        "POST",
        "/api/payments",
        Some(json!({ "sale_id": sale_id, "phone": "0712345678" })),
    )
    .await;
    let transaction_id = body["data"]["payment"]["transaction_id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/api/payments/verify",
        Some(json!({ "transaction_id": transaction_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "failed");

    // The sale is untouched by a failed payment
    let (_, body) = send(&app, "GET", "/api/sales?status=pending", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_customer_email_is_409() {
    let app = app().await;

    let customer = json!({ "name": "Alice", "email": "alice@email.com", "phone": "0712345678" });
    let (status, _) = send(&app, "POST", "/api/customers", Some(customer.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", "/api/customers", Some(customer)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_products_roundtrip() {
    let app = app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/products",
        Some(json!({ "name": "Laptop", "price_cents": 99999, "category": "Electronics" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", "/api/products?category=Electronics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "POST", "/api/products", Some(json!({ "name": "X" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_analytics_endpoints() {
    let app = app().await;

    send(
        &app,
        "POST",
        "/api/sales",
        Some(json!({ "total_amount_cents": 4999 })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/analytics?period=7", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["metrics"]["total_orders"], 1);
    assert_eq!(body["data"]["metrics"]["total_revenue_cents"], 0);
    assert_eq!(body["data"]["period"], "7 days");

    let (status, body) = send(&app, "GET", "/api/sales/trend?days=7", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["trend"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "GET", "/api/sales/by-customer", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}
