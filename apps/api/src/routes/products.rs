//! Product catalog endpoints.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::routes::{created, ok, ApiResponse};
use crate::AppState;
use duka_core::{validation, Money, Product};
use duka_db::repository::product::{NewProduct, ProductFilter};

#[derive(Debug, Deserialize)]
pub struct CreateProductBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: Option<i64>,
    pub stock_quantity: Option<i64>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
    pub active: Option<bool>,
}

/// POST /api/products
pub async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<CreateProductBody>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    let (name, price_cents) = match (body.name, body.price_cents) {
        (Some(name), Some(price_cents)) => (name, price_cents),
        _ => return Err(ApiError::validation("Name and price are required")),
    };

    let price = Money::from_cents(price_cents);
    validation::validate_name(&name).map_err(|e| ApiError::validation(e.to_string()))?;
    validation::validate_amount("price_cents", price)
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let product = state
        .db
        .products()
        .create(&NewProduct {
            name,
            description: body.description,
            category: body.category,
            price,
            stock_quantity: body.stock_quantity.unwrap_or(0),
            image_url: body.image_url,
        })
        .await?;

    Ok(created(product))
}

/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let products = state
        .db
        .products()
        .list(&ProductFilter {
            category: query.category,
            active: query.active,
        })
        .await?;

    Ok(ok(products))
}
