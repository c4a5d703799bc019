//! # Product Repository
//!
//! Database operations for the product catalog.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use duka_core::{Money, Product};

const PRODUCT_COLUMNS: &str = "id, name, description, category, price_cents, stock_quantity, \
     image_url, is_active, created_at, updated_at";

/// Fields for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Money,
    pub stock_quantity: i64,
    pub image_url: Option<String>,
}

/// Filters for listing products.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub active: Option<bool>,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a new active product.
    pub async fn create(&self, new: &NewProduct) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: new.name.clone(),
            description: new.description.clone(),
            category: new.category.clone(),
            price_cents: new.price.cents(),
            stock_quantity: new.stock_quantity,
            image_url: new.image_url.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, category, price_cents, stock_quantity,
                image_url, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.stock_quantity)
        .bind(&product.image_url)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists products newest-first, optionally filtered by category and
    /// active flag.
    pub async fn list(&self, filter: &ProductFilter) -> DbResult<Vec<Product>> {
        let mut sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE 1=1");

        if filter.category.is_some() {
            sql.push_str(" AND category = ?");
        }
        if filter.active.is_some() {
            sql.push_str(" AND is_active = ?");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query_as::<_, Product>(&sql);
        if let Some(category) = &filter.category {
            query = query.bind(category);
        }
        if let Some(active) = filter.active {
            query = query.bind(active);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn laptop() -> NewProduct {
        NewProduct {
            name: "Laptop".to_string(),
            description: Some("High-performance laptop".to_string()),
            category: Some("Electronics".to_string()),
            price: Money::from_cents(99_999),
            stock_quantity: 50,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let created = db.products().create(&laptop()).await.unwrap();
        assert!(created.is_active);

        let fetched = db.products().get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.price().cents(), 99_999);
        assert_eq!(fetched.category.as_deref(), Some("Electronics"));
    }

    #[tokio::test]
    async fn test_list_filters_by_category() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products().create(&laptop()).await.unwrap();
        db.products()
            .create(&NewProduct {
                name: "Programming Book".to_string(),
                category: Some("Literature".to_string()),
                description: None,
                price: Money::from_cents(1999),
                stock_quantity: 100,
                image_url: None,
            })
            .await
            .unwrap();

        let electronics = db
            .products()
            .list(&ProductFilter {
                category: Some("Electronics".to_string()),
                active: Some(true),
            })
            .await
            .unwrap();
        assert_eq!(electronics.len(), 1);
        assert_eq!(electronics[0].name, "Laptop");

        let all = db.products().list(&ProductFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
