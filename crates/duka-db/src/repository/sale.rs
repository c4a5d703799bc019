//! # Sale Repository
//!
//! Database operations for sales.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CHECKOUT                                                           │
//! │     └── create() → Sale { status: Pending }                            │
//! │                                                                         │
//! │  2. PAYMENT (owned by the payment repository/workflow)                 │
//! │     └── initiate → verify                                              │
//! │     └── on completed payment the verify transaction also sets          │
//! │         the sale to Completed                                          │
//! │                                                                         │
//! │  Sales are never deleted; the total is fixed at creation.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use duka_core::{Money, Sale, SaleStatus};

/// Columns selected for a [`Sale`] row.
const SALE_COLUMNS: &str = "id, customer_id, total_amount_cents, status, notes, created_at, updated_at";

/// Filters for listing sales.
#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    pub status: Option<SaleStatus>,
    pub customer_id: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// A sale row joined with its customer's name and phone, for list views.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct SaleWithCustomer {
    pub id: String,
    pub customer_id: Option<String>,
    pub total_amount_cents: i64,
    pub status: SaleStatus,
    pub notes: Option<String>,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Creates a new pending sale.
    ///
    /// ## Arguments
    /// * `customer_id` - Optional customer; `None` is a guest checkout
    /// * `total_amount` - Order total, already validated positive
    /// * `notes` - Free-form order notes
    ///
    /// ## Returns
    /// The persisted sale with generated id and timestamps.
    pub async fn create(
        &self,
        customer_id: Option<&str>,
        total_amount: Money,
        notes: Option<&str>,
    ) -> DbResult<Sale> {
        let now = Utc::now();
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.map(str::to_string),
            total_amount_cents: total_amount.cents(),
            status: SaleStatus::Pending,
            notes: notes.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        self.insert(&sale).await?;
        Ok(sale)
    }

    /// Inserts a complete sale row.
    pub async fn insert(&self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, total = sale.total_amount_cents, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, customer_id, total_amount_cents, status, notes,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.customer_id)
        .bind(sale.total_amount_cents)
        .bind(sale.status)
        .bind(&sale.notes)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Lists sales newest-first, joined with the customer's name/phone.
    ///
    /// Filters are applied only when present; the WHERE clause is assembled
    /// to match, and binds follow placeholder order.
    pub async fn list(&self, filter: &SaleFilter) -> DbResult<Vec<SaleWithCustomer>> {
        let mut sql = String::from(
            r#"
            SELECT
                s.id,
                s.customer_id,
                s.total_amount_cents,
                s.status,
                s.notes,
                s.created_at,
                s.updated_at,
                c.name AS customer_name,
                c.phone AS customer_phone
            FROM sales s
            LEFT JOIN customers c ON s.customer_id = c.id
            WHERE 1=1
            "#,
        );

        if filter.status.is_some() {
            sql.push_str(" AND s.status = ?");
        }
        if filter.customer_id.is_some() {
            sql.push_str(" AND s.customer_id = ?");
        }
        sql.push_str(" ORDER BY s.created_at DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, SaleWithCustomer>(&sql);
        if let Some(status) = filter.status {
            query = query.bind(status);
        }
        if let Some(customer_id) = &filter.customer_id {
            query = query.bind(customer_id);
        }
        query = query.bind(filter.limit).bind(filter.offset);

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Counts sales matching the status/customer filters (pagination total).
    pub async fn count(&self, filter: &SaleFilter) -> DbResult<i64> {
        let mut sql = String::from("SELECT COUNT(*) FROM sales WHERE 1=1");

        if filter.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if filter.customer_id.is_some() {
            sql.push_str(" AND customer_id = ?");
        }

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(status) = filter.status {
            query = query.bind(status);
        }
        if let Some(customer_id) = &filter.customer_id {
            query = query.bind(customer_id);
        }

        Ok(query.fetch_one(&self.pool).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_sale_is_pending_with_unique_ids() {
        let db = test_db().await;

        let a = db
            .sales()
            .create(None, Money::from_cents(4999), None)
            .await
            .unwrap();
        let b = db
            .sales()
            .create(None, Money::from_cents(100), Some("urgent"))
            .await
            .unwrap();

        assert_eq!(a.status, SaleStatus::Pending);
        assert_eq!(b.status, SaleStatus::Pending);
        assert_ne!(a.id, b.id);

        let fetched = db.sales().get_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(fetched.total_amount_cents, 4999);
        assert_eq!(fetched.customer_id, None);
    }

    #[tokio::test]
    async fn test_get_missing_sale_returns_none() {
        let db = test_db().await;
        assert!(db.sales().get_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let db = test_db().await;
        db.sales()
            .create(None, Money::from_cents(1000), None)
            .await
            .unwrap();
        db.sales()
            .create(None, Money::from_cents(2000), None)
            .await
            .unwrap();

        let filter = SaleFilter {
            status: Some(SaleStatus::Pending),
            limit: 50,
            ..Default::default()
        };
        let rows = db.sales().list(&filter).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(db.sales().count(&filter).await.unwrap(), 2);

        let filter = SaleFilter {
            status: Some(SaleStatus::Completed),
            limit: 50,
            ..Default::default()
        };
        assert!(db.sales().list(&filter).await.unwrap().is_empty());
        assert_eq!(db.sales().count(&filter).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_joins_customer_name() {
        let db = test_db().await;
        let customer = db
            .customers()
            .create("Alice Johnson", Some("alice@email.com"), "+254712345678", None)
            .await
            .unwrap();
        db.sales()
            .create(Some(&customer.id), Money::from_cents(4999), None)
            .await
            .unwrap();

        let rows = db
            .sales()
            .list(&SaleFilter {
                limit: 50,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].customer_name.as_deref(), Some("Alice Johnson"));
    }
}
