//! # Analytics Repository
//!
//! Read-only aggregate queries for the dashboard. No caching, no
//! incremental computation: every call hits the store, which is fine at
//! dashboard refresh rates.

use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::repository::sale::SaleWithCustomer;
use duka_core::PaymentStatus;

// =============================================================================
// Aggregate Record Types
// =============================================================================

/// Headline dashboard numbers for a time window.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct DashboardMetrics {
    /// Revenue from completed sales in the window, in cents.
    pub total_revenue_cents: i64,
    /// All sales created in the window, any status.
    pub total_orders: i64,
    /// Customers on record (not windowed).
    pub total_customers: i64,
    /// Active products in the catalog (not windowed).
    pub total_products: i64,
    /// Payments still awaiting verification (not windowed).
    pub pending_payments: i64,
}

/// One day of the sales trend.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct TrendPoint {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub order_count: i64,
    pub total_sales_cents: i64,
}

/// Per-customer completed-sales summary.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct CustomerSales {
    pub customer_id: String,
    pub customer_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub location: Option<String>,
    pub order_count: i64,
    pub total_sales_cents: i64,
}

/// Payment counts and volume grouped by status.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct PaymentStatusBreakdown {
    pub status: PaymentStatus,
    pub count: i64,
    pub total_amount_cents: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for dashboard aggregate queries.
#[derive(Debug, Clone)]
pub struct AnalyticsRepository {
    pool: SqlitePool,
}

impl AnalyticsRepository {
    /// Creates a new AnalyticsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AnalyticsRepository { pool }
    }

    /// SQLite datetime modifier for "the last N days".
    fn window(period_days: u32) -> String {
        format!("-{} days", period_days)
    }

    /// Headline metrics over the last `period_days` days.
    pub async fn metrics(&self, period_days: u32) -> DbResult<DashboardMetrics> {
        let metrics = sqlx::query_as::<_, DashboardMetrics>(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN status = 'completed' THEN total_amount_cents ELSE 0 END), 0)
                    AS total_revenue_cents,
                COUNT(*) AS total_orders,
                (SELECT COUNT(*) FROM customers) AS total_customers,
                (SELECT COUNT(*) FROM products WHERE is_active = 1) AS total_products,
                (SELECT COUNT(*) FROM payments WHERE status = 'pending') AS pending_payments
            FROM sales
            WHERE created_at >= datetime('now', ?1)
            "#,
        )
        .bind(Self::window(period_days))
        .fetch_one(&self.pool)
        .await?;

        Ok(metrics)
    }

    /// The most recent sales with customer context.
    pub async fn recent_sales(&self, limit: i64) -> DbResult<Vec<SaleWithCustomer>> {
        let rows = sqlx::query_as::<_, SaleWithCustomer>(
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
            ORDER BY s.created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Completed sales grouped per customer, biggest spenders first.
    ///
    /// ## Arguments
    /// * `limit` - `Some(n)` for a top-N list, `None` for all customers
    pub async fn sales_by_customer(&self, limit: Option<i64>) -> DbResult<Vec<CustomerSales>> {
        let mut sql = String::from(
            r#"
            SELECT
                c.id AS customer_id,
                c.name AS customer_name,
                c.email,
                c.phone,
                c.location,
                COUNT(s.id) AS order_count,
                COALESCE(SUM(s.total_amount_cents), 0) AS total_sales_cents
            FROM customers c
            LEFT JOIN sales s ON c.id = s.customer_id AND s.status = 'completed'
            GROUP BY c.id, c.name, c.email, c.phone, c.location
            ORDER BY total_sales_cents DESC
            "#,
        );
        if limit.is_some() {
            sql.push_str(" LIMIT ?");
        }

        let mut query = sqlx::query_as::<_, CustomerSales>(&sql);
        if let Some(limit) = limit {
            query = query.bind(limit);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Daily order count and volume over the last `period_days` days,
    /// oldest day first.
    pub async fn sales_trend(&self, period_days: u32) -> DbResult<Vec<TrendPoint>> {
        let rows = sqlx::query_as::<_, TrendPoint>(
            r#"
            SELECT
                date(created_at) AS date,
                COUNT(id) AS order_count,
                COALESCE(SUM(total_amount_cents), 0) AS total_sales_cents
            FROM sales
            WHERE created_at >= datetime('now', ?1)
            GROUP BY date(created_at)
            ORDER BY date ASC
            "#,
        )
        .bind(Self::window(period_days))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Payment counts and volume per status.
    pub async fn payment_status_breakdown(&self) -> DbResult<Vec<PaymentStatusBreakdown>> {
        let rows = sqlx::query_as::<_, PaymentStatusBreakdown>(
            r#"
            SELECT
                status,
                COUNT(*) AS count,
                COALESCE(SUM(amount_cents), 0) AS total_amount_cents
            FROM payments
            GROUP BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use duka_core::{Money, Payment, PaymentStatus};
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_metrics_on_empty_store_are_zero() {
        let db = test_db().await;
        let metrics = db.analytics().metrics(30).await.unwrap();

        assert_eq!(metrics.total_revenue_cents, 0);
        assert_eq!(metrics.total_orders, 0);
        assert_eq!(metrics.total_customers, 0);
        assert_eq!(metrics.total_products, 0);
        assert_eq!(metrics.pending_payments, 0);
    }

    #[tokio::test]
    async fn test_metrics_count_only_completed_revenue() {
        let db = test_db().await;
        let completed = db
            .sales()
            .create(None, Money::from_cents(4999), None)
            .await
            .unwrap();
        db.sales()
            .create(None, Money::from_cents(10_000), None)
            .await
            .unwrap();

        // Drive one sale to completed through the payment path
        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            sale_id: completed.id.clone(),
            customer_id: None,
            phone: "0712345678".to_string(),
            amount_cents: 4999,
            provider: "mpesa".to_string(),
            transaction_id: "MPESA1700000000000ANL".to_string(),
            status: PaymentStatus::Pending,
            payment_method: None,
            raw_response: None,
            created_at: now,
            updated_at: now,
        };
        db.payments()
            .insert_with_initiate_audit(&payment, "{}", None)
            .await
            .unwrap();
        db.payments()
            .apply_verification(
                &payment.id,
                &completed.id,
                PaymentStatus::Completed,
                true,
                Utc::now(),
                "{}",
                None,
            )
            .await
            .unwrap();

        let metrics = db.analytics().metrics(30).await.unwrap();
        assert_eq!(metrics.total_orders, 2);
        assert_eq!(metrics.total_revenue_cents, 4999);
        assert_eq!(metrics.pending_payments, 0);

        let breakdown = db.analytics().payment_status_breakdown().await.unwrap();
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].status, PaymentStatus::Completed);
        assert_eq!(breakdown[0].count, 1);
        assert_eq!(breakdown[0].total_amount_cents, 4999);
    }

    #[tokio::test]
    async fn test_trend_groups_by_day() {
        let db = test_db().await;
        db.sales()
            .create(None, Money::from_cents(1000), None)
            .await
            .unwrap();
        db.sales()
            .create(None, Money::from_cents(2000), None)
            .await
            .unwrap();

        let trend = db.analytics().sales_trend(7).await.unwrap();
        assert_eq!(trend.len(), 1); // both created today
        assert_eq!(trend[0].order_count, 2);
        assert_eq!(trend[0].total_sales_cents, 3000);
    }

    #[tokio::test]
    async fn test_sales_by_customer_counts_completed_only() {
        let db = test_db().await;
        let customer = db
            .customers()
            .create("Carol Davis", Some("carol@email.com"), "+254734567890", None)
            .await
            .unwrap();
        db.sales()
            .create(Some(&customer.id), Money::from_cents(5000), None)
            .await
            .unwrap();

        let rows = db.analytics().sales_by_customer(None).await.unwrap();
        assert_eq!(rows.len(), 1);
        // Sale is still pending, so it contributes nothing
        assert_eq!(rows[0].order_count, 0);
        assert_eq!(rows[0].total_sales_cents, 0);

        let top = db.analytics().sales_by_customer(Some(5)).await.unwrap();
        assert_eq!(top.len(), 1);
    }

    #[tokio::test]
    async fn test_recent_sales_limit() {
        let db = test_db().await;
        for cents in [100, 200, 300] {
            db.sales()
                .create(None, Money::from_cents(cents), None)
                .await
                .unwrap();
        }

        let recent = db.analytics().recent_sales(2).await.unwrap();
        assert_eq!(recent.len(), 2);
    }
}
