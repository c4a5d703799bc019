//! # Payment Repository
//!
//! Database operations for payments and their append-only audit trail.
//!
//! ## Transactional Sequences
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The two multi-statement sequences each run in ONE transaction so a    │
//! │  crash mid-sequence leaves no partial state:                           │
//! │                                                                         │
//! │  INITIATE                          VERIFY                              │
//! │  ┌──────────────────────┐          ┌────────────────────────────────┐  │
//! │  │ BEGIN                │          │ BEGIN                          │  │
//! │  │  INSERT payments     │          │  UPDATE payments (status)      │  │
//! │  │  INSERT audit row    │          │  UPDATE sales (iff completed)  │  │
//! │  │ COMMIT               │          │  INSERT audit row              │  │
//! │  └──────────────────────┘          │ COMMIT                         │  │
//! │                                    └────────────────────────────────┘  │
//! │                                                                         │
//! │  Invariants this guarantees:                                           │
//! │  • no payment without its initiate-audit row                           │
//! │  • no payment status change without the matching sale update           │
//! │  • no sale marked completed without a completed payment                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Uniqueness of `transaction_id` is enforced by the store's UNIQUE
//! constraint; a collision rolls the whole initiate transaction back and
//! surfaces as `DbError::UniqueViolation`.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use duka_core::{AuditAction, Payment, PaymentStatus, PaymentTransaction, SaleStatus};

const PAYMENT_COLUMNS: &str = "id, sale_id, customer_id, phone, amount_cents, provider, \
     transaction_id, status, payment_method, raw_response, created_at, updated_at";

/// Filters for listing payments.
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub transaction_id: Option<String>,
    pub sale_id: Option<String>,
    pub status: Option<PaymentStatus>,
    pub limit: i64,
}

/// A payment row joined with customer and sale context, for list views.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct PaymentWithContext {
    pub id: String,
    pub sale_id: String,
    pub customer_id: Option<String>,
    pub phone: String,
    pub amount_cents: i64,
    pub provider: String,
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub sale_status: Option<SaleStatus>,
}

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Inserts a payment together with its `initiate` audit row, atomically.
    ///
    /// ## Arguments
    /// * `payment` - Complete payment object, `status = Pending`
    /// * `request_data` - Serialized initiation request, stored on the audit row
    /// * `response_data` - Serialized acknowledgment, stored on the audit row
    pub async fn insert_with_initiate_audit(
        &self,
        payment: &Payment,
        request_data: &str,
        response_data: Option<&str>,
    ) -> DbResult<()> {
        debug!(
            transaction_id = %payment.transaction_id,
            sale_id = %payment.sale_id,
            amount = payment.amount_cents,
            "Inserting payment with initiate audit"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, sale_id, customer_id, phone, amount_cents, provider,
                transaction_id, status, payment_method, raw_response,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.sale_id)
        .bind(&payment.customer_id)
        .bind(&payment.phone)
        .bind(payment.amount_cents)
        .bind(&payment.provider)
        .bind(&payment.transaction_id)
        .bind(payment.status)
        .bind(&payment.payment_method)
        .bind(&payment.raw_response)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO payment_transactions (
                id, payment_id, action, request_data, response_data, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&payment.id)
        .bind(AuditAction::Initiate)
        .bind(request_data)
        .bind(response_data)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Applies a verification outcome atomically: payment status update,
    /// conditional sale completion, and the `verify` audit row.
    ///
    /// ## Arguments
    /// * `complete_sale` - true iff `new_status` is Completed; re-setting an
    ///   already-completed sale is a harmless no-op
    pub async fn apply_verification(
        &self,
        payment_id: &str,
        sale_id: &str,
        new_status: PaymentStatus,
        complete_sale: bool,
        verified_at: DateTime<Utc>,
        request_data: &str,
        response_data: Option<&str>,
    ) -> DbResult<()> {
        debug!(
            payment_id = %payment_id,
            status = ?new_status,
            complete_sale,
            "Applying verification outcome"
        );

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE payments SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(payment_id)
            .bind(new_status)
            .bind(verified_at)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(DbError::not_found("Payment", payment_id));
        }

        if complete_sale {
            sqlx::query("UPDATE sales SET status = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(sale_id)
                .bind(SaleStatus::Completed)
                .bind(verified_at)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO payment_transactions (
                id, payment_id, action, request_data, response_data, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(payment_id)
        .bind(AuditAction::Verify)
        .bind(request_data)
        .bind(response_data)
        .bind(verified_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Appends one audit row outside any payment mutation.
    ///
    /// Used when a verify call touches a payment already in a terminal
    /// state: the payment does not move, but the call is still recorded.
    pub async fn append_audit(
        &self,
        payment_id: &str,
        action: AuditAction,
        request_data: &str,
        response_data: Option<&str>,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payment_transactions (
                id, payment_id, action, request_data, response_data, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(payment_id)
        .bind(action)
        .bind(request_data)
        .bind(response_data)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a payment by its business key.
    pub async fn get_by_transaction_id(&self, transaction_id: &str) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE transaction_id = ?1"
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Gets a payment by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Lists payments newest-first with customer and sale context.
    pub async fn list(&self, filter: &PaymentFilter) -> DbResult<Vec<PaymentWithContext>> {
        let mut sql = String::from(
            r#"
            SELECT
                p.id,
                p.sale_id,
                p.customer_id,
                p.phone,
                p.amount_cents,
                p.provider,
                p.transaction_id,
                p.status,
                p.payment_method,
                p.created_at,
                p.updated_at,
                c.name AS customer_name,
                c.phone AS customer_phone,
                s.status AS sale_status
            FROM payments p
            LEFT JOIN customers c ON p.customer_id = c.id
            LEFT JOIN sales s ON p.sale_id = s.id
            WHERE 1=1
            "#,
        );

        if filter.transaction_id.is_some() {
            sql.push_str(" AND p.transaction_id = ?");
        }
        if filter.sale_id.is_some() {
            sql.push_str(" AND p.sale_id = ?");
        }
        if filter.status.is_some() {
            sql.push_str(" AND p.status = ?");
        }
        sql.push_str(" ORDER BY p.created_at DESC LIMIT ?");

        let mut query = sqlx::query_as::<_, PaymentWithContext>(&sql);
        if let Some(transaction_id) = &filter.transaction_id {
            query = query.bind(transaction_id);
        }
        if let Some(sale_id) = &filter.sale_id {
            query = query.bind(sale_id);
        }
        if let Some(status) = filter.status {
            query = query.bind(status);
        }
        query = query.bind(filter.limit);

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Returns the full audit trail for a payment, oldest first.
    pub async fn audit_trail(&self, payment_id: &str) -> DbResult<Vec<PaymentTransaction>> {
        let rows = sqlx::query_as::<_, PaymentTransaction>(
            r#"
            SELECT id, payment_id, action, request_data, response_data, created_at
            FROM payment_transactions
            WHERE payment_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(payment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Counts audit rows across all payments.
    pub async fn audit_count(&self) -> DbResult<i64> {
        Ok(
            sqlx::query_scalar("SELECT COUNT(*) FROM payment_transactions")
                .fetch_one(&self.pool)
                .await?,
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
