//! # Domain Types
//!
//! Core domain types used throughout Duka.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │      Sale       │   │    Payment      │   │ PaymentTransaction  │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)          │   │
//! │  │  customer_id?   │   │  sale_id (FK)   │   │  payment_id (FK)    │   │
//! │  │  total_cents    │   │  transaction_id │   │  action             │   │
//! │  │  status         │   │  status         │   │  request/response   │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │   SaleStatus    │   │  PaymentStatus  │   │    AuditAction      │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  Pending        │   │  Pending        │   │  Initiate           │   │
//! │  │  Processing     │   │  Processing     │   │  Verify             │   │
//! │  │  Completed      │   │  Completed ◄─┐  │   └─────────────────────┘   │
//! │  │  Cancelled      │   │  Failed    ◄─┤ terminal: no way out          │
//! │  │  Refunded       │   │  Cancelled ◄─┘  │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity has a UUID v4 `id` for relations; payments additionally
//! carry a `transaction_id` business key quoted by callers and providers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale.
///
/// Sales are created `Pending` at checkout. The payment workflow is the ONLY
/// writer that auto-transitions a sale, and only ever to `Completed` on a
/// completed payment. The remaining states are set by back-office tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Awaiting payment.
    Pending,
    /// A payment is in flight.
    Processing,
    /// Paid in full.
    Completed,
    /// Abandoned or cancelled before payment.
    Cancelled,
    /// Paid and subsequently refunded.
    Refunded,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Pending
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// The status of a payment attempt.
///
/// ## State Machine
/// ```text
///                  ┌──────────────► completed ─┐
///                  │                           │
///   pending ───────┼──────────────► failed    ─┤  terminal:
///      │           │                           │  no transition out
///      ▼           └──────────────► cancelled ─┘
///   processing ────────► (any terminal state)
/// ```
/// `processing` never demotes back to `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Initiated, waiting for the customer/provider.
    Pending,
    /// Provider acknowledged, outcome not yet known.
    Processing,
    /// Funds collected.
    Completed,
    /// Provider reported failure.
    Failed,
    /// Cancelled by customer or operator.
    Cancelled,
}

impl PaymentStatus {
    /// Whether this status permits no further transitions.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            PaymentStatus::Completed | PaymentStatus::Failed | PaymentStatus::Cancelled
        )
    }

    /// Resolves the status a payment moves to after the provider reported
    /// `observed`.
    ///
    /// ## Rules
    /// - A terminal payment never moves (the observation is discarded)
    /// - `processing` never demotes to `pending`
    /// - Everything else adopts the observed status
    ///
    /// ## Example
    /// ```rust
    /// use duka_core::PaymentStatus;
    ///
    /// assert_eq!(
    ///     PaymentStatus::Pending.observe(PaymentStatus::Completed),
    ///     PaymentStatus::Completed
    /// );
    /// assert_eq!(
    ///     PaymentStatus::Processing.observe(PaymentStatus::Pending),
    ///     PaymentStatus::Processing
    /// );
    /// assert_eq!(
    ///     PaymentStatus::Failed.observe(PaymentStatus::Completed),
    ///     PaymentStatus::Failed
    /// );
    /// ```
    pub fn observe(self, observed: PaymentStatus) -> PaymentStatus {
        if self.is_terminal() {
            return self;
        }
        match (self, observed) {
            (PaymentStatus::Processing, PaymentStatus::Pending) => PaymentStatus::Processing,
            (_, next) => next,
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

// =============================================================================
// Audit Action
// =============================================================================

/// The action recorded by one audit-trail row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A payment was created against a sale.
    Initiate,
    /// A payment's status was checked and resolved.
    Verify,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer record. Master data: referenced by sales and payments but
/// never mutated by the payment workflow.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Email address; unique when present.
    pub email: Option<String>,

    /// Contact phone number (also the default mobile-money MSISDN).
    pub phone: String,

    /// Free-form location, e.g. "Nairobi, Kenya".
    pub location: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Category tag, e.g. "Electronics".
    pub category: Option<String>,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Current stock level.
    pub stock_quantity: i64,

    /// Image URL for the storefront.
    pub image_url: Option<String>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// An order placed by a customer, independent of how it is paid.
///
/// Created in `Pending` by checkout with a fixed total; never deleted.
/// Only the payment workflow auto-transitions it (to `Completed`).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,

    /// Nullable: guest checkout is allowed.
    pub customer_id: Option<String>,

    /// Order total in cents, fixed at creation.
    pub total_amount_cents: i64,

    pub status: SaleStatus,

    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the order total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// One attempt to collect funds for a sale via a named provider.
///
/// A sale can have multiple payments (retries, partial payments). The
/// `transaction_id` is the business key quoted to and by the provider and
/// is unique across all payments.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: String,

    pub sale_id: String,

    /// Copied from the sale at initiation; guest payments have none.
    pub customer_id: Option<String>,

    /// MSISDN the payment request is pushed to.
    pub phone: String,

    /// Amount in cents. Defaults to the sale total; may differ for a
    /// partial payment.
    pub amount_cents: i64,

    /// Provider tag: "mpesa", "airtel", "stripe", ...
    pub provider: String,

    /// Globally unique business key generated at initiation.
    pub transaction_id: String,

    pub status: PaymentStatus,

    /// Instrument hint from the provider ("mobile_money", "card").
    pub payment_method: Option<String>,

    /// Opaque provider payload, stored verbatim for support/debugging.
    pub raw_response: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Payment Transaction (Audit Trail)
// =============================================================================

/// Immutable audit record of one action taken against a payment.
///
/// Append-only: rows are never updated or deleted. Every initiate and every
/// verify writes exactly one row, in the same store transaction as the
/// mutation it records.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PaymentTransaction {
    pub id: String,

    pub payment_id: String,

    pub action: AuditAction,

    /// Serialized request parameters (JSON).
    pub request_data: String,

    /// Serialized outcome (JSON), when the action produced one.
    pub response_data: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
