//! # Workflow Error Types
//!
//! The error taxonomy surfaced by the payment workflow. Each variant maps
//! onto exactly one HTTP status in the API layer:
//!
//! ```text
//! Validation → 400    NotFound → 404    Conflict → 409
//! Gateway    → 500    Store    → 500
//! ```

use thiserror::Error;

use crate::gateway::GatewayError;
use duka_core::ValidationError;
use duka_db::DbError;

/// Errors produced by the sale/payment workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Missing or malformed input; user-correctable.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced sale, payment, or customer does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Transaction-id generation kept colliding with stored payments.
    ///
    /// ## When This Occurs
    /// Practically never: the workflow retries generation internally, and
    /// each id carries 48 random bits. Exhausting the retries indicates a
    /// broken randomness source, not bad luck.
    #[error("Transaction id collision persisted after {attempts} attempts")]
    Conflict { attempts: u32 },

    /// The payment gateway failed before any state was written.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// The store failed; logged, not retried automatically.
    #[error(transparent)]
    Store(#[from] DbError),
}

impl WorkflowError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        WorkflowError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;
