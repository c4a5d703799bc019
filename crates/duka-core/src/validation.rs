//! # Validation Module
//!
//! Input validation rules for Duka.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP boundary (axum)                                         │
//! │  ├── Type validation (deserialization of the request schema)           │
//! │  └── THIS MODULE: field rules, run before any store access             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Workflow (duka-payments)                                     │
//! │  └── Existence checks, status transition rules                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints (transaction_id, customer email)               │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a phone number (MSISDN).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 20 characters
/// - May start with `+`; the rest must be digits
///
/// ## Example
/// ```rust
/// use duka_core::validation::validate_phone;
///
/// assert!(validate_phone("0712345678").is_ok());
/// assert!(validate_phone("+254712345678").is_ok());
/// assert!(validate_phone("").is_err());
/// assert!(validate_phone("not-a-number").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if phone.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: 20,
        });
    }

    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, optionally prefixed with +".to_string(),
        });
    }

    Ok(())
}

/// Validates a payment provider tag.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Letters, numbers, hyphens, underscores only
pub fn validate_provider(provider: &str) -> ValidationResult<()> {
    let provider = provider.trim();

    if provider.is_empty() {
        return Err(ValidationError::Required {
            field: "provider".to_string(),
        });
    }

    if provider.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "provider".to_string(),
            max: 50,
        });
    }

    if !provider
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "provider".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a transaction id quoted by a caller.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 100 characters (the column width)
pub fn validate_transaction_id(transaction_id: &str) -> ValidationResult<()> {
    let transaction_id = transaction_id.trim();

    if transaction_id.is_empty() {
        return Err(ValidationError::Required {
            field: "transaction_id".to_string(),
        });
    }

    if transaction_id.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "transaction_id".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates a customer or product display name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 255 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 255 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 255,
        });
    }

    Ok(())
}

// =============================================================================
// Monetary Validators
// =============================================================================

/// Validates a sale total or payment amount.
///
/// ## Rules
/// - Must be strictly positive; zero and negative amounts are rejected
///   before any store access
///
/// ## Example
/// ```rust
/// use duka_core::money::Money;
/// use duka_core::validation::validate_amount;
///
/// assert!(validate_amount("total_amount", Money::from_cents(4999)).is_ok());
/// assert!(validate_amount("total_amount", Money::zero()).is_err());
/// assert!(validate_amount("amount", Money::from_cents(-100)).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use duka_core::validation::validate_uuid;
///
/// assert!(validate_uuid("sale_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("sale_id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
