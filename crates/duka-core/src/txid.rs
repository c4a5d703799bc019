//! # Transaction-Id Composition
//!
//! Pure construction of payment transaction ids.
//!
//! ## Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   MPESA  1767206530123  9F3A1C04B2D7                                    │
//! │   ──┬──  ──────┬──────  ──────┬─────                                    │
//! │     │          │              └── random suffix (12 hex chars)          │
//! │     │          └── millisecond unix timestamp                           │
//! │     └── provider tag, uppercased, non-alphanumerics stripped            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The timestamp makes ids roughly sortable and human-datable; the suffix
//! carries the uniqueness. With 12 hex characters (48 bits) the collision
//! probability across a burst of 10,000 same-millisecond initiations is
//! below 1e-6, and the store's UNIQUE constraint backstops the tail.
//!
//! This module is pure: the caller supplies the clock reading and the
//! suffix. The impure convenience generator lives in `duka-payments`, next
//! to the workflow that uses it.

use chrono::{DateTime, Utc};

/// Length of the random suffix appended to every transaction id.
pub const SUFFIX_LEN: usize = 12;

/// Composes a transaction id from its three parts.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use duka_core::txid::compose;
///
/// let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
/// let id = compose("mpesa", at, "9F3A1C04B2D7");
/// assert_eq!(id, "MPESA17000000000009F3A1C04B2D7");
/// ```
pub fn compose(provider: &str, at: DateTime<Utc>, suffix: &str) -> String {
    let tag: String = provider
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_uppercase();

    format!("{}{}{}", tag, at.timestamp_millis(), suffix)
}

// =============================================================================
// Unit Tests
// =============================================================================
