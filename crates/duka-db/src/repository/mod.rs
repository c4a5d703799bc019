//! # Repository Module
//!
//! Repository implementations for database operations.
//!
//! Each repository owns the SQL for one aggregate; the payment repository
//! additionally owns the two multi-statement transactional sequences
//! (initiate, verify) so that no caller can produce partial state.

pub mod analytics;
pub mod customer;
pub mod payment;
pub mod product;
pub mod sale;
