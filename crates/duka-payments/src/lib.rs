//! # duka-payments: Payment Workflow for Duka
//!
//! Orchestrates the sale → initiate → verify lifecycle over the store
//! (`duka-db`) and the payment gateway port.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apps/api (HTTP handlers)                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  duka-payments (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌───────────────┐   ┌────────────────┐  │   │
//! │  │   │   workflow    │──►│   gateway     │   │     notify     │  │   │
//! │  │   │ create_sale   │   │ port (trait)  │   │ fire-and-forget│  │   │
//! │  │   │ initiate      │   │ + simulated   │   │ outcome events │  │   │
//! │  │   │ verify        │   │   adapter     │   │                │  │   │
//! │  │   └───────┬───────┘   └───────────────┘   └────────────────┘  │   │
//! │  └───────────┼─────────────────────────────────────────────────────┘   │
//! │              ▼                                                          │
//! │  duka-db repositories (atomic multi-statement sequences)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`workflow`] - The orchestration service and its request/receipt types
//! - [`gateway`] - `PaymentGateway` port and the simulated implementation
//! - [`notify`] - Fire-and-forget notification channel
//! - [`error`] - Workflow error taxonomy

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod gateway;
pub mod notify;
pub mod workflow;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{WorkflowError, WorkflowResult};
pub use gateway::{GatewayError, PaymentGateway, ProviderAck, SimulatedGateway};
pub use notify::{LogSink, NotificationSink, Notifier, PaymentNotification};
pub use workflow::{
    new_transaction_id, CreateSaleRequest, InitiatePaymentRequest, InitiateReceipt, PaymentAck,
    PaymentWorkflow, VerifyReceipt,
};
