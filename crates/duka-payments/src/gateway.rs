//! # Payment Gateway Port
//!
//! The boundary between the payment workflow and any external payment rail.
//!
//! ## Design
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Gateway Substitution                               │
//! │                                                                         │
//! │  PaymentWorkflow ──► dyn PaymentGateway                                │
//! │                           │                                             │
//! │            ┌──────────────┼──────────────────┐                          │
//! │            ▼              ▼                  ▼                          │
//! │   SimulatedGateway   (MpesaGateway)    (StripeGateway)                 │
//! │   deterministic,      real Daraja       real PaymentIntents            │
//! │   no network          API client        API client                     │
//! │                                                                         │
//! │  Swapping an implementation changes construction in main(),            │
//! │  never the workflow logic.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The simulated implementation is the only one in this repository. Its
//! verification outcome is an injectable decision function, so behavior is
//! deterministic and test-controllable; there is no unseeded randomness in
//! any code path.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use duka_core::{Money, PaymentStatus};

// =============================================================================
// Port Types
// =============================================================================

/// Acknowledgment returned by a gateway when a payment request is pushed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderAck {
    /// The gateway's own reference for this request; quoted back on
    /// status checks.
    pub provider_reference: String,

    /// Human-readable next step for the paying customer.
    pub instructions: String,
}

/// Gateway-side failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The provider understood the request and said no.
    #[error("Provider rejected request: {0}")]
    Rejected(String),

    /// The provider could not be reached.
    #[error("Provider unreachable: {0}")]
    Unreachable(String),
}

/// External payment rail, abstracted.
///
/// Both methods are the only legitimate suspension points in the payment
/// workflow; the workflow bounds `check_status` with a timeout.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Pushes a payment request of `amount` to `phone` on the given rail.
    async fn initiate(
        &self,
        phone: &str,
        amount: Money,
        provider: &str,
    ) -> Result<ProviderAck, GatewayError>;

    /// Asks the rail what became of a previously initiated request.
    async fn check_status(&self, provider_reference: &str) -> Result<PaymentStatus, GatewayError>;
}

// =============================================================================
// Simulated Gateway
// =============================================================================

/// Decision function resolving a status check for the simulated gateway.
pub type StatusDecision = Arc<dyn Fn(&str) -> PaymentStatus + Send + Sync>;

/// A gateway stand-in that performs no network I/O.
///
/// Initiation always acknowledges; status checks resolve through the
/// injected decision function. Construct with [`SimulatedGateway::completing`]
/// for the happy path, [`SimulatedGateway::failing`] for the failure path,
/// or [`SimulatedGateway::with_decision`] for anything scripted.
#[derive(Clone)]
pub struct SimulatedGateway {
    decision: StatusDecision,
}

impl SimulatedGateway {
    /// Every status check resolves `Completed`.
    pub fn completing() -> Self {
        Self::returning(PaymentStatus::Completed)
    }

    /// Every status check resolves `Failed`.
    pub fn failing() -> Self {
        Self::returning(PaymentStatus::Failed)
    }

    /// Every status check resolves the given status.
    pub fn returning(status: PaymentStatus) -> Self {
        SimulatedGateway {
            decision: Arc::new(move |_| status),
        }
    }

    /// Status checks resolve through `decision`, keyed by the provider
    /// reference.
    pub fn with_decision(decision: StatusDecision) -> Self {
        SimulatedGateway { decision }
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        SimulatedGateway::completing()
    }
}

impl std::fmt::Debug for SimulatedGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedGateway").finish_non_exhaustive()
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn initiate(
        &self,
        phone: &str,
        _amount: Money,
        _provider: &str,
    ) -> Result<ProviderAck, GatewayError> {
        Ok(ProviderAck {
            provider_reference: format!("SIM{}", Uuid::new_v4().simple()),
            instructions: format!(
                "A payment request has been sent to {}. Please complete the payment on your phone.",
                phone
            ),
        })
    }

    async fn check_status(&self, provider_reference: &str) -> Result<PaymentStatus, GatewayError> {
        Ok((self.decision)(provider_reference))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_initiate_acknowledges_with_instructions() {
        let gateway = SimulatedGateway::completing();
        let ack = gateway
            .initiate("0712345678", Money::from_cents(4999), "mpesa")
            .await
            .unwrap();

        assert!(ack.provider_reference.starts_with("SIM"));
        assert!(ack.instructions.contains("0712345678"));
    }

    #[tokio::test]
    async fn test_simulated_outcomes_are_deterministic() {
        let gateway = SimulatedGateway::failing();
        for _ in 0..10 {
            assert_eq!(
                gateway.check_status("SIMref").await.unwrap(),
                PaymentStatus::Failed
            );
        }
    }

    #[tokio::test]
    async fn test_decision_function_sees_reference() {
        let gateway = SimulatedGateway::with_decision(Arc::new(|reference| {
            if reference.ends_with("ok") {
                PaymentStatus::Completed
            } else {
                PaymentStatus::Pending
            }
        }));

        assert_eq!(
            gateway.check_status("ref-ok").await.unwrap(),
            PaymentStatus::Completed
        );
        assert_eq!(
            gateway.check_status("ref-wait").await.unwrap(),
            PaymentStatus::Pending
        );
    }
}
