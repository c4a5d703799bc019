//! # Payment Workflow
//!
//! Orchestrates the sale → initiate → verify lifecycle.
//!
//! ## Control Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Payment Lifecycle                                 │
//! │                                                                         │
//! │  1. CREATE SALE                                                        │
//! │     └── create_sale() → Sale { status: Pending }                       │
//! │                                                                         │
//! │  2. INITIATE                                                           │
//! │     ├── resolve amount (explicit or sale total)                        │
//! │     ├── generate transaction id (retry on UNIQUE collision)            │
//! │     ├── gateway.initiate() → acknowledgment                            │
//! │     └── ONE TX: insert payment + initiate-audit row                    │
//! │                                                                         │
//! │  3. VERIFY (polled by the dashboard)                                   │
//! │     ├── terminal already? → audit + return stored status,              │
//! │     │                       gateway NOT consulted                      │
//! │     ├── gateway.check_status() under timeout                           │
//! │     │      └── timeout → Processing, never silently Completed          │
//! │     ├── ONE TX: update payment + (iff completed) complete sale         │
//! │     │           + verify-audit row                                     │
//! │     └── completed/failed → fire-and-forget notification               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The workflow performs no in-process coordination between concurrent
//! invocations; correctness under concurrency rests on the store's
//! transactions and the UNIQUE(transaction_id) constraint.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{WorkflowError, WorkflowResult};
use crate::gateway::{PaymentGateway, ProviderAck};
use crate::notify::{Notifier, PaymentNotification};
use duka_core::{
    txid, validation, Money, Payment, PaymentStatus, Sale, DEFAULT_PROVIDER,
};
use duka_db::repository::payment::{PaymentFilter, PaymentWithContext};
use duka_db::Database;

/// How many fresh transaction ids to try when inserts collide.
const MAX_TXID_ATTEMPTS: u32 = 3;

/// Default bound on the gateway status check.
const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Requests & Receipts
// =============================================================================

/// Parameters for creating a sale.
#[derive(Debug, Clone, Default)]
pub struct CreateSaleRequest {
    pub customer_id: Option<String>,
    pub total_amount: Money,
    pub notes: Option<String>,
}

/// Parameters for initiating a payment against a sale.
#[derive(Debug, Clone)]
pub struct InitiatePaymentRequest {
    pub sale_id: String,
    pub phone: String,
    /// Defaults to [`DEFAULT_PROVIDER`].
    pub provider: Option<String>,
    /// Defaults to the sale's total (partial payments may override).
    pub amount: Option<Money>,
}

/// Provider-facing acknowledgment returned alongside the persisted payment.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentAck {
    pub transaction_id: String,
    pub phone: String,
    pub amount_cents: i64,
    pub provider: String,
    pub status: PaymentStatus,
    pub instructions: String,
}

/// Result of a successful initiation.
#[derive(Debug, Clone, Serialize)]
pub struct InitiateReceipt {
    pub payment: Payment,
    pub acknowledgment: PaymentAck,
}

/// Result of a verification call.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReceipt {
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub amount_cents: i64,
    pub phone: String,
    pub provider: String,
    pub verified_at: DateTime<Utc>,
}

// =============================================================================
// Transaction-Id Generation
// =============================================================================

/// Generates a fresh transaction id for `provider`.
///
/// Uppercased UUID-v4 hex supplies the random suffix; see
/// [`duka_core::txid`] for the format and collision bounds.
pub fn new_transaction_id(provider: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string().to_uppercase();
    txid::compose(provider, Utc::now(), &hex[..txid::SUFFIX_LEN])
}

// =============================================================================
// Workflow
// =============================================================================

/// The sale/payment orchestration service.
///
/// Holds its collaborators explicitly: the store handle, the gateway port,
/// and the notification channel. Constructed once at startup and shared
/// across request handlers.
#[derive(Clone)]
pub struct PaymentWorkflow {
    db: Database,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Notifier,
    verify_timeout: Duration,
}

impl PaymentWorkflow {
    /// Creates a workflow over the given store, gateway, and notifier.
    pub fn new(db: Database, gateway: Arc<dyn PaymentGateway>, notifier: Notifier) -> Self {
        PaymentWorkflow {
            db,
            gateway,
            notifier,
            verify_timeout: DEFAULT_VERIFY_TIMEOUT,
        }
    }

    /// Overrides the bound on gateway status checks.
    pub fn verify_timeout(mut self, timeout: Duration) -> Self {
        self.verify_timeout = timeout;
        self
    }

    // -------------------------------------------------------------------------
    // Sale creation
    // -------------------------------------------------------------------------

    /// Creates a sale in `Pending` status.
    ///
    /// ## Errors
    /// - `Validation` when the total is zero or negative
    /// - `NotFound` when a given customer id does not exist
    pub async fn create_sale(&self, req: CreateSaleRequest) -> WorkflowResult<Sale> {
        validation::validate_amount("total_amount", req.total_amount)?;

        if let Some(customer_id) = &req.customer_id {
            if self.db.customers().get_by_id(customer_id).await?.is_none() {
                return Err(WorkflowError::not_found("Customer", customer_id));
            }
        }

        let sale = self
            .db
            .sales()
            .create(
                req.customer_id.as_deref(),
                req.total_amount,
                req.notes.as_deref(),
            )
            .await?;

        info!(sale_id = %sale.id, total = %req.total_amount, "Sale created");
        Ok(sale)
    }

    // -------------------------------------------------------------------------
    // Payment initiation
    // -------------------------------------------------------------------------

    /// Initiates a payment against an existing sale.
    ///
    /// Exactly one payment row and one audit row are created, atomically;
    /// the sale is not touched.
    ///
    /// ## Errors
    /// - `Validation` for a bad phone, provider, or amount
    /// - `NotFound` when the sale does not exist
    /// - `Conflict` when transaction-id generation keeps colliding
    pub async fn initiate_payment(
        &self,
        req: InitiatePaymentRequest,
    ) -> WorkflowResult<InitiateReceipt> {
        validation::validate_phone(&req.phone)?;
        let provider = req
            .provider
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());
        validation::validate_provider(&provider)?;
        if let Some(amount) = req.amount {
            validation::validate_amount("amount", amount)?;
        }

        let sale = self
            .db
            .sales()
            .get_by_id(&req.sale_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Sale", &req.sale_id))?;

        let amount = req.amount.unwrap_or_else(|| sale.total_amount());

        // One gateway acknowledgment; collisions below retry only the id.
        let ack = self.gateway.initiate(&req.phone, amount, &provider).await?;
        let raw_response =
            serde_json::to_string(&ack).unwrap_or_else(|_| ack.provider_reference.clone());

        let payment_method = if provider == "stripe" {
            "card"
        } else {
            "mobile_money"
        };

        let mut attempt = 0;
        let payment = loop {
            attempt += 1;
            let transaction_id = new_transaction_id(&provider);
            let now = Utc::now();

            let payment = Payment {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                customer_id: sale.customer_id.clone(),
                phone: req.phone.clone(),
                amount_cents: amount.cents(),
                provider: provider.clone(),
                transaction_id,
                status: PaymentStatus::Pending,
                payment_method: Some(payment_method.to_string()),
                raw_response: Some(raw_response.clone()),
                created_at: now,
                updated_at: now,
            };

            let request_data = serde_json::json!({
                "sale_id": payment.sale_id,
                "phone": payment.phone,
                "provider": payment.provider,
                "amount_cents": payment.amount_cents,
                "transaction_id": payment.transaction_id,
            })
            .to_string();

            match self
                .db
                .payments()
                .insert_with_initiate_audit(&payment, &request_data, Some(&raw_response))
                .await
            {
                Ok(()) => break payment,
                Err(err) if err.is_unique_violation_on("transaction_id") => {
                    if attempt >= MAX_TXID_ATTEMPTS {
                        return Err(WorkflowError::Conflict {
                            attempts: MAX_TXID_ATTEMPTS,
                        });
                    }
                    warn!(attempt, "Transaction id collided, regenerating");
                }
                Err(err) => return Err(err.into()),
            }
        };

        info!(
            transaction_id = %payment.transaction_id,
            sale_id = %payment.sale_id,
            amount = payment.amount_cents,
            provider = %payment.provider,
            "Payment initiated"
        );

        let acknowledgment = PaymentAck {
            transaction_id: payment.transaction_id.clone(),
            phone: payment.phone.clone(),
            amount_cents: payment.amount_cents,
            provider: payment.provider.clone(),
            status: PaymentStatus::Pending,
            instructions: ack.instructions,
        };

        Ok(InitiateReceipt {
            payment,
            acknowledgment,
        })
    }

    // -------------------------------------------------------------------------
    // Payment verification
    // -------------------------------------------------------------------------

    /// Verifies a payment by transaction id.
    ///
    /// Every call on an existing payment appends exactly one audit row. A
    /// payment already in a terminal state is returned unchanged without
    /// consulting the gateway. A gateway timeout leaves the payment in
    /// `Processing`, never silently `Completed`.
    ///
    /// ## Errors
    /// - `Validation` when the transaction id is missing/empty
    /// - `NotFound` when no payment carries the id (NO audit row written)
    /// - `Gateway` when the status check itself fails (state untouched)
    pub async fn verify_payment(&self, transaction_id: &str) -> WorkflowResult<VerifyReceipt> {
        validation::validate_transaction_id(transaction_id)?;

        let payment = self
            .db
            .payments()
            .get_by_transaction_id(transaction_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Payment", transaction_id))?;

        let request_data =
            serde_json::json!({ "transaction_id": transaction_id }).to_string();

        // Terminal payments are settled history: record the lookup, skip the
        // gateway, hand back the stored status.
        if payment.status.is_terminal() {
            let response_data =
                serde_json::json!({ "status": payment.status, "terminal": true }).to_string();
            self.db
                .payments()
                .append_audit(
                    &payment.id,
                    duka_core::AuditAction::Verify,
                    &request_data,
                    Some(&response_data),
                )
                .await?;

            debug!(
                transaction_id = %transaction_id,
                status = ?payment.status,
                "Verify on terminal payment"
            );

            return Ok(Self::receipt(&payment, payment.status, Utc::now()));
        }

        let reference = Self::provider_reference(&payment);
        let observed =
            match tokio::time::timeout(self.verify_timeout, self.gateway.check_status(&reference))
                .await
            {
                Ok(Ok(status)) => status,
                Ok(Err(err)) => return Err(err.into()),
                Err(_) => {
                    warn!(
                        transaction_id = %transaction_id,
                        timeout = ?self.verify_timeout,
                        "Gateway status check timed out"
                    );
                    PaymentStatus::Processing
                }
            };

        let new_status = payment.status.observe(observed);
        let complete_sale = new_status == PaymentStatus::Completed;
        let verified_at = Utc::now();

        let response_data = serde_json::json!({ "status": new_status }).to_string();
        self.db
            .payments()
            .apply_verification(
                &payment.id,
                &payment.sale_id,
                new_status,
                complete_sale,
                verified_at,
                &request_data,
                Some(&response_data),
            )
            .await?;

        info!(
            transaction_id = %transaction_id,
            from = ?payment.status,
            to = ?new_status,
            sale_completed = complete_sale,
            "Payment verified"
        );

        if matches!(
            new_status,
            PaymentStatus::Completed | PaymentStatus::Failed
        ) {
            self.notifier.notify(PaymentNotification {
                transaction_id: payment.transaction_id.clone(),
                amount_cents: payment.amount_cents,
                status: new_status,
                provider: payment.provider.clone(),
            });
        }

        Ok(Self::receipt(&payment, new_status, verified_at))
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Lists payments with customer/sale context.
    pub async fn list_payments(
        &self,
        filter: &PaymentFilter,
    ) -> WorkflowResult<Vec<PaymentWithContext>> {
        Ok(self.db.payments().list(filter).await?)
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    /// Recovers the gateway reference stored at initiation, falling back to
    /// the transaction id for payments recorded before acknowledgments
    /// carried one.
    fn provider_reference(payment: &Payment) -> String {
        payment
            .raw_response
            .as_deref()
            .and_then(|raw| serde_json::from_str::<ProviderAck>(raw).ok())
            .map(|ack| ack.provider_reference)
            .unwrap_or_else(|| payment.transaction_id.clone())
    }

    fn receipt(payment: &Payment, status: PaymentStatus, verified_at: DateTime<Utc>) -> VerifyReceipt {
        VerifyReceipt {
            transaction_id: payment.transaction_id.clone(),
            status,
            amount_cents: payment.amount_cents,
            phone: payment.phone.clone(),
            provider: payment.provider.clone(),
            verified_at,
        }
    }
}

impl std::fmt::Debug for PaymentWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentWorkflow")
            .field("verify_timeout", &self.verify_timeout)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayError, SimulatedGateway};
    use crate::notify::LogSink;
    use async_trait::async_trait;
    use duka_core::{AuditAction, SaleStatus};
    use duka_db::DbConfig;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Gateway wrapper that counts status checks.
    struct CountingGateway {
        outcome: PaymentStatus,
        checks: AtomicUsize,
    }

    impl CountingGateway {
        fn new(outcome: PaymentStatus) -> Arc<Self> {
            Arc::new(CountingGateway {
                outcome,
                checks: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PaymentGateway for CountingGateway {
        async fn initiate(
            &self,
            phone: &str,
            amount: Money,
            provider: &str,
        ) -> Result<ProviderAck, GatewayError> {
            SimulatedGateway::completing()
                .initiate(phone, amount, provider)
                .await
        }

        async fn check_status(&self, _reference: &str) -> Result<PaymentStatus, GatewayError> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            Ok(self.outcome)
        }
    }

    /// Gateway whose status check never resolves (timeout path).
    struct HangingGateway;

    #[async_trait]
    impl PaymentGateway for HangingGateway {
        async fn initiate(
            &self,
            phone: &str,
            amount: Money,
            provider: &str,
        ) -> Result<ProviderAck, GatewayError> {
            SimulatedGateway::completing()
                .initiate(phone, amount, provider)
                .await
        }

        async fn check_status(&self, _reference: &str) -> Result<PaymentStatus, GatewayError> {
            std::future::pending().await
        }
    }

    async fn setup(gateway: Arc<dyn PaymentGateway>) -> (Database, PaymentWorkflow) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let workflow = PaymentWorkflow::new(
            db.clone(),
            gateway,
            Notifier::spawn(Arc::new(LogSink)),
        );
        (db, workflow)
    }

    fn sale_request(cents: i64) -> CreateSaleRequest {
        CreateSaleRequest {
            customer_id: None,
            total_amount: Money::from_cents(cents),
            notes: None,
        }
    }

    fn initiate_request(sale_id: &str) -> InitiatePaymentRequest {
        InitiatePaymentRequest {
            sale_id: sale_id.to_string(),
            phone: "0712345678".to_string(),
            provider: Some("mpesa".to_string()),
            amount: None,
        }
    }

    // -------------------------------------------------------------------------
    // Sale creation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_create_sale_is_pending() {
        let (_db, workflow) = setup(Arc::new(SimulatedGateway::completing())).await;

        let sale = workflow.create_sale(sale_request(4999)).await.unwrap();
        assert_eq!(sale.status, SaleStatus::Pending);
        assert_eq!(sale.total_amount_cents, 4999);
    }

    #[tokio::test]
    async fn test_create_sale_rejects_non_positive_total() {
        let (db, workflow) = setup(Arc::new(SimulatedGateway::completing())).await;

        for cents in [0, -100] {
            let err = workflow.create_sale(sale_request(cents)).await.unwrap_err();
            assert!(matches!(err, WorkflowError::Validation(_)));
        }

        let filter = duka_db::repository::sale::SaleFilter {
            limit: 50,
            ..Default::default()
        };
        assert!(db.sales().list(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_sale_unknown_customer_is_not_found() {
        let (_db, workflow) = setup(Arc::new(SimulatedGateway::completing())).await;

        let err = workflow
            .create_sale(CreateSaleRequest {
                customer_id: Some("ghost".to_string()),
                total_amount: Money::from_cents(1000),
                notes: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { entity: "Customer", .. }));
    }

    // -------------------------------------------------------------------------
    // Initiation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_initiate_defaults_amount_to_sale_total() {
        let (_db, workflow) = setup(Arc::new(SimulatedGateway::completing())).await;
        let sale = workflow.create_sale(sale_request(4999)).await.unwrap();

        let receipt = workflow
            .initiate_payment(initiate_request(&sale.id))
            .await
            .unwrap();
        assert_eq!(receipt.payment.amount_cents, 4999);
        assert_eq!(receipt.acknowledgment.amount_cents, 4999);
        assert_eq!(receipt.payment.status, PaymentStatus::Pending);
        assert_eq!(receipt.acknowledgment.status, PaymentStatus::Pending);
        assert!(receipt.acknowledgment.instructions.contains("0712345678"));
    }

    #[tokio::test]
    async fn test_initiate_honors_explicit_amount() {
        let (_db, workflow) = setup(Arc::new(SimulatedGateway::completing())).await;
        let sale = workflow.create_sale(sale_request(4999)).await.unwrap();

        let receipt = workflow
            .initiate_payment(InitiatePaymentRequest {
                amount: Some(Money::from_cents(2500)),
                ..initiate_request(&sale.id)
            })
            .await
            .unwrap();
        assert_eq!(receipt.payment.amount_cents, 2500);
    }

    #[tokio::test]
    async fn test_initiate_missing_sale_is_not_found_and_writes_nothing() {
        let (db, workflow) = setup(Arc::new(SimulatedGateway::completing())).await;

        let err = workflow
            .initiate_payment(initiate_request("no-such-sale"))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { entity: "Sale", .. }));
        assert_eq!(db.payments().audit_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_initiate_rejects_bad_phone() {
        let (db, workflow) = setup(Arc::new(SimulatedGateway::completing())).await;
        let sale = workflow.create_sale(sale_request(4999)).await.unwrap();

        let err = workflow
            .initiate_payment(InitiatePaymentRequest {
                phone: "not-a-number".to_string(),
                ..initiate_request(&sale.id)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert_eq!(db.payments().audit_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_initiate_does_not_touch_sale() {
        let (db, workflow) = setup(Arc::new(SimulatedGateway::completing())).await;
        let sale = workflow.create_sale(sale_request(4999)).await.unwrap();

        workflow
            .initiate_payment(initiate_request(&sale.id))
            .await
            .unwrap();

        let stored = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SaleStatus::Pending);
    }

    #[tokio::test]
    async fn test_concurrent_style_initiations_get_unique_ids() {
        let (_db, workflow) = setup(Arc::new(SimulatedGateway::completing())).await;
        let sale = workflow.create_sale(sale_request(4999)).await.unwrap();

        let mut ids = HashSet::new();
        for _ in 0..50 {
            let receipt = workflow
                .initiate_payment(initiate_request(&sale.id))
                .await
                .unwrap();
            assert!(ids.insert(receipt.payment.transaction_id));
        }
    }

    // -------------------------------------------------------------------------
    // Verification
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_end_to_end_completed_payment_completes_sale() {
        let (db, workflow) = setup(Arc::new(SimulatedGateway::completing())).await;

        let sale = workflow.create_sale(sale_request(4999)).await.unwrap();
        let receipt = workflow
            .initiate_payment(initiate_request(&sale.id))
            .await
            .unwrap();

        let verified = workflow
            .verify_payment(&receipt.payment.transaction_id)
            .await
            .unwrap();
        assert_eq!(verified.status, PaymentStatus::Completed);
        assert_eq!(verified.amount_cents, 4999);
        assert_eq!(verified.phone, "0712345678");
        assert_eq!(verified.provider, "mpesa");

        let payment = db
            .payments()
            .get_by_id(&receipt.payment.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Completed);

        let sale = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(sale.status, SaleStatus::Completed);

        let trail = db.payments().audit_trail(&payment.id).await.unwrap();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].action, AuditAction::Initiate);
        assert_eq!(trail[1].action, AuditAction::Verify);
    }

    #[tokio::test]
    async fn test_failed_verification_leaves_sale_pending() {
        let (db, workflow) = setup(Arc::new(SimulatedGateway::failing())).await;

        let sale = workflow.create_sale(sale_request(4999)).await.unwrap();
        let receipt = workflow
            .initiate_payment(initiate_request(&sale.id))
            .await
            .unwrap();

        let verified = workflow
            .verify_payment(&receipt.payment.transaction_id)
            .await
            .unwrap();
        assert_eq!(verified.status, PaymentStatus::Failed);

        let sale = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(sale.status, SaleStatus::Pending);
    }

    #[tokio::test]
    async fn test_verify_unknown_transaction_id_writes_no_audit_row() {
        let (db, workflow) = setup(Arc::new(SimulatedGateway::completing())).await;

        let err = workflow.verify_payment("MPESA000NOPE").await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { entity: "Payment", .. }));
        assert_eq!(db.payments().audit_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_verify_empty_transaction_id_is_validation_error() {
        let (_db, workflow) = setup(Arc::new(SimulatedGateway::completing())).await;

        let err = workflow.verify_payment("   ").await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn test_double_verify_is_idempotent_and_audited_per_call() {
        let (db, workflow) = setup(Arc::new(SimulatedGateway::completing())).await;

        let sale = workflow.create_sale(sale_request(4999)).await.unwrap();
        let receipt = workflow
            .initiate_payment(initiate_request(&sale.id))
            .await
            .unwrap();
        let txid = receipt.payment.transaction_id.clone();

        let first = workflow.verify_payment(&txid).await.unwrap();
        let second = workflow.verify_payment(&txid).await.unwrap();
        assert_eq!(first.status, PaymentStatus::Completed);
        assert_eq!(second.status, PaymentStatus::Completed);

        let sale = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(sale.status, SaleStatus::Completed);

        // One initiate row plus one verify row PER call
        let trail = db
            .payments()
            .audit_trail(&receipt.payment.id)
            .await
            .unwrap();
        assert_eq!(trail.len(), 3);
        assert_eq!(
            trail
                .iter()
                .filter(|t| t.action == AuditAction::Verify)
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_terminal_verify_does_not_consult_gateway() {
        let gateway = CountingGateway::new(PaymentStatus::Completed);
        let (_db, workflow) = setup(gateway.clone()).await;

        let sale = workflow.create_sale(sale_request(4999)).await.unwrap();
        let receipt = workflow
            .initiate_payment(initiate_request(&sale.id))
            .await
            .unwrap();
        let txid = receipt.payment.transaction_id.clone();

        workflow.verify_payment(&txid).await.unwrap();
        assert_eq!(gateway.checks.load(Ordering::SeqCst), 1);

        // Second verify: payment is terminal, gateway must not be asked again
        workflow.verify_payment(&txid).await.unwrap();
        assert_eq!(gateway.checks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gateway_timeout_leaves_payment_processing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let workflow = PaymentWorkflow::new(
            db.clone(),
            Arc::new(HangingGateway),
            Notifier::spawn(Arc::new(LogSink)),
        )
        .verify_timeout(Duration::from_millis(50));

        let sale = workflow.create_sale(sale_request(4999)).await.unwrap();
        let receipt = workflow
            .initiate_payment(initiate_request(&sale.id))
            .await
            .unwrap();

        let verified = workflow
            .verify_payment(&receipt.payment.transaction_id)
            .await
            .unwrap();
        assert_eq!(verified.status, PaymentStatus::Processing);

        let payment = db
            .payments()
            .get_by_id(&receipt.payment.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Processing);

        let sale = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(sale.status, SaleStatus::Pending);
    }

    #[tokio::test]
    async fn test_gateway_pending_keeps_payment_pending() {
        let (db, workflow) = setup(Arc::new(SimulatedGateway::returning(
            PaymentStatus::Pending,
        )))
        .await;

        let sale = workflow.create_sale(sale_request(4999)).await.unwrap();
        let receipt = workflow
            .initiate_payment(initiate_request(&sale.id))
            .await
            .unwrap();

        let verified = workflow
            .verify_payment(&receipt.payment.transaction_id)
            .await
            .unwrap();
        assert_eq!(verified.status, PaymentStatus::Pending);

        // Still audited
        let trail = db
            .payments()
            .audit_trail(&receipt.payment.id)
            .await
            .unwrap();
        assert_eq!(trail.len(), 2);
    }

    #[tokio::test]
    async fn test_transaction_id_format() {
        let id = new_transaction_id("mpesa");
        assert!(id.starts_with("MPESA"));
        assert!(id.len() > "MPESA".len() + txid::SUFFIX_LEN);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
