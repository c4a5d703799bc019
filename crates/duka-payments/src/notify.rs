//! # Payment Notifications
//!
//! Fire-and-forget notification of verification outcomes.
//!
//! ## Design
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  verify_payment()                                                       │
//! │       │ completed / failed                                              │
//! │       ▼                                                                 │
//! │  Notifier::notify ── try_send ──► bounded channel ──► spawned task     │
//! │       │                                                    │            │
//! │       │ channel full? drop + warn,                         ▼            │
//! │       │ NEVER block the workflow                 dyn NotificationSink   │
//! │       ▼                                          (log, email, webhook)  │
//! │  verification response returns immediately                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Delivery is best-effort: a lost notification costs a customer email, a
//! blocked verification costs a request.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use duka_core::PaymentStatus;

/// Queue depth before notifications are dropped.
const CHANNEL_CAPACITY: usize = 64;

// =============================================================================
// Notification Types
// =============================================================================

/// Payload emitted when a verification resolves `completed` or `failed`.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentNotification {
    pub transaction_id: String,
    pub amount_cents: i64,
    pub status: PaymentStatus,
    pub provider: String,
}

/// Receiving end of the notification channel.
///
/// The shipped implementation logs; an email or webhook sink slots in at
/// construction without touching the workflow.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &PaymentNotification);
}

/// Sink that records outcomes to the log.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, notification: &PaymentNotification) {
        info!(
            transaction_id = %notification.transaction_id,
            status = ?notification.status,
            amount = notification.amount_cents,
            provider = %notification.provider,
            "Payment outcome notification"
        );
    }
}

// =============================================================================
// Notifier
// =============================================================================

/// Handle for emitting payment notifications.
///
/// Cheap to clone; all clones feed the same spawned consumer task. The task
/// ends when every handle is dropped.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::Sender<PaymentNotification>,
}

impl Notifier {
    /// Spawns the consumer task for `sink` and returns the sending handle.
    pub fn spawn(sink: Arc<dyn NotificationSink>) -> Notifier {
        let (tx, mut rx) = mpsc::channel::<PaymentNotification>(CHANNEL_CAPACITY);

        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                sink.deliver(&notification).await;
            }
        });

        Notifier { tx }
    }

    /// Emits a notification without waiting.
    ///
    /// A full queue drops the notification with a warning rather than
    /// applying backpressure to the verification path.
    pub fn notify(&self, notification: PaymentNotification) {
        if let Err(err) = self.tx.try_send(notification) {
            warn!(%err, "Dropping payment notification");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
