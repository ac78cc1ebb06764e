//! RecordPaymentHandler - Command handler for recording subscription payments.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, PaymentId, SubscriptionId};
use crate::domain::subscription::{Payment, Subscription, SubscriptionError, SubscriptionEvent};
use crate::ports::{EventPublisher, SubscriptionRepository};

use super::{load_subscription, publish_event};

/// Command to record a payment.
#[derive(Debug, Clone)]
pub struct RecordPaymentCommand {
    pub subscription_id: SubscriptionId,

    /// Caller-supplied id; generated when absent.
    pub payment_id: Option<PaymentId>,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
}

/// Result of a recorded payment.
#[derive(Debug, Clone)]
pub struct RecordPaymentResult {
    pub payment: Payment,
    pub subscription: Subscription,
    pub event: SubscriptionEvent,
}

/// Handler for recording payments.
pub struct RecordPaymentHandler {
    repository: Arc<dyn SubscriptionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl RecordPaymentHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: RecordPaymentCommand,
        metadata: CommandMetadata,
    ) -> Result<RecordPaymentResult, SubscriptionError> {
        let mut subscription =
            load_subscription(self.repository.as_ref(), cmd.subscription_id).await?;

        let payment_id = cmd.payment_id.unwrap_or_default();
        let event =
            subscription.record_payment(payment_id, cmd.amount, cmd.payment_date, cmd.notes)?;

        self.repository.update(&subscription).await?;
        publish_event(self.event_publisher.as_ref(), &event, &metadata).await;

        let payment = subscription
            .payments
            .iter()
            .find(|p| p.id == payment_id)
            .cloned()
            .ok_or_else(|| SubscriptionError::infrastructure("recorded payment missing from aggregate"))?;

        tracing::info!(
            subscription_id = %subscription.id,
            payment_id = %payment_id,
            next_payment_date = ?subscription.next_payment_date,
            "Payment recorded"
        );

        Ok(RecordPaymentResult {
            payment,
            subscription,
            event,
        })
    }
}
