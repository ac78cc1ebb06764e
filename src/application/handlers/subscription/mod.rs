//! Subscription handlers.
//!
//! ## Commands
//! - Create, update, cancel, pause and resume subscriptions
//! - Record payments
//! - Configure reminders
//!
//! ## Queries
//! - Get one subscription / list subscriptions
//! - Upcoming payments and upcoming reminders
//! - Monthly cost

mod cancel_subscription;
mod configure_reminders;
mod create_subscription;
mod get_monthly_cost;
mod get_subscription;
mod get_upcoming_payments;
mod get_upcoming_reminders;
mod list_subscriptions;
mod pause_subscription;
mod record_payment;
mod resume_subscription;
mod update_subscription;

#[cfg(test)]
mod test_support;

use crate::domain::foundation::{CommandMetadata, SerializableDomainEvent, SubscriptionId};
use crate::domain::subscription::{Subscription, SubscriptionError, SubscriptionEvent};
use crate::ports::{EventPublisher, SubscriptionRepository};

// Commands
pub use cancel_subscription::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
};
pub use configure_reminders::{
    ConfigureRemindersCommand, ConfigureRemindersHandler, ConfigureRemindersResult,
};
pub use create_subscription::{
    CreateSubscriptionCommand, CreateSubscriptionHandler, CreateSubscriptionResult,
};
pub use pause_subscription::{
    PauseSubscriptionCommand, PauseSubscriptionHandler, PauseSubscriptionResult,
};
pub use record_payment::{RecordPaymentCommand, RecordPaymentHandler, RecordPaymentResult};
pub use resume_subscription::{
    ResumeSubscriptionCommand, ResumeSubscriptionHandler, ResumeSubscriptionResult,
};
pub use update_subscription::{
    UpdateSubscriptionCommand, UpdateSubscriptionHandler, UpdateSubscriptionResult,
};

// Queries
pub use get_monthly_cost::{GetMonthlyCostHandler, GetMonthlyCostQuery, GetMonthlyCostResult};
pub use get_subscription::{GetSubscriptionHandler, GetSubscriptionQuery, GetSubscriptionResult};
pub use get_upcoming_payments::{
    GetUpcomingPaymentsHandler, GetUpcomingPaymentsQuery, GetUpcomingPaymentsResult,
};
pub use get_upcoming_reminders::{
    GetUpcomingRemindersHandler, GetUpcomingRemindersQuery, GetUpcomingRemindersResult,
};
pub use list_subscriptions::{
    ListSubscriptionsHandler, ListSubscriptionsQuery, ListSubscriptionsResult,
};

/// Bounds for the `days_ahead` parameter of the upcoming queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookaheadLimits {
    pub default_days_ahead: u32,
    pub max_days_ahead: u32,
}

impl LookaheadLimits {
    /// Applies the default when absent and checks `1..=max_days_ahead`.
    pub fn resolve(&self, days_ahead: Option<i64>) -> Result<u32, SubscriptionError> {
        let requested = days_ahead.unwrap_or_else(|| i64::from(self.default_days_ahead));
        if requested < 1 || requested > i64::from(self.max_days_ahead) {
            return Err(SubscriptionError::validation(
                "days_ahead",
                format!("must be between 1 and {}", self.max_days_ahead),
            ));
        }
        Ok(requested as u32)
    }
}

impl Default for LookaheadLimits {
    fn default() -> Self {
        Self {
            default_days_ahead: 30,
            max_days_ahead: 365,
        }
    }
}

/// Loads a subscription or fails with `NotFound`.
async fn load_subscription(
    repository: &dyn SubscriptionRepository,
    id: SubscriptionId,
) -> Result<Subscription, SubscriptionError> {
    repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| SubscriptionError::not_found(id))
}

/// Publishes an event after its change is committed, tagged with the
/// command's correlation ID.
///
/// The change is already durable, so a publish failure is logged and not
/// returned to the caller.
async fn publish_event(
    publisher: &dyn EventPublisher,
    event: &SubscriptionEvent,
    metadata: &CommandMetadata,
) {
    let envelope = match event.to_envelope() {
        Ok(envelope) => envelope.with_correlation_id(metadata.correlation_id()),
        Err(e) => {
            tracing::warn!(subscription_id = %event.subscription_id, error = %e, "Failed to build event envelope");
            return;
        }
    };
    let event_type = envelope.event_type.clone();
    if let Err(e) = publisher.publish(envelope).await {
        tracing::warn!(
            subscription_id = %event.subscription_id,
            event_type = %event_type,
            error = %e,
            "Failed to publish subscription event"
        );
    }
}
