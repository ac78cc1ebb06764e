//! ConfigureRemindersHandler - Command handler for payment reminder settings.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, SubscriptionId};
use crate::domain::subscription::{
    ReminderMethod, Subscription, SubscriptionError, SubscriptionEvent,
};
use crate::ports::{EventPublisher, SubscriptionRepository};

use super::{load_subscription, publish_event};

/// Command to replace a subscription's reminder settings.
#[derive(Debug, Clone)]
pub struct ConfigureRemindersCommand {
    pub subscription_id: SubscriptionId,
    pub days_before: i64,
    pub enabled: bool,
    pub method: ReminderMethod,
}

/// Result of configuring reminders.
#[derive(Debug, Clone)]
pub struct ConfigureRemindersResult {
    pub subscription: Subscription,
    pub event: SubscriptionEvent,
}

/// Handler for configuring reminders.
///
/// Saving the subscription refreshes its scheduled reminder.
pub struct ConfigureRemindersHandler {
    repository: Arc<dyn SubscriptionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ConfigureRemindersHandler {
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
        cmd: ConfigureRemindersCommand,
        metadata: CommandMetadata,
    ) -> Result<ConfigureRemindersResult, SubscriptionError> {
        let mut subscription =
            load_subscription(self.repository.as_ref(), cmd.subscription_id).await?;

        let event = subscription.configure_reminders(cmd.days_before, cmd.enabled, cmd.method)?;

        self.repository.update(&subscription).await?;
        publish_event(self.event_publisher.as_ref(), &event, &metadata).await;

        Ok(ConfigureRemindersResult {
            subscription,
            event,
        })
    }
}
