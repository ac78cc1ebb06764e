//! ResumeSubscriptionHandler - Command handler for reactivating a paused subscription.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, SubscriptionId};
use crate::domain::subscription::{Subscription, SubscriptionError, SubscriptionEvent};
use crate::ports::{EventPublisher, SubscriptionRepository};

use super::{load_subscription, publish_event};

/// Command to resume a Paused subscription.
#[derive(Debug, Clone)]
pub struct ResumeSubscriptionCommand {
    pub subscription_id: SubscriptionId,
}

/// Result of resuming.
#[derive(Debug, Clone)]
pub struct ResumeSubscriptionResult {
    pub subscription: Subscription,
    pub event: SubscriptionEvent,
}

/// Handler for resuming subscriptions.
pub struct ResumeSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ResumeSubscriptionHandler {
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
        cmd: ResumeSubscriptionCommand,
        metadata: CommandMetadata,
    ) -> Result<ResumeSubscriptionResult, SubscriptionError> {
        let mut subscription =
            load_subscription(self.repository.as_ref(), cmd.subscription_id).await?;

        let event = subscription.resume()?;

        self.repository.update(&subscription).await?;
        publish_event(self.event_publisher.as_ref(), &event, &metadata).await;

        Ok(ResumeSubscriptionResult {
            subscription,
            event,
        })
    }
}
