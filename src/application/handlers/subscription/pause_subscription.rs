//! PauseSubscriptionHandler - Command handler for putting a subscription on hold.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, SubscriptionId};
use crate::domain::subscription::{Subscription, SubscriptionError, SubscriptionEvent};
use crate::ports::{EventPublisher, SubscriptionRepository};

use super::{load_subscription, publish_event};

/// Command to pause an Active subscription.
#[derive(Debug, Clone)]
pub struct PauseSubscriptionCommand {
    pub subscription_id: SubscriptionId,
}

/// Result of pausing.
#[derive(Debug, Clone)]
pub struct PauseSubscriptionResult {
    pub subscription: Subscription,
    pub event: SubscriptionEvent,
}

/// Handler for pausing subscriptions.
pub struct PauseSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl PauseSubscriptionHandler {
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
        cmd: PauseSubscriptionCommand,
        metadata: CommandMetadata,
    ) -> Result<PauseSubscriptionResult, SubscriptionError> {
        let mut subscription =
            load_subscription(self.repository.as_ref(), cmd.subscription_id).await?;

        let event = subscription.pause()?;

        self.repository.update(&subscription).await?;
        publish_event(self.event_publisher.as_ref(), &event, &metadata).await;

        Ok(PauseSubscriptionResult {
            subscription,
            event,
        })
    }
}
