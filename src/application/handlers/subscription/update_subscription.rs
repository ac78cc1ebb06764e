//! UpdateSubscriptionHandler - Command handler for changing subscription terms.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, SubscriptionId};
use crate::domain::subscription::{
    Subscription, SubscriptionError, SubscriptionEvent, SubscriptionTerms,
};
use crate::ports::{EventPublisher, SubscriptionRepository};

use super::{load_subscription, publish_event};

/// Command to replace a subscription's descriptive and billing terms.
#[derive(Debug, Clone)]
pub struct UpdateSubscriptionCommand {
    pub subscription_id: SubscriptionId,
    pub terms: SubscriptionTerms,
}

/// Result of a successful update.
#[derive(Debug, Clone)]
pub struct UpdateSubscriptionResult {
    pub subscription: Subscription,
    pub event: SubscriptionEvent,
}

/// Handler for updating subscriptions.
pub struct UpdateSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl UpdateSubscriptionHandler {
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
        cmd: UpdateSubscriptionCommand,
        metadata: CommandMetadata,
    ) -> Result<UpdateSubscriptionResult, SubscriptionError> {
        let mut subscription =
            load_subscription(self.repository.as_ref(), cmd.subscription_id).await?;

        let event = subscription.update(cmd.terms)?;

        self.repository.update(&subscription).await?;
        publish_event(self.event_publisher.as_ref(), &event, &metadata).await;

        Ok(UpdateSubscriptionResult {
            subscription,
            event,
        })
    }
}
