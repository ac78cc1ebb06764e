//! CreateSubscriptionHandler - Command handler for adding subscriptions.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, SubscriptionId};
use crate::domain::subscription::{
    Subscription, SubscriptionError, SubscriptionEvent, SubscriptionTerms,
};
use crate::ports::{EventPublisher, SubscriptionRepository};

use super::publish_event;

/// Command to add a subscription.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionCommand {
    pub terms: SubscriptionTerms,
    pub start_date: NaiveDate,
}

/// Result of successful subscription creation.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionResult {
    pub subscription: Subscription,
    pub event: SubscriptionEvent,
}

/// Handler for adding subscriptions.
pub struct CreateSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CreateSubscriptionHandler {
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
        cmd: CreateSubscriptionCommand,
        metadata: CommandMetadata,
    ) -> Result<CreateSubscriptionResult, SubscriptionError> {
        let (subscription, event) =
            Subscription::create(SubscriptionId::new(), cmd.terms, cmd.start_date)?;

        self.repository.save(&subscription).await?;
        publish_event(self.event_publisher.as_ref(), &event, &metadata).await;

        tracing::info!(
            subscription_id = %subscription.id,
            billing_cycle = %subscription.billing_cycle,
            "Subscription created"
        );

        Ok(CreateSubscriptionResult {
            subscription,
            event,
        })
    }
}
