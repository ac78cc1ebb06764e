//! CancelSubscriptionHandler - Command handler for cancelling subscriptions.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, SubscriptionId};
use crate::domain::subscription::{Subscription, SubscriptionError, SubscriptionEvent};
use crate::ports::{EventPublisher, SubscriptionRepository};

use super::{load_subscription, publish_event};

/// Command to cancel a subscription.
#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub subscription_id: SubscriptionId,
    pub end_date: NaiveDate,
}

/// Result of successful cancellation.
#[derive(Debug, Clone)]
pub struct CancelSubscriptionResult {
    pub subscription: Subscription,
    pub event: SubscriptionEvent,
}

/// Handler for cancelling subscriptions.
///
/// Cancellation is terminal: the next payment date is cleared and the
/// subscription drops out of every upcoming projection.
pub struct CancelSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CancelSubscriptionHandler {
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
        cmd: CancelSubscriptionCommand,
        metadata: CommandMetadata,
    ) -> Result<CancelSubscriptionResult, SubscriptionError> {
        // 1. Load the aggregate
        let mut subscription =
            load_subscription(self.repository.as_ref(), cmd.subscription_id).await?;

        // 2. Cancel (domain logic)
        let event = subscription.cancel(cmd.end_date)?;

        // 3. Persist, then publish
        self.repository.update(&subscription).await?;
        publish_event(self.event_publisher.as_ref(), &event, &metadata).await;

        tracing::info!(
            subscription_id = %subscription.id,
            end_date = %cmd.end_date,
            "Subscription cancelled"
        );

        Ok(CancelSubscriptionResult {
            subscription,
            event,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::subscription::test_support::*;
    use crate::domain::subscription::SubscriptionStatus;

    #[tokio::test]
    async fn cancels_active_subscription() {
        let subscription = monthly_subscription();
        let id = subscription.id;
        let repo = Arc::new(MockSubscriptionRepository::with_subscription(subscription));
        let publisher = Arc::new(MockEventPublisher::new());
        let handler = CancelSubscriptionHandler::new(repo.clone(), publisher.clone());

        let result = handler
            .handle(
                CancelSubscriptionCommand {
                    subscription_id: id,
                    end_date: date(2024, 3, 1),
                },
                metadata(),
            )
            .await
            .unwrap();

        assert_eq!(result.subscription.status, SubscriptionStatus::Cancelled);
        assert_eq!(result.subscription.next_payment_date, None);

        let stored = &repo.stored()[0];
        assert_eq!(stored.status, SubscriptionStatus::Cancelled);
        assert_eq!(stored.end_date, Some(date(2024, 3, 1)));
        assert_eq!(publisher.published_events()[0].event_type, "subscription.cancelled.v1");
    }

    #[tokio::test]
    async fn second_cancel_fails_with_invalid_state() {
        let subscription = monthly_subscription();
        let id = subscription.id;
        let repo = Arc::new(MockSubscriptionRepository::with_subscription(subscription));
        let publisher = Arc::new(MockEventPublisher::new());
        let handler = CancelSubscriptionHandler::new(repo, publisher.clone());

        let cmd = CancelSubscriptionCommand {
            subscription_id: id,
            end_date: date(2024, 3, 1),
        };
        handler.handle(cmd.clone(), metadata()).await.unwrap();
        let err = handler.handle(cmd, metadata()).await.unwrap_err();

        assert!(matches!(err, SubscriptionError::InvalidState { .. }));
        assert_eq!(publisher.published_events().len(), 1);
    }

    #[tokio::test]
    async fn event_gets_generated_correlation_id_when_none_given() {
        let subscription = monthly_subscription();
        let id = subscription.id;
        let repo = Arc::new(MockSubscriptionRepository::with_subscription(subscription));
        let publisher = Arc::new(MockEventPublisher::new());
        let handler = CancelSubscriptionHandler::new(repo, publisher.clone());

        handler
            .handle(
                CancelSubscriptionCommand {
                    subscription_id: id,
                    end_date: date(2024, 3, 1),
                },
                CommandMetadata::new(),
            )
            .await
            .unwrap();

        let events = publisher.published_events();
        let correlation_id = events[0].metadata.correlation_id.as_deref().unwrap();
        assert!(uuid::Uuid::parse_str(correlation_id).is_ok());
    }

    #[tokio::test]
    async fn returns_not_found_for_unknown_subscription() {
        let handler = CancelSubscriptionHandler::new(
            Arc::new(MockSubscriptionRepository::new()),
            Arc::new(MockEventPublisher::new()),
        );

        let err = handler
            .handle(
                CancelSubscriptionCommand {
                    subscription_id: SubscriptionId::new(),
                    end_date: date(2024, 3, 1),
                },
                metadata(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::NotFound(_)));
    }

    #[tokio::test]
    async fn fails_when_update_fails() {
        let subscription = monthly_subscription();
        let id = subscription.id;
        let publisher = Arc::new(MockEventPublisher::new());
        let handler = CancelSubscriptionHandler::new(
            Arc::new(MockSubscriptionRepository::failing_writes(Some(subscription))),
            publisher.clone(),
        );

        let err = handler
            .handle(
                CancelSubscriptionCommand {
                    subscription_id: id,
                    end_date: date(2024, 3, 1),
                },
                metadata(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::Infrastructure { .. }));
        assert!(publisher.published_events().is_empty());
    }
}
