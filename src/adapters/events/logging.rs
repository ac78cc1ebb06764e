//! Event publisher that writes envelopes to the tracing pipeline.
//!
//! Used by the server binary, where there is no downstream consumer yet and
//! the log stream is the audit trail.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::EventPublisher;

/// Publishes each event as an `info` record on the `lifeos::events` target.
#[derive(Debug, Clone, Default)]
pub struct LoggingEventPublisher;

impl LoggingEventPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for LoggingEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        tracing::info!(
            target: "lifeos::events",
            event_id = %event.event_id,
            event_type = %event.event_type,
            aggregate_type = %event.aggregate_type,
            aggregate_id = %event.aggregate_id,
            correlation_id = event.metadata.correlation_id.as_deref().unwrap_or(""),
            payload = %event.payload,
            "domain event published"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{EventId, EventMetadata, Timestamp};

    #[tokio::test]
    async fn publish_never_fails() {
        let publisher = LoggingEventPublisher::new();
        let envelope = EventEnvelope {
            event_id: EventId::new(),
            event_type: "subscription.cancelled.v1".to_string(),
            schema_version: 1,
            aggregate_id: "sub-1".to_string(),
            aggregate_type: "Subscription".to_string(),
            occurred_at: Timestamp::now(),
            payload: serde_json::json!({ "end_date": "2024-03-01" }),
            metadata: EventMetadata::default(),
        };

        assert!(publisher.publish(envelope).await.is_ok());
    }
}
