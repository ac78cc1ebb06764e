//! Subscription domain events.
//!
//! Every aggregate mutator returns the event describing what changed. Events
//! are named in past tense and published through the event publisher port;
//! they are not stored or replayed.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    CurrencyCode, DomainEvent, EventId, PaymentId, SubscriptionId, Timestamp,
};

use super::{BillingCycle, ReminderSettings};

/// Event emitted by a subscription state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionEvent {
    pub event_id: EventId,
    pub subscription_id: SubscriptionId,
    pub occurred_at: Timestamp,
    #[serde(flatten)]
    pub kind: SubscriptionEventKind,
}

/// What happened to the subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubscriptionEventKind {
    Created {
        name: String,
        amount: Decimal,
        currency: CurrencyCode,
        billing_cycle: BillingCycle,
        start_date: NaiveDate,
        next_payment_date: Option<NaiveDate>,
    },

    Updated {
        name: String,
        amount: Decimal,
        currency: CurrencyCode,
        billing_cycle: BillingCycle,
        next_payment_date: Option<NaiveDate>,
    },

    Cancelled {
        end_date: NaiveDate,
    },

    PaymentRecorded {
        payment_id: PaymentId,
        amount: Decimal,
        payment_date: NaiveDate,
        next_payment_date: Option<NaiveDate>,
    },

    RemindersConfigured {
        settings: ReminderSettings,
    },

    Paused,

    Resumed {
        next_payment_date: Option<NaiveDate>,
    },
}

impl SubscriptionEvent {
    pub fn new(subscription_id: SubscriptionId, kind: SubscriptionEventKind) -> Self {
        Self {
            event_id: EventId::new(),
            subscription_id,
            occurred_at: Timestamp::now(),
            kind,
        }
    }
}

impl DomainEvent for SubscriptionEvent {
    fn event_type(&self) -> &'static str {
        match self.kind {
            SubscriptionEventKind::Created { .. } => "subscription.created.v1",
            SubscriptionEventKind::Updated { .. } => "subscription.updated.v1",
            SubscriptionEventKind::Cancelled { .. } => "subscription.cancelled.v1",
            SubscriptionEventKind::PaymentRecorded { .. } => "subscription.payment_recorded.v1",
            SubscriptionEventKind::RemindersConfigured { .. } => {
                "subscription.reminders_configured.v1"
            }
            SubscriptionEventKind::Paused => "subscription.paused.v1",
            SubscriptionEventKind::Resumed { .. } => "subscription.resumed.v1",
        }
    }

    fn aggregate_id(&self) -> String {
        self.subscription_id.to_string()
    }

    fn aggregate_type(&self) -> &'static str {
        "Subscription"
    }

    fn occurred_at(&self) -> Timestamp {
        self.occurred_at
    }

    fn event_id(&self) -> EventId {
        self.event_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SerializableDomainEvent;

    #[test]
    fn envelope_carries_type_and_aggregate() {
        let id = SubscriptionId::new();
        let event = SubscriptionEvent::new(
            id,
            SubscriptionEventKind::Cancelled {
                end_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            },
        );

        let envelope = event.to_envelope().unwrap();
        assert_eq!(envelope.event_type, "subscription.cancelled.v1");
        assert_eq!(envelope.aggregate_type, "Subscription");
        assert_eq!(envelope.aggregate_id, id.to_string());
        assert_eq!(envelope.payload["type"], "cancelled");
        assert_eq!(envelope.payload["end_date"], "2024-03-01");
    }

    #[test]
    fn payload_deserializes_back_to_event() {
        let event = SubscriptionEvent::new(SubscriptionId::new(), SubscriptionEventKind::Paused);
        let envelope = event.to_envelope().unwrap();
        let back: SubscriptionEvent = envelope.payload_as().unwrap();
        assert_eq!(back, event);
    }
}
