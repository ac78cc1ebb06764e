//! Mock ports shared by the subscription handler tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::sync::Mutex;

use crate::domain::foundation::{
    CommandMetadata, CurrencyCode, DomainError, ErrorCode, EventEnvelope, SubscriptionId,
};
use crate::domain::subscription::{
    ActiveCharge, BillingCycle, DateWindow, ScheduledReminder, Subscription, SubscriptionStatus,
    SubscriptionTerms, UpcomingPayment,
};
use crate::ports::{
    EventPublisher, ReminderReader, SubscriptionReader, SubscriptionRepository,
    SubscriptionSummary, SubscriptionView,
};

// ════════════════════════════════════════════════════════════════════════════
// Mock Implementations
// ════════════════════════════════════════════════════════════════════════════

pub struct MockSubscriptionRepository {
    subscriptions: Mutex<Vec<Subscription>>,
    fail_writes: bool,
}

impl MockSubscriptionRepository {
    pub fn new() -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
            fail_writes: false,
        }
    }

    pub fn with_subscription(subscription: Subscription) -> Self {
        Self {
            subscriptions: Mutex::new(vec![subscription]),
            fail_writes: false,
        }
    }

    pub fn failing_writes(subscription: Option<Subscription>) -> Self {
        Self {
            subscriptions: Mutex::new(subscription.into_iter().collect()),
            fail_writes: true,
        }
    }

    pub fn stored(&self) -> Vec<Subscription> {
        self.subscriptions.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        if self.fail_writes {
            return Err(DomainError::new(ErrorCode::DatabaseError, "Simulated save failure"));
        }
        self.subscriptions.lock().unwrap().push(subscription.clone());
        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        if self.fail_writes {
            return Err(DomainError::new(ErrorCode::DatabaseError, "Simulated update failure"));
        }
        let mut subscriptions = self.subscriptions.lock().unwrap();
        if let Some(s) = subscriptions.iter_mut().find(|s| s.id == subscription.id) {
            *s = subscription.clone();
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .find(|s| &s.id == id)
            .cloned())
    }
}

pub struct MockEventPublisher {
    published_events: Mutex<Vec<EventEnvelope>>,
    fail_publish: bool,
}

impl MockEventPublisher {
    pub fn new() -> Self {
        Self {
            published_events: Mutex::new(Vec::new()),
            fail_publish: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            published_events: Mutex::new(Vec::new()),
            fail_publish: true,
        }
    }

    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.published_events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for MockEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        if self.fail_publish {
            return Err(DomainError::new(ErrorCode::InternalError, "Simulated publish failure"));
        }
        self.published_events.lock().unwrap().push(event);
        Ok(())
    }
}

/// Reader serving canned rows; window filtering is left to the handlers.
pub struct MockSubscriptionReader {
    pub views: Vec<SubscriptionView>,
    pub summaries: Vec<SubscriptionSummary>,
    pub upcoming: Vec<UpcomingPayment>,
    pub charges: Vec<ActiveCharge>,
    pub fail_read: bool,
}

impl MockSubscriptionReader {
    pub fn new() -> Self {
        Self {
            views: Vec::new(),
            summaries: Vec::new(),
            upcoming: Vec::new(),
            charges: Vec::new(),
            fail_read: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_read: true,
            ..Self::new()
        }
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.fail_read {
            return Err(DomainError::new(ErrorCode::DatabaseError, "Simulated read failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriptionReader for MockSubscriptionReader {
    async fn get(&self, id: &SubscriptionId) -> Result<Option<SubscriptionView>, DomainError> {
        self.check()?;
        Ok(self.views.iter().find(|v| &v.id == id).cloned())
    }

    async fn list(
        &self,
        status: Option<SubscriptionStatus>,
    ) -> Result<Vec<SubscriptionSummary>, DomainError> {
        self.check()?;
        Ok(self
            .summaries
            .iter()
            .filter(|s| status.map_or(true, |wanted| s.status == wanted))
            .cloned()
            .collect())
    }

    async fn upcoming_payments(&self, _window: DateWindow) -> Result<Vec<UpcomingPayment>, DomainError> {
        self.check()?;
        Ok(self.upcoming.clone())
    }

    async fn active_charges(&self) -> Result<Vec<ActiveCharge>, DomainError> {
        self.check()?;
        Ok(self.charges.clone())
    }
}

pub struct MockReminderReader {
    pub reminders: Vec<ScheduledReminder>,
    pub fail_read: bool,
}

#[async_trait]
impl ReminderReader for MockReminderReader {
    async fn pending_reminders(&self, _window: DateWindow) -> Result<Vec<ScheduledReminder>, DomainError> {
        if self.fail_read {
            return Err(DomainError::new(ErrorCode::DatabaseError, "Simulated read failure"));
        }
        Ok(self.reminders.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Test Helpers
// ════════════════════════════════════════════════════════════════════════════

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn test_terms(cycle: BillingCycle) -> SubscriptionTerms {
    SubscriptionTerms {
        name: "Streaming".to_string(),
        description: "Family plan".to_string(),
        amount: dec!(12.99),
        currency: CurrencyCode::new("USD").unwrap(),
        billing_cycle: cycle,
        website: None,
        category: Some("entertainment".to_string()),
    }
}

/// Monthly subscription started 2024-01-15.
pub fn monthly_subscription() -> Subscription {
    Subscription::create(
        SubscriptionId::new(),
        test_terms(BillingCycle::Monthly),
        date(2024, 1, 15),
    )
    .unwrap()
    .0
}

pub fn usd() -> CurrencyCode {
    CurrencyCode::new("USD").unwrap()
}

pub fn metadata() -> CommandMetadata {
    CommandMetadata::new()
        .with_correlation_id("test-correlation")
        .with_source("test")
}
