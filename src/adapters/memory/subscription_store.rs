//! In-memory subscription store.
//!
//! Implements the write port and both read ports over the same maps, keeping
//! the reminder projection in step with every save the way the Postgres
//! adapter does inside its transaction.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, ReminderId, SubscriptionId};
use crate::domain::subscription::{
    ActiveCharge, DateWindow, ReminderMethod, ScheduledReminder, Subscription,
    SubscriptionStatus, UpcomingPayment,
};
use crate::ports::{
    PaymentView, ReminderReader, SubscriptionReader, SubscriptionRepository, SubscriptionSummary,
    SubscriptionView,
};

#[derive(Debug, Clone)]
struct ReminderEntry {
    id: ReminderId,
    reminder_date: NaiveDate,
    payment_date: NaiveDate,
    method: ReminderMethod,
}

#[derive(Debug, Default)]
struct StoreState {
    subscriptions: HashMap<SubscriptionId, Subscription>,
    reminders: HashMap<SubscriptionId, ReminderEntry>,
}

impl StoreState {
    /// Payment ids are unique across all subscriptions.
    fn check_payment_owners(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let taken = subscription.payments.iter().find(|payment| {
            self.subscriptions.values().any(|other| {
                other.id != subscription.id && other.payments.iter().any(|p| p.id == payment.id)
            })
        });
        match taken {
            Some(payment) => Err(DomainError::duplicate_payment(payment.id)),
            None => Ok(()),
        }
    }

    fn sync_reminder(&mut self, subscription: &Subscription) {
        let pending = subscription
            .pending_reminder()
            .zip(subscription.reminder_settings);

        match pending {
            Some(((reminder_date, payment_date), settings)) => {
                let unchanged = self.reminders.get(&subscription.id).is_some_and(|r| {
                    r.reminder_date == reminder_date
                        && r.payment_date == payment_date
                        && r.method == settings.method()
                });
                if !unchanged {
                    self.reminders.insert(
                        subscription.id,
                        ReminderEntry {
                            id: ReminderId::new(),
                            reminder_date,
                            payment_date,
                            method: settings.method(),
                        },
                    );
                }
            }
            None => {
                self.reminders.remove(&subscription.id);
            }
        }
    }
}

/// Shared in-memory store; clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriptionStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored subscriptions.
    pub async fn len(&self) -> usize {
        self.state.read().await.subscriptions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn to_view(subscription: &Subscription) -> Result<SubscriptionView, DomainError> {
    let mut payments: Vec<PaymentView> = subscription
        .payments
        .iter()
        .map(|p| PaymentView {
            id: p.id,
            amount: p.amount,
            payment_date: p.payment_date,
            notes: p.notes.clone(),
            recorded_at: p.recorded_at,
        })
        .collect();
    payments.sort_by_key(|p| Reverse((p.payment_date, p.recorded_at)));

    Ok(SubscriptionView {
        id: subscription.id,
        name: subscription.name.clone(),
        description: subscription.description.clone(),
        amount: subscription.amount,
        currency: subscription.currency.clone(),
        billing_cycle: subscription.billing_cycle,
        start_date: subscription.start_date,
        end_date: subscription.end_date,
        status: subscription.status,
        next_payment_date: subscription.next_payment_date,
        website: subscription.website.clone(),
        category: subscription.category.clone(),
        reminder_settings: subscription.reminder_settings,
        monthly_cost: subscription.monthly_cost()?,
        payments,
        created_at: subscription.created_at,
        updated_at: subscription.updated_at,
    })
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionStore {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if state.subscriptions.contains_key(&subscription.id) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                format!("Subscription {} already exists", subscription.id),
            ));
        }
        state.check_payment_owners(subscription)?;
        state.sync_reminder(subscription);
        state
            .subscriptions
            .insert(subscription.id, subscription.clone());
        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let stored_version = state
            .subscriptions
            .get(&subscription.id)
            .map(|s| s.version)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::SubscriptionNotFound, "Subscription not found")
            })?;

        if stored_version != subscription.version {
            return Err(DomainError::new(
                ErrorCode::ConcurrentModification,
                "Subscription was modified concurrently",
            )
            .with_detail("expected_version", subscription.version.to_string())
            .with_detail("stored_version", stored_version.to_string()));
        }

        state.check_payment_owners(subscription)?;

        let mut stored = subscription.clone();
        stored.version += 1;
        state.sync_reminder(&stored);
        state.subscriptions.insert(stored.id, stored);
        Ok(())
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        Ok(self.state.read().await.subscriptions.get(id).cloned())
    }
}

#[async_trait]
impl SubscriptionReader for InMemorySubscriptionStore {
    async fn get(&self, id: &SubscriptionId) -> Result<Option<SubscriptionView>, DomainError> {
        self.state.read().await.subscriptions.get(id).map(to_view).transpose()
    }

    async fn list(
        &self,
        status: Option<SubscriptionStatus>,
    ) -> Result<Vec<SubscriptionSummary>, DomainError> {
        let state = self.state.read().await;
        let mut summaries: Vec<SubscriptionSummary> = state
            .subscriptions
            .values()
            .filter(|s| status.map_or(true, |wanted| s.status == wanted))
            .map(|s| SubscriptionSummary {
                id: s.id,
                name: s.name.clone(),
                amount: s.amount,
                currency: s.currency.clone(),
                billing_cycle: s.billing_cycle,
                status: s.status,
                next_payment_date: s.next_payment_date,
                category: s.category.clone(),
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(summaries)
    }

    async fn upcoming_payments(&self, window: DateWindow) -> Result<Vec<UpcomingPayment>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .subscriptions
            .values()
            .filter(|s| s.status == SubscriptionStatus::Active)
            .filter_map(|s| {
                let payment_date = s.next_payment_date.filter(|d| window.contains(*d))?;
                Some(UpcomingPayment {
                    subscription_id: s.id,
                    name: s.name.clone(),
                    amount: s.amount,
                    currency: s.currency.clone(),
                    billing_cycle: s.billing_cycle,
                    payment_date,
                    category: s.category.clone(),
                })
            })
            .collect())
    }

    async fn active_charges(&self) -> Result<Vec<ActiveCharge>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .subscriptions
            .values()
            .filter(|s| s.status == SubscriptionStatus::Active)
            .map(|s| ActiveCharge {
                subscription_id: s.id,
                name: s.name.clone(),
                amount: s.amount,
                currency: s.currency.clone(),
                billing_cycle: s.billing_cycle,
            })
            .collect())
    }
}

#[async_trait]
impl ReminderReader for InMemorySubscriptionStore {
    async fn pending_reminders(&self, window: DateWindow) -> Result<Vec<ScheduledReminder>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .reminders
            .iter()
            .filter(|(_, r)| window.contains(r.reminder_date))
            .filter_map(|(id, r)| {
                let s = state.subscriptions.get(id)?;
                Some(ScheduledReminder {
                    id: r.id,
                    subscription_id: s.id,
                    subscription_name: s.name.clone(),
                    amount: s.amount,
                    currency: s.currency.clone(),
                    method: r.method,
                    reminder_date: r.reminder_date,
                    payment_date: r.payment_date,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CurrencyCode, PaymentId};
    use crate::domain::subscription::{BillingCycle, SubscriptionTerms};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn subscription(name: &str, cycle: BillingCycle, start: NaiveDate) -> Subscription {
        let terms = SubscriptionTerms {
            name: name.to_string(),
            description: String::new(),
            amount: dec!(10),
            currency: CurrencyCode::new("USD").unwrap(),
            billing_cycle: cycle,
            website: None,
            category: None,
        };
        Subscription::create(SubscriptionId::new(), terms, start).unwrap().0
    }

    #[tokio::test]
    async fn save_then_find_returns_same_aggregate() {
        let store = InMemorySubscriptionStore::new();
        let sub = subscription("Streaming", BillingCycle::Monthly, date(2024, 1, 15));

        store.save(&sub).await.unwrap();

        assert_eq!(store.find_by_id(&sub.id).await.unwrap(), Some(sub));
    }

    #[tokio::test]
    async fn save_rejects_duplicate_id() {
        let store = InMemorySubscriptionStore::new();
        let sub = subscription("Streaming", BillingCycle::Monthly, date(2024, 1, 15));
        store.save(&sub).await.unwrap();

        let err = store.save(&sub).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[tokio::test]
    async fn update_bumps_version_and_detects_stale_writes() {
        let store = InMemorySubscriptionStore::new();
        let sub = subscription("Streaming", BillingCycle::Monthly, date(2024, 1, 15));
        store.save(&sub).await.unwrap();

        let mut first = store.find_by_id(&sub.id).await.unwrap().unwrap();
        let mut stale = first.clone();
        first.pause().unwrap();
        store.update(&first).await.unwrap();

        stale.cancel(date(2024, 3, 1)).unwrap();
        let err = store.update(&stale).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConcurrentModification);

        let stored = store.find_by_id(&sub.id).await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.status, SubscriptionStatus::Paused);
    }

    #[tokio::test]
    async fn update_missing_subscription_is_not_found() {
        let store = InMemorySubscriptionStore::new();
        let sub = subscription("Streaming", BillingCycle::Monthly, date(2024, 1, 15));

        let err = store.update(&sub).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SubscriptionNotFound);
    }

    #[tokio::test]
    async fn payment_id_of_another_subscription_is_rejected() {
        let store = InMemorySubscriptionStore::new();
        let payment_id = PaymentId::new();

        let mut first = subscription("Streaming", BillingCycle::Monthly, date(2024, 1, 15));
        first
            .record_payment(payment_id, dec!(10), date(2024, 2, 15), None)
            .unwrap();
        store.save(&first).await.unwrap();

        let second = subscription("Music", BillingCycle::Monthly, date(2024, 1, 15));
        store.save(&second).await.unwrap();

        let mut reused = store.find_by_id(&second.id).await.unwrap().unwrap();
        reused
            .record_payment(payment_id, dec!(10), date(2024, 2, 15), None)
            .unwrap();
        let err = store.update(&reused).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicatePayment);

        let stored = store.find_by_id(&second.id).await.unwrap().unwrap();
        assert!(stored.payments.is_empty());
        assert_eq!(stored.version, 0);
        assert_eq!(stored.next_payment_date, Some(date(2024, 2, 15)));
    }

    #[tokio::test]
    async fn resaving_own_payments_is_allowed() {
        let store = InMemorySubscriptionStore::new();
        let mut sub = subscription("Streaming", BillingCycle::Monthly, date(2024, 1, 15));
        sub.record_payment(PaymentId::new(), dec!(10), date(2024, 2, 15), None)
            .unwrap();
        store.save(&sub).await.unwrap();

        let mut loaded = store.find_by_id(&sub.id).await.unwrap().unwrap();
        loaded
            .record_payment(PaymentId::new(), dec!(10), date(2024, 3, 15), None)
            .unwrap();
        store.update(&loaded).await.unwrap();

        let stored = store.find_by_id(&sub.id).await.unwrap().unwrap();
        assert_eq!(stored.payments.len(), 2);
    }

    #[tokio::test]
    async fn list_orders_by_name_and_filters_status() {
        let store = InMemorySubscriptionStore::new();
        let mut gym = subscription("Gym", BillingCycle::Monthly, date(2024, 1, 1));
        let backup = subscription("Backup", BillingCycle::Annually, date(2024, 1, 1));
        gym.pause().unwrap();
        store.save(&gym).await.unwrap();
        store.save(&backup).await.unwrap();

        let all = store.list(None).await.unwrap();
        let names: Vec<_> = all.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Backup", "Gym"]);

        let paused = store.list(Some(SubscriptionStatus::Paused)).await.unwrap();
        assert_eq!(paused.len(), 1);
        assert_eq!(paused[0].name, "Gym");
    }

    #[tokio::test]
    async fn upcoming_payments_skip_paused_and_out_of_window() {
        let store = InMemorySubscriptionStore::new();
        let soon = subscription("Soon", BillingCycle::Weekly, date(2024, 1, 1));
        let far = subscription("Far", BillingCycle::Quarterly, date(2024, 1, 1));
        let mut paused = subscription("Paused", BillingCycle::Weekly, date(2024, 1, 1));
        paused.pause().unwrap();
        for s in [&soon, &far, &paused] {
            store.save(s).await.unwrap();
        }

        let window = DateWindow::ahead(date(2024, 1, 1), 30).unwrap();
        let upcoming = store.upcoming_payments(window).await.unwrap();

        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].name, "Soon");
        assert_eq!(upcoming[0].payment_date, date(2024, 1, 8));
    }

    #[tokio::test]
    async fn view_lists_payments_most_recent_first() {
        let store = InMemorySubscriptionStore::new();
        let mut sub = subscription("Streaming", BillingCycle::Monthly, date(2024, 1, 15));
        sub.record_payment(PaymentId::new(), dec!(10), date(2024, 2, 15), None)
            .unwrap();
        sub.record_payment(PaymentId::new(), dec!(10), date(2024, 3, 15), None)
            .unwrap();
        store.save(&sub).await.unwrap();

        let view = store.get(&sub.id).await.unwrap().unwrap();
        assert_eq!(view.payments[0].payment_date, date(2024, 3, 15));
        assert_eq!(view.next_payment_date, Some(date(2024, 4, 15)));
    }

    #[tokio::test]
    async fn reminder_projection_follows_configuration_and_cancellation() {
        let store = InMemorySubscriptionStore::new();
        let mut sub = subscription("Streaming", BillingCycle::Monthly, date(2024, 1, 15));
        sub.configure_reminders(3, true, ReminderMethod::Email).unwrap();
        store.save(&sub).await.unwrap();

        let window = DateWindow::ahead(date(2024, 2, 1), 30).unwrap();
        let reminders = store.pending_reminders(window).await.unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].reminder_date, date(2024, 2, 12));
        assert_eq!(reminders[0].payment_date, date(2024, 2, 15));

        sub.cancel(date(2024, 2, 1)).unwrap();
        store.update(&sub).await.unwrap();
        assert!(store.pending_reminders(window).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn disabled_reminders_are_not_scheduled() {
        let store = InMemorySubscriptionStore::new();
        let mut sub = subscription("Streaming", BillingCycle::Monthly, date(2024, 1, 15));
        sub.configure_reminders(3, false, ReminderMethod::Push).unwrap();
        store.save(&sub).await.unwrap();

        let window = DateWindow::ahead(date(2024, 2, 1), 30).unwrap();
        assert!(store.pending_reminders(window).await.unwrap().is_empty());
    }
}
