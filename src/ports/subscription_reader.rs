//! Subscription reader port (read side / CQRS queries).
//!
//! Queries read stored projections directly and never load the aggregate.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::foundation::{CurrencyCode, DomainError, PaymentId, SubscriptionId, Timestamp};
use crate::domain::subscription::{
    ActiveCharge, BillingCycle, DateWindow, ReminderSettings, SubscriptionStatus, UpcomingPayment,
};
use async_trait::async_trait;

/// Reader port for subscription queries.
#[async_trait]
pub trait SubscriptionReader: Send + Sync {
    /// Get the detailed view of one subscription.
    ///
    /// Returns `None` if not found.
    async fn get(&self, id: &SubscriptionId) -> Result<Option<SubscriptionView>, DomainError>;

    /// List subscriptions ordered by name, optionally filtered by status.
    async fn list(
        &self,
        status: Option<SubscriptionStatus>,
    ) -> Result<Vec<SubscriptionSummary>, DomainError>;

    /// Active subscriptions whose next payment date falls inside `window`.
    ///
    /// Ordering is not guaranteed; callers group and sort.
    async fn upcoming_payments(&self, window: DateWindow) -> Result<Vec<UpcomingPayment>, DomainError>;

    /// Billing terms of every Active subscription.
    async fn active_charges(&self) -> Result<Vec<ActiveCharge>, DomainError>;
}

/// Detailed view of a subscription for UI display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionView {
    pub id: SubscriptionId,
    pub name: String,
    pub description: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub billing_cycle: BillingCycle,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: SubscriptionStatus,
    pub next_payment_date: Option<NaiveDate>,
    pub website: Option<String>,
    pub category: Option<String>,
    pub reminder_settings: Option<ReminderSettings>,

    /// Amount normalized to a monthly figure.
    pub monthly_cost: Decimal,

    /// Payments, most recent first.
    pub payments: Vec<PaymentView>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A recorded payment as shown to the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentView {
    pub id: PaymentId,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
    pub recorded_at: Timestamp,
}

/// Summary row for subscription lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionSummary {
    pub id: SubscriptionId,
    pub name: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub billing_cycle: BillingCycle,
    pub status: SubscriptionStatus,
    pub next_payment_date: Option<NaiveDate>,
    pub category: Option<String>,
}
