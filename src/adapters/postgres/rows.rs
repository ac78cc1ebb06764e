//! Row types shared by the subscription repository and readers.
//!
//! Enum columns are stored as their snake_case names; parsing a stored value
//! that no longer maps to a variant is a `DatabaseError`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::foundation::{
    CurrencyCode, DomainError, ErrorCode, PaymentId, SubscriptionId, Timestamp,
};
use crate::domain::subscription::{
    BillingCycle, Payment, ReminderMethod, ReminderSettings, Subscription, SubscriptionStatus,
};
use crate::ports::{PaymentView, SubscriptionView};

pub(super) const SUBSCRIPTION_COLUMNS: &str = r#"
    id, name, description, amount, currency, billing_cycle, start_date, end_date,
    status, next_payment_date, website, category,
    reminder_days_before, reminder_enabled, reminder_method,
    created_at, updated_at, version
"#;

/// Database row for the subscriptions table.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct SubscriptionRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub amount: Decimal,
    pub currency: String,
    pub billing_cycle: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: String,
    pub next_payment_date: Option<NaiveDate>,
    pub website: Option<String>,
    pub category: Option<String>,
    pub reminder_days_before: Option<i32>,
    pub reminder_enabled: Option<bool>,
    pub reminder_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

/// Database row for the subscription_payments table.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct PaymentRow {
    pub id: Uuid,
    pub subscription_id: Uuid,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

fn corrupt(column: &str, value: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} value: {}", column, value),
    )
}

pub(super) fn parse_billing_cycle(s: &str) -> Result<BillingCycle, DomainError> {
    s.parse().map_err(|_| corrupt("billing_cycle", s))
}

pub(super) fn parse_status(s: &str) -> Result<SubscriptionStatus, DomainError> {
    s.parse().map_err(|_| corrupt("status", s))
}

pub(super) fn parse_method(s: &str) -> Result<ReminderMethod, DomainError> {
    s.parse().map_err(|_| corrupt("reminder_method", s))
}

pub(super) fn parse_currency(s: &str) -> Result<CurrencyCode, DomainError> {
    CurrencyCode::new(s).map_err(|_| corrupt("currency", s))
}

/// Rebuilds reminder settings from the three nullable reminder columns.
///
/// All three are written together; a partial set reads as "not configured".
fn parse_reminder_settings(
    days_before: Option<i32>,
    enabled: Option<bool>,
    method: Option<&str>,
) -> Result<Option<ReminderSettings>, DomainError> {
    let (Some(days_before), Some(enabled), Some(method)) = (days_before, enabled, method) else {
        return Ok(None);
    };
    let method = parse_method(method)?;
    ReminderSettings::new(i64::from(days_before), enabled, method)
        .map(Some)
        .map_err(|_| corrupt("reminder_days_before", days_before))
}

/// Splits reminder settings into the column values written by the repository.
pub(super) fn reminder_columns(
    settings: Option<ReminderSettings>,
) -> (Option<i32>, Option<bool>, Option<&'static str>) {
    match settings {
        Some(s) => (
            i32::try_from(s.days_before()).ok(),
            Some(s.is_enabled()),
            Some(s.method().as_str()),
        ),
        None => (None, None, None),
    }
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Payment {
            id: PaymentId::from_uuid(row.id),
            subscription_id: SubscriptionId::from_uuid(row.subscription_id),
            amount: row.amount,
            payment_date: row.payment_date,
            notes: row.notes,
            recorded_at: Timestamp::from_datetime(row.recorded_at),
        }
    }
}

impl From<PaymentRow> for PaymentView {
    fn from(row: PaymentRow) -> Self {
        PaymentView {
            id: PaymentId::from_uuid(row.id),
            amount: row.amount,
            payment_date: row.payment_date,
            notes: row.notes,
            recorded_at: Timestamp::from_datetime(row.recorded_at),
        }
    }
}

impl SubscriptionRow {
    /// Rehydrates the aggregate; `payments` must belong to this subscription.
    pub fn into_subscription(self, payments: Vec<PaymentRow>) -> Result<Subscription, DomainError> {
        let reminder_settings = parse_reminder_settings(
            self.reminder_days_before,
            self.reminder_enabled,
            self.reminder_method.as_deref(),
        )?;

        Ok(Subscription {
            id: SubscriptionId::from_uuid(self.id),
            name: self.name,
            description: self.description,
            amount: self.amount,
            currency: parse_currency(&self.currency)?,
            billing_cycle: parse_billing_cycle(&self.billing_cycle)?,
            start_date: self.start_date,
            end_date: self.end_date,
            status: parse_status(&self.status)?,
            payments: payments.into_iter().map(Payment::from).collect(),
            next_payment_date: self.next_payment_date,
            website: self.website,
            category: self.category,
            reminder_settings,
            created_at: Timestamp::from_datetime(self.created_at),
            updated_at: Timestamp::from_datetime(self.updated_at),
            version: self.version,
        })
    }

    /// Builds the read-side view; `payments` are expected most recent first.
    pub fn into_view(self, payments: Vec<PaymentRow>) -> Result<SubscriptionView, DomainError> {
        let billing_cycle = parse_billing_cycle(&self.billing_cycle)?;
        let reminder_settings = parse_reminder_settings(
            self.reminder_days_before,
            self.reminder_enabled,
            self.reminder_method.as_deref(),
        )?;

        Ok(SubscriptionView {
            id: SubscriptionId::from_uuid(self.id),
            name: self.name,
            description: self.description,
            amount: self.amount,
            currency: parse_currency(&self.currency)?,
            billing_cycle,
            start_date: self.start_date,
            end_date: self.end_date,
            status: parse_status(&self.status)?,
            next_payment_date: self.next_payment_date,
            website: self.website,
            category: self.category,
            reminder_settings,
            monthly_cost: billing_cycle
                .monthly_equivalent(self.amount)
                .ok_or_else(|| corrupt("amount", self.amount))?,
            payments: payments.into_iter().map(PaymentView::from).collect(),
            created_at: Timestamp::from_datetime(self.created_at),
            updated_at: Timestamp::from_datetime(self.updated_at),
        })
    }
}
