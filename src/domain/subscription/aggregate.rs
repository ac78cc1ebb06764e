//! Subscription aggregate entity.
//!
//! A Subscription is a recurring charge the owner tracks: its billing terms,
//! the payments recorded against it, and how they want to be reminded.
//!
//! # Design Decisions
//!
//! - **Money as Decimal**: amounts are `rust_decimal::Decimal`, never floats
//! - **Calendar dates**: billing dates are `NaiveDate` with no time of day
//! - **Soft lifecycle**: subscriptions are cancelled, never deleted
//! - **Mutators return events**: each state change yields a `SubscriptionEvent`

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    CurrencyCode, PaymentId, StateMachine, SubscriptionId, Timestamp,
};

use super::{
    BillingCycle, Payment, ReminderMethod, ReminderSettings, SubscriptionError,
    SubscriptionEvent, SubscriptionEventKind, SubscriptionStatus,
};

/// Longest accepted subscription name.
pub const MAX_NAME_LENGTH: usize = 255;

/// Largest accepted charge or payment amount (one trillion).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Most decimal places accepted on a charge or payment amount.
pub const MAX_AMOUNT_SCALE: u32 = 2;

/// Checks that `amount` is a non-negative figure within [`MAX_AMOUNT`] and
/// [`MAX_AMOUNT_SCALE`] decimal places.
pub fn check_amount(amount: Decimal) -> Result<(), SubscriptionError> {
    if amount < Decimal::ZERO {
        return Err(SubscriptionError::invalid_argument("amount", "must not be negative"));
    }
    if amount > MAX_AMOUNT {
        return Err(SubscriptionError::invalid_argument(
            "amount",
            format!("must be at most {}", MAX_AMOUNT),
        ));
    }
    if amount.normalize().scale() > MAX_AMOUNT_SCALE {
        return Err(SubscriptionError::invalid_argument(
            "amount",
            format!("must have at most {} decimal places", MAX_AMOUNT_SCALE),
        ));
    }
    Ok(())
}

/// Descriptive and billing terms shared by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionTerms {
    pub name: String,
    pub description: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub billing_cycle: BillingCycle,
    pub website: Option<String>,
    pub category: Option<String>,
}

impl SubscriptionTerms {
    fn validate(&self) -> Result<(), SubscriptionError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(SubscriptionError::invalid_argument("name", "must not be empty"));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(SubscriptionError::invalid_argument(
                "name",
                format!("must be at most {} characters", MAX_NAME_LENGTH),
            ));
        }
        check_amount(self.amount)
    }
}

/// Subscription aggregate.
///
/// # Invariants
///
/// - `next_payment_date` is `None` when `status` is Cancelled
/// - otherwise it is the billing cycle's next occurrence after the later of
///   the latest payment date and `start_date`
/// - payments are append-only and their ids are unique
/// - `end_date`, when set, is not before `start_date`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub name: String,
    pub description: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub billing_cycle: BillingCycle,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: SubscriptionStatus,
    pub payments: Vec<Payment>,
    pub next_payment_date: Option<NaiveDate>,
    pub website: Option<String>,
    pub category: Option<String>,
    pub reminder_settings: Option<ReminderSettings>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,

    /// Persistence version for optimistic concurrency; managed by repositories.
    pub version: i64,
}

impl Subscription {
    /// Creates a new Active subscription billed from `start_date`.
    pub fn create(
        id: SubscriptionId,
        terms: SubscriptionTerms,
        start_date: NaiveDate,
    ) -> Result<(Self, SubscriptionEvent), SubscriptionError> {
        terms.validate()?;

        let now = Timestamp::now();
        let mut subscription = Self {
            id,
            name: terms.name.trim().to_string(),
            description: terms.description,
            amount: terms.amount,
            currency: terms.currency,
            billing_cycle: terms.billing_cycle,
            start_date,
            end_date: None,
            status: SubscriptionStatus::Active,
            payments: Vec::new(),
            next_payment_date: None,
            website: terms.website,
            category: terms.category,
            reminder_settings: None,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        subscription.next_payment_date =
            subscription.next_payment_date_for(subscription.billing_cycle)?;

        let event = SubscriptionEvent::new(
            id,
            SubscriptionEventKind::Created {
                name: subscription.name.clone(),
                amount: subscription.amount,
                currency: subscription.currency.clone(),
                billing_cycle: subscription.billing_cycle,
                start_date,
                next_payment_date: subscription.next_payment_date,
            },
        );
        Ok((subscription, event))
    }

    /// Replaces descriptive and billing terms, recomputing the next payment date.
    ///
    /// # Errors
    ///
    /// `InvalidState` if cancelled; `InvalidArgument` for bad terms.
    pub fn update(&mut self, terms: SubscriptionTerms) -> Result<SubscriptionEvent, SubscriptionError> {
        self.ensure_not_cancelled("update")?;
        terms.validate()?;

        let next_payment_date = self.next_payment_date_for(terms.billing_cycle)?;

        self.billing_cycle = terms.billing_cycle;
        self.name = terms.name.trim().to_string();
        self.description = terms.description;
        self.amount = terms.amount;
        self.currency = terms.currency;
        self.website = terms.website;
        self.category = terms.category;
        self.next_payment_date = next_payment_date;
        self.touch();

        Ok(self.event(SubscriptionEventKind::Updated {
            name: self.name.clone(),
            amount: self.amount,
            currency: self.currency.clone(),
            billing_cycle: self.billing_cycle,
            next_payment_date: self.next_payment_date,
        }))
    }

    /// Cancels the subscription effective `end_date`.
    ///
    /// # Errors
    ///
    /// `InvalidState` if already cancelled; `InvalidArgument` if `end_date`
    /// precedes the start date.
    pub fn cancel(&mut self, end_date: NaiveDate) -> Result<SubscriptionEvent, SubscriptionError> {
        self.ensure_not_cancelled("cancel")?;
        if end_date < self.start_date {
            return Err(SubscriptionError::invalid_argument(
                "end_date",
                format!("must not be before start date {}", self.start_date),
            ));
        }

        self.transition_to(SubscriptionStatus::Cancelled, "cancel")?;
        self.end_date = Some(end_date);
        self.next_payment_date = None;
        self.touch();

        Ok(self.event(SubscriptionEventKind::Cancelled { end_date }))
    }

    /// Appends a payment and advances the next payment date.
    ///
    /// # Errors
    ///
    /// `InvalidState` if cancelled; `InvalidArgument` for an amount outside
    /// [`check_amount`] or a payment id that was already recorded.
    pub fn record_payment(
        &mut self,
        payment_id: PaymentId,
        amount: Decimal,
        payment_date: NaiveDate,
        notes: Option<String>,
    ) -> Result<SubscriptionEvent, SubscriptionError> {
        self.ensure_not_cancelled("record a payment for")?;
        check_amount(amount)?;
        if self.payments.iter().any(|p| p.id == payment_id) {
            return Err(SubscriptionError::invalid_argument(
                "payment_id",
                format!("payment {} is already recorded", payment_id),
            ));
        }

        let anchor = self
            .last_payment_date()
            .map_or(payment_date, |last| last.max(payment_date))
            .max(self.start_date);
        let next_payment_date = Self::next_after(self.billing_cycle, anchor)?;

        self.payments.push(Payment {
            id: payment_id,
            subscription_id: self.id,
            amount,
            payment_date,
            notes,
            recorded_at: Timestamp::now(),
        });
        self.next_payment_date = Some(next_payment_date);
        self.touch();

        Ok(self.event(SubscriptionEventKind::PaymentRecorded {
            payment_id,
            amount,
            payment_date,
            next_payment_date: self.next_payment_date,
        }))
    }

    /// Replaces reminder settings wholesale.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `days_before` is below 1 or above the supported maximum.
    pub fn configure_reminders(
        &mut self,
        days_before: i64,
        enabled: bool,
        method: ReminderMethod,
    ) -> Result<SubscriptionEvent, SubscriptionError> {
        let settings = ReminderSettings::new(days_before, enabled, method)
            .map_err(|e| SubscriptionError::invalid_argument(e.field().to_string(), e.to_string()))?;

        self.reminder_settings = Some(settings);
        self.touch();

        Ok(self.event(SubscriptionEventKind::RemindersConfigured { settings }))
    }

    /// Puts an Active subscription on hold.
    pub fn pause(&mut self) -> Result<SubscriptionEvent, SubscriptionError> {
        self.transition_to(SubscriptionStatus::Paused, "pause")?;
        self.touch();
        Ok(self.event(SubscriptionEventKind::Paused))
    }

    /// Returns a Paused subscription to Active and recomputes its next payment date.
    pub fn resume(&mut self) -> Result<SubscriptionEvent, SubscriptionError> {
        if self.status != SubscriptionStatus::Paused {
            return Err(SubscriptionError::invalid_state(self.status, "resume"));
        }
        let next_payment_date = self.next_payment_date_for(self.billing_cycle)?;

        self.transition_to(SubscriptionStatus::Active, "resume")?;
        self.next_payment_date = next_payment_date;
        self.touch();

        Ok(self.event(SubscriptionEventKind::Resumed {
            next_payment_date: self.next_payment_date,
        }))
    }

    /// Date of the most recent payment, if any.
    pub fn last_payment_date(&self) -> Option<NaiveDate> {
        self.payments.iter().map(|p| p.payment_date).max()
    }

    /// Amount normalized to a monthly figure.
    ///
    /// # Errors
    ///
    /// `Infrastructure` if the stored amount is too large to normalize.
    pub fn monthly_cost(&self) -> Result<Decimal, SubscriptionError> {
        self.billing_cycle
            .monthly_equivalent(self.amount)
            .ok_or_else(|| {
                SubscriptionError::infrastructure(format!(
                    "monthly cost of subscription {} overflows",
                    self.id
                ))
            })
    }

    /// The pending reminder as `(reminder_date, payment_date)`.
    ///
    /// Present only for Active subscriptions with reminders enabled and a
    /// known next payment date.
    pub fn pending_reminder(&self) -> Option<(NaiveDate, NaiveDate)> {
        if self.status != SubscriptionStatus::Active {
            return None;
        }
        let settings = self.reminder_settings.filter(ReminderSettings::is_enabled)?;
        let payment_date = self.next_payment_date?;
        Some((settings.reminder_date(payment_date)?, payment_date))
    }

    fn next_payment_date_for(
        &self,
        cycle: BillingCycle,
    ) -> Result<Option<NaiveDate>, SubscriptionError> {
        if self.status == SubscriptionStatus::Cancelled {
            return Ok(None);
        }
        let anchor = self
            .last_payment_date()
            .map_or(self.start_date, |last| last.max(self.start_date));
        Self::next_after(cycle, anchor).map(Some)
    }

    fn next_after(cycle: BillingCycle, anchor: NaiveDate) -> Result<NaiveDate, SubscriptionError> {
        cycle.next_occurrence(anchor).ok_or_else(|| {
            SubscriptionError::invalid_argument(
                "billing_cycle",
                format!("no {} occurrence after {} in the supported calendar", cycle, anchor),
            )
        })
    }

    fn ensure_not_cancelled(&self, attempted: &str) -> Result<(), SubscriptionError> {
        if self.status == SubscriptionStatus::Cancelled {
            return Err(SubscriptionError::invalid_state(self.status, attempted));
        }
        Ok(())
    }

    fn transition_to(
        &mut self,
        target: SubscriptionStatus,
        attempted: &str,
    ) -> Result<(), SubscriptionError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|_| SubscriptionError::invalid_state(self.status, attempted))?;
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }

    fn event(&self, kind: SubscriptionEventKind) -> SubscriptionEvent {
        SubscriptionEvent::new(self.id, kind)
    }
}
