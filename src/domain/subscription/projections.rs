//! Read-side projection types and the pure math behind them.
//!
//! Readers fetch rows; the functions here window, sort, group and total them
//! so every adapter produces identical reports.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::foundation::{CurrencyCode, ReminderId, SubscriptionId};

use super::{BillingCycle, ReminderMethod, SubscriptionError};

/// Sum of amounts keyed by currency, ordered by currency code.
pub type CurrencyTotals = BTreeMap<CurrencyCode, Decimal>;

/// Inclusive date range `[start, end]` starting today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Window covering `today` through `today + days_ahead`.
    pub fn ahead(today: NaiveDate, days_ahead: u32) -> Option<Self> {
        let end = today.checked_add_days(Days::new(u64::from(days_ahead)))?;
        Some(Self { start: today, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// An Active subscription's next charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingPayment {
    pub subscription_id: SubscriptionId,
    pub name: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub billing_cycle: BillingCycle,
    pub payment_date: NaiveDate,
    pub category: Option<String>,
}

/// All payments due on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentDay {
    pub date: NaiveDate,
    pub payments: Vec<UpcomingPayment>,
    pub totals: CurrencyTotals,
}

/// Upcoming payments grouped by date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingPaymentsReport {
    pub window: DateWindow,
    pub days: Vec<PaymentDay>,
    pub totals: CurrencyTotals,
    pub count: usize,
}

/// A reminder that has not been sent yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledReminder {
    pub id: ReminderId,
    pub subscription_id: SubscriptionId,
    pub subscription_name: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub method: ReminderMethod,
    pub reminder_date: NaiveDate,
    pub payment_date: NaiveDate,
}

/// A scheduled reminder annotated relative to today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingReminder {
    pub reminder_id: ReminderId,
    pub subscription_id: SubscriptionId,
    pub subscription_name: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub method: ReminderMethod,
    pub reminder_date: NaiveDate,
    pub payment_date: NaiveDate,
    pub days_until_reminder: i64,
    pub days_until_payment: i64,
}

/// Upcoming reminders within a window, soonest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingRemindersReport {
    pub window: DateWindow,
    pub reminders: Vec<UpcomingReminder>,
}

/// Input row for the monthly cost report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveCharge {
    pub subscription_id: SubscriptionId,
    pub name: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub billing_cycle: BillingCycle,
}

/// One subscription's contribution to the monthly cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCostLine {
    pub subscription_id: SubscriptionId,
    pub name: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub billing_cycle: BillingCycle,
    pub monthly_amount: Decimal,
}

/// Monthly equivalent cost of all Active subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCostReport {
    pub lines: Vec<MonthlyCostLine>,
    pub totals: CurrencyTotals,
    pub subscription_count: usize,
}

fn add_to_totals(
    totals: &mut CurrencyTotals,
    currency: &CurrencyCode,
    amount: Decimal,
) -> Result<(), SubscriptionError> {
    let total = totals.entry(currency.clone()).or_insert(Decimal::ZERO);
    *total = total.checked_add(amount).ok_or_else(|| {
        SubscriptionError::infrastructure(format!("{} total overflows", currency))
    })?;
    Ok(())
}

/// Keeps payments inside `window`, sorts by date then name, and groups by date.
///
/// # Errors
///
/// `Infrastructure` if a per-currency total overflows.
pub fn group_upcoming_payments(
    window: DateWindow,
    payments: impl IntoIterator<Item = UpcomingPayment>,
) -> Result<UpcomingPaymentsReport, SubscriptionError> {
    let mut payments: Vec<UpcomingPayment> = payments
        .into_iter()
        .filter(|p| window.contains(p.payment_date))
        .collect();
    payments.sort_by(|a, b| {
        a.payment_date
            .cmp(&b.payment_date)
            .then_with(|| a.name.cmp(&b.name))
    });

    let count = payments.len();
    let mut totals = CurrencyTotals::new();
    let mut days: Vec<PaymentDay> = Vec::new();

    for payment in payments {
        add_to_totals(&mut totals, &payment.currency, payment.amount)?;

        match days.last_mut() {
            Some(day) if day.date == payment.payment_date => {
                add_to_totals(&mut day.totals, &payment.currency, payment.amount)?;
                day.payments.push(payment);
            }
            _ => {
                let mut day_totals = CurrencyTotals::new();
                add_to_totals(&mut day_totals, &payment.currency, payment.amount)?;
                days.push(PaymentDay {
                    date: payment.payment_date,
                    payments: vec![payment],
                    totals: day_totals,
                });
            }
        }
    }

    Ok(UpcomingPaymentsReport {
        window,
        days,
        totals,
        count,
    })
}

/// Keeps reminders inside `window`, sorts them and annotates day counts from `window.start`.
pub fn annotate_reminders(
    window: DateWindow,
    reminders: impl IntoIterator<Item = ScheduledReminder>,
) -> UpcomingRemindersReport {
    let today = window.start;
    let mut reminders: Vec<UpcomingReminder> = reminders
        .into_iter()
        .filter(|r| window.contains(r.reminder_date))
        .map(|r| UpcomingReminder {
            days_until_reminder: (r.reminder_date - today).num_days(),
            days_until_payment: (r.payment_date - today).num_days(),
            reminder_id: r.id,
            subscription_id: r.subscription_id,
            subscription_name: r.subscription_name,
            amount: r.amount,
            currency: r.currency,
            method: r.method,
            reminder_date: r.reminder_date,
            payment_date: r.payment_date,
        })
        .collect();
    reminders.sort_by(|a, b| {
        a.reminder_date
            .cmp(&b.reminder_date)
            .then_with(|| a.subscription_name.cmp(&b.subscription_name))
    });

    UpcomingRemindersReport { window, reminders }
}

/// Normalizes each charge to a monthly amount and sums per currency.
///
/// # Errors
///
/// `Infrastructure` if a charge or a per-currency total overflows.
pub fn summarize_monthly_cost(
    charges: impl IntoIterator<Item = ActiveCharge>,
) -> Result<MonthlyCostReport, SubscriptionError> {
    let mut totals = CurrencyTotals::new();
    let mut lines = charges
        .into_iter()
        .map(|c| {
            let monthly_amount = c.billing_cycle.monthly_equivalent(c.amount).ok_or_else(|| {
                SubscriptionError::infrastructure(format!(
                    "monthly cost of subscription {} overflows",
                    c.subscription_id
                ))
            })?;
            Ok(MonthlyCostLine {
                monthly_amount,
                subscription_id: c.subscription_id,
                name: c.name,
                amount: c.amount,
                currency: c.currency,
                billing_cycle: c.billing_cycle,
            })
        })
        .collect::<Result<Vec<_>, SubscriptionError>>()?;
    lines.sort_by(|a, b| a.name.cmp(&b.name));

    for line in &lines {
        add_to_totals(&mut totals, &line.currency, line.monthly_amount)?;
    }

    Ok(MonthlyCostReport {
        subscription_count: lines.len(),
        lines,
        totals,
    })
}
