//! Subscription domain module.
//!
//! Recurring charges, their payment history and reminder configuration.
//!
//! # Module Structure
//!
//! - `billing_cycle` - Cadence enum and calendar date engine
//! - `reminder_settings` - ReminderSettings value object
//! - `status` - SubscriptionStatus state machine
//! - `aggregate` - Subscription aggregate
//! - `projections` - Upcoming payments, reminders and monthly cost math

mod aggregate;
mod billing_cycle;
mod errors;
mod events;
mod payment;
mod projections;
mod reminder_settings;
mod status;

pub use aggregate::{
    check_amount, Subscription, SubscriptionTerms, MAX_AMOUNT, MAX_AMOUNT_SCALE, MAX_NAME_LENGTH,
};
pub use billing_cycle::BillingCycle;
pub use errors::SubscriptionError;
pub use events::{SubscriptionEvent, SubscriptionEventKind};
pub use payment::Payment;
pub use projections::{
    annotate_reminders, group_upcoming_payments, summarize_monthly_cost, ActiveCharge,
    CurrencyTotals, DateWindow, MonthlyCostLine, MonthlyCostReport, PaymentDay,
    ScheduledReminder, UpcomingPayment, UpcomingPaymentsReport, UpcomingReminder,
    UpcomingRemindersReport,
};
pub use reminder_settings::{ReminderMethod, ReminderSettings, MAX_DAYS_BEFORE};
pub use status::SubscriptionStatus;
