//! HTTP DTOs (Data Transfer Objects) for subscription endpoints.
//!
//! Request bodies are deserialized loosely and then checked field by field so
//! that every malformed or missing field is reported at once.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::application::handlers::subscription::{
    CreateSubscriptionCommand, RecordPaymentResult,
};
use crate::domain::foundation::{CurrencyCode, PaymentId, SubscriptionId, Timestamp};
use crate::domain::subscription::{
    BillingCycle, ReminderMethod, ReminderSettings, Subscription, SubscriptionError,
    SubscriptionStatus, SubscriptionTerms, MAX_AMOUNT, MAX_AMOUNT_SCALE,
};
use crate::ports::SubscriptionSummary;

/// Messages per request field, ordered by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

// ════════════════════════════════════════════════════════════════════════════════
// Field Validation
// ════════════════════════════════════════════════════════════════════════════════

/// Collects per-field errors while converting raw request values.
#[derive(Debug, Default)]
pub struct FieldValidator {
    errors: FieldErrors,
}

impl FieldValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Required non-blank string.
    pub fn required_text(&mut self, field: &str, value: Option<String>) -> Option<String> {
        match value {
            Some(v) if !v.trim().is_empty() => Some(v),
            _ => {
                self.add(field, format!("The {} field is required.", field));
                None
            }
        }
    }

    /// Amount given as a JSON number or a decimal string.
    pub fn amount(&mut self, field: &str, value: Option<Value>) -> Option<Decimal> {
        let parsed = match value {
            None | Some(Value::Null) => {
                self.add(field, format!("The {} field is required.", field));
                return None;
            }
            Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
                .or_else(|_| Decimal::from_scientific(&n.to_string())),
            Some(Value::String(s)) => Decimal::from_str(s.trim()),
            Some(_) => {
                self.add(field, format!("The {} field must be a number.", field));
                return None;
            }
        };
        let amount = match parsed {
            Ok(amount) => amount,
            Err(_) => {
                self.add(field, format!("The {} field must be a number.", field));
                return None;
            }
        };
        if amount > MAX_AMOUNT {
            self.add(
                field,
                format!("The {} field must not be greater than {}.", field, MAX_AMOUNT),
            );
            return None;
        }
        if amount.normalize().scale() > MAX_AMOUNT_SCALE {
            self.add(
                field,
                format!(
                    "The {} field must not have more than {} decimal places.",
                    field, MAX_AMOUNT_SCALE
                ),
            );
            return None;
        }
        Some(amount)
    }

    /// Required `YYYY-MM-DD` date.
    pub fn date(&mut self, field: &str, value: Option<String>) -> Option<NaiveDate> {
        let raw = self.required_text(field, value)?;
        match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.add(field, format!("The {} field must be a date in YYYY-MM-DD format.", field));
                None
            }
        }
    }

    /// Required value parsed with `FromStr`.
    pub fn parsed<T: FromStr>(&mut self, field: &str, value: Option<String>) -> Option<T> {
        let raw = self.required_text(field, value)?;
        match raw.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                self.add(field, format!("The selected {} is invalid.", field));
                None
            }
        }
    }

    /// Optional value parsed with `FromStr`; absent or blank yields `None`.
    pub fn optional_parsed<T: FromStr>(&mut self, field: &str, value: Option<String>) -> Option<T> {
        match value {
            Some(v) if !v.trim().is_empty() => self.parsed(field, Some(v)),
            _ => None,
        }
    }

    /// Whole-number value given as a JSON integer or a numeric string.
    pub fn integer(&mut self, field: &str, value: Option<Value>) -> Option<i64> {
        let parsed = match value {
            None | Some(Value::Null) => {
                self.add(field, format!("The {} field is required.", field));
                return None;
            }
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            Some(_) => None,
        };
        if parsed.is_none() {
            self.add(field, format!("The {} field must be an integer.", field));
        }
        parsed
    }

    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to add a subscription.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Value>,
    pub currency: Option<String>,
    pub billing_cycle: Option<String>,
    pub start_date: Option<String>,
    pub website: Option<String>,
    pub category: Option<String>,
}

impl CreateSubscriptionRequest {
    pub fn into_command(self) -> Result<CreateSubscriptionCommand, FieldErrors> {
        let mut v = FieldValidator::new();
        let start_date = v.date("start_date", self.start_date);
        let terms = TermsFields {
            name: self.name,
            description: self.description,
            amount: self.amount,
            currency: self.currency,
            billing_cycle: self.billing_cycle,
            website: self.website,
            category: self.category,
        }
        .validate(&mut v);
        v.finish()?;

        match (terms, start_date) {
            (Some(terms), Some(start_date)) => Ok(CreateSubscriptionCommand { terms, start_date }),
            _ => Err(FieldErrors::new()),
        }
    }
}

/// Request to change a subscription's descriptive and billing fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSubscriptionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Value>,
    pub currency: Option<String>,
    pub billing_cycle: Option<String>,
    pub website: Option<String>,
    pub category: Option<String>,
}

impl UpdateSubscriptionRequest {
    pub fn into_terms(self) -> Result<SubscriptionTerms, FieldErrors> {
        let mut v = FieldValidator::new();
        let terms = TermsFields {
            name: self.name,
            description: self.description,
            amount: self.amount,
            currency: self.currency,
            billing_cycle: self.billing_cycle,
            website: self.website,
            category: self.category,
        }
        .validate(&mut v);
        v.finish()?;
        terms.ok_or_else(FieldErrors::new)
    }
}

struct TermsFields {
    name: Option<String>,
    description: Option<String>,
    amount: Option<Value>,
    currency: Option<String>,
    billing_cycle: Option<String>,
    website: Option<String>,
    category: Option<String>,
}

impl TermsFields {
    fn validate(self, v: &mut FieldValidator) -> Option<SubscriptionTerms> {
        let name = v.required_text("name", self.name);
        let amount = v.amount("amount", self.amount);
        let currency: Option<CurrencyCode> = v.parsed("currency", self.currency);
        let billing_cycle: Option<BillingCycle> = v.parsed("billing_cycle", self.billing_cycle);

        Some(SubscriptionTerms {
            name: name?,
            description: self.description.unwrap_or_default(),
            amount: amount?,
            currency: currency?,
            billing_cycle: billing_cycle?,
            website: blank_to_none(self.website),
            category: blank_to_none(self.category),
        })
    }
}

/// Request to cancel a subscription.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelSubscriptionRequest {
    pub end_date: Option<String>,
}

impl CancelSubscriptionRequest {
    pub fn into_end_date(self) -> Result<NaiveDate, FieldErrors> {
        let mut v = FieldValidator::new();
        let end_date = v.date("end_date", self.end_date);
        v.finish()?;
        end_date.ok_or_else(FieldErrors::new)
    }
}

/// Request to record a payment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordPaymentRequest {
    /// Optional client-generated id; a repeated id is rejected.
    pub payment_id: Option<String>,
    pub amount: Option<Value>,
    pub payment_date: Option<String>,
    pub notes: Option<String>,
}

/// Validated payment fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentFields {
    pub payment_id: Option<PaymentId>,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
}

impl RecordPaymentRequest {
    pub fn into_fields(self) -> Result<PaymentFields, FieldErrors> {
        let mut v = FieldValidator::new();
        let payment_id = v.optional_parsed("payment_id", self.payment_id);
        let amount = v.amount("amount", self.amount);
        let payment_date = v.date("payment_date", self.payment_date);
        v.finish()?;

        match (amount, payment_date) {
            (Some(amount), Some(payment_date)) => Ok(PaymentFields {
                payment_id,
                amount,
                payment_date,
                notes: blank_to_none(self.notes),
            }),
            _ => Err(FieldErrors::new()),
        }
    }
}

/// Request to configure payment reminders.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigureRemindersRequest {
    pub days_before: Option<Value>,
    pub enabled: Option<bool>,
    pub method: Option<String>,
}

/// Validated reminder fields; range checks stay with the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderFields {
    pub days_before: i64,
    pub enabled: bool,
    pub method: ReminderMethod,
}

impl ConfigureRemindersRequest {
    /// `enabled` defaults to true and `method` to `default_method`.
    pub fn into_fields(self, default_method: ReminderMethod) -> Result<ReminderFields, FieldErrors> {
        let mut v = FieldValidator::new();
        let days_before = v.integer("days_before", self.days_before);
        let method = match self.method {
            Some(m) => v.parsed("method", Some(m)),
            None => Some(default_method),
        };
        v.finish()?;

        match (days_before, method) {
            (Some(days_before), Some(method)) => Ok(ReminderFields {
                days_before,
                enabled: self.enabled.unwrap_or(true),
                method,
            }),
            _ => Err(FieldErrors::new()),
        }
    }
}

/// Query string for the upcoming payments and reminders endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookaheadParams {
    pub days_ahead: Option<String>,
}

impl LookaheadParams {
    pub fn days_ahead(self) -> Result<Option<i64>, FieldErrors> {
        let mut v = FieldValidator::new();
        let days_ahead = match self.days_ahead {
            Some(raw) => v.integer("days_ahead", Some(Value::String(raw))),
            None => None,
        };
        v.finish()?;
        Ok(days_ahead)
    }
}

/// Query string for the list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
}

impl ListParams {
    pub fn status(self) -> Result<Option<SubscriptionStatus>, FieldErrors> {
        let mut v = FieldValidator::new();
        let status = v.optional_parsed("status", self.status);
        v.finish()?;
        Ok(status)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// A subscription as returned by command endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
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
    pub monthly_cost: Decimal,
    pub payment_count: usize,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<Subscription> for SubscriptionResponse {
    type Error = SubscriptionError;

    fn try_from(s: Subscription) -> Result<Self, Self::Error> {
        Ok(Self {
            monthly_cost: s.monthly_cost()?,
            payment_count: s.payments.len(),
            id: s.id,
            name: s.name,
            description: s.description,
            amount: s.amount,
            currency: s.currency,
            billing_cycle: s.billing_cycle,
            start_date: s.start_date,
            end_date: s.end_date,
            status: s.status,
            next_payment_date: s.next_payment_date,
            website: s.website,
            category: s.category,
            reminder_settings: s.reminder_settings,
            created_at: s.created_at,
            updated_at: s.updated_at,
        })
    }
}

/// Body of the list endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionListResponse {
    pub subscriptions: Vec<SubscriptionSummary>,
    pub count: usize,
}

impl From<Vec<SubscriptionSummary>> for SubscriptionListResponse {
    fn from(subscriptions: Vec<SubscriptionSummary>) -> Self {
        Self {
            count: subscriptions.len(),
            subscriptions,
        }
    }
}

/// A recorded payment and the subscription's new next payment date.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentResponse {
    pub id: PaymentId,
    pub subscription_id: SubscriptionId,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
    pub recorded_at: Timestamp,
    pub next_payment_date: Option<NaiveDate>,
}

impl From<RecordPaymentResult> for PaymentResponse {
    fn from(result: RecordPaymentResult) -> Self {
        Self {
            id: result.payment.id,
            subscription_id: result.payment.subscription_id,
            amount: result.payment.amount,
            payment_date: result.payment.payment_date,
            notes: result.payment.notes,
            recorded_at: result.payment.recorded_at,
            next_payment_date: result.subscription.next_payment_date,
        }
    }
}

/// Body of 422 responses.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub message: String,
    pub errors: FieldErrors,
}

impl ValidationErrorResponse {
    /// Uses the first field message as the summary, like `"... (and 2 more errors)"`.
    pub fn new(errors: FieldErrors) -> Self {
        let total: usize = errors.values().map(Vec::len).sum();
        let first = errors
            .values()
            .flat_map(|messages| messages.iter())
            .next()
            .cloned()
            .unwrap_or_else(|| "The given data was invalid.".to_string());
        let message = match total {
            0 | 1 => first,
            2 => format!("{} (and 1 more error)", first),
            n => format!("{} (and {} more errors)", first, n - 1),
        };
        Self { message, errors }
    }
}

/// Body of all other error responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_code: error_code.into(),
        }
    }
}
