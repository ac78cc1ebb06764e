//! Reminder configuration value object.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Channel a payment reminder is delivered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderMethod {
    Email,
    Sms,
    Push,
    InApp,
}

impl ReminderMethod {
    pub const ALL: [ReminderMethod; 4] = [
        ReminderMethod::Email,
        ReminderMethod::Sms,
        ReminderMethod::Push,
        ReminderMethod::InApp,
    ];

    /// Returns the wire and storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderMethod::Email => "email",
            ReminderMethod::Sms => "sms",
            ReminderMethod::Push => "push",
            ReminderMethod::InApp => "in_app",
        }
    }
}

impl fmt::Display for ReminderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ReminderMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == normalized)
            .ok_or_else(|| {
                ValidationError::invalid_format(
                    "method",
                    format!("must be one of email, sms, push, in_app; got '{}'", s),
                )
            })
    }
}

/// Longest supported lead time between reminder and payment.
pub const MAX_DAYS_BEFORE: i64 = 365;

/// How and when the owner wants to be reminded before a payment.
///
/// Immutable: the `with_*` helpers build a replacement value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawReminderSettings")]
pub struct ReminderSettings {
    days_before: u32,
    enabled: bool,
    method: ReminderMethod,
}

#[derive(Deserialize)]
struct RawReminderSettings {
    days_before: i64,
    enabled: bool,
    method: ReminderMethod,
}

impl TryFrom<RawReminderSettings> for ReminderSettings {
    type Error = ValidationError;

    fn try_from(raw: RawReminderSettings) -> Result<Self, Self::Error> {
        Self::new(raw.days_before, raw.enabled, raw.method)
    }
}

impl ReminderSettings {
    /// Creates reminder settings, requiring `1 <= days_before <= 365`.
    pub fn new(days_before: i64, enabled: bool, method: ReminderMethod) -> Result<Self, ValidationError> {
        let days_before = Self::validate_days_before(days_before)?;
        Ok(Self {
            days_before,
            enabled,
            method,
        })
    }

    fn validate_days_before(days_before: i64) -> Result<u32, ValidationError> {
        if !(1..=MAX_DAYS_BEFORE).contains(&days_before) {
            return Err(ValidationError::out_of_range(
                "days_before",
                1,
                MAX_DAYS_BEFORE,
                days_before,
            ));
        }
        Ok(days_before as u32)
    }

    pub fn days_before(&self) -> u32 {
        self.days_before
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn method(&self) -> ReminderMethod {
        self.method
    }

    /// Returns a copy with a different lead time.
    pub fn with_days_before(self, days_before: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            days_before: Self::validate_days_before(days_before)?,
            ..self
        })
    }

    /// Returns a copy switched on or off.
    pub fn with_enabled(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }

    /// Returns a copy delivered through a different channel.
    pub fn with_method(self, method: ReminderMethod) -> Self {
        Self { method, ..self }
    }

    /// Date the reminder for a payment due on `payment_date` fires.
    pub fn reminder_date(&self, payment_date: NaiveDate) -> Option<NaiveDate> {
        payment_date.checked_sub_days(Days::new(u64::from(self.days_before)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_accepts_positive_days_before() {
        let settings = ReminderSettings::new(3, true, ReminderMethod::Email).unwrap();
        assert_eq!(settings.days_before(), 3);
        assert!(settings.is_enabled());
        assert_eq!(settings.method(), ReminderMethod::Email);
    }

    #[test]
    fn new_rejects_days_before_outside_range() {
        for days in [0, -1, -30, i64::MIN, MAX_DAYS_BEFORE + 1] {
            let err = ReminderSettings::new(days, true, ReminderMethod::Push).unwrap_err();
            assert_eq!(err.field(), "days_before");
        }
    }

    #[test]
    fn with_helpers_replace_one_field() {
        let base = ReminderSettings::new(3, true, ReminderMethod::Email).unwrap();

        let longer = base.with_days_before(7).unwrap();
        assert_eq!(longer.days_before(), 7);
        assert_eq!(longer.method(), ReminderMethod::Email);

        let off = base.with_enabled(false);
        assert!(!off.is_enabled());
        assert_eq!(off.days_before(), 3);

        let sms = base.with_method(ReminderMethod::Sms);
        assert_eq!(sms.method(), ReminderMethod::Sms);
        assert!(sms.is_enabled());

        assert_eq!(base.days_before(), 3);
    }

    #[test]
    fn with_days_before_validates() {
        let base = ReminderSettings::new(3, true, ReminderMethod::Email).unwrap();
        assert!(base.with_days_before(0).is_err());
    }

    #[test]
    fn reminder_date_subtracts_lead_time() {
        let settings = ReminderSettings::new(3, true, ReminderMethod::InApp).unwrap();
        assert_eq!(settings.reminder_date(date(2024, 3, 2)), Some(date(2024, 2, 28)));
    }

    #[test]
    fn method_parses_and_serializes_snake_case() {
        assert_eq!("in_app".parse::<ReminderMethod>().unwrap(), ReminderMethod::InApp);
        assert!("carrier_pigeon".parse::<ReminderMethod>().is_err());
        assert_eq!(serde_json::to_string(&ReminderMethod::InApp).unwrap(), "\"in_app\"");
    }

    #[test]
    fn deserialization_revalidates_days_before() {
        let ok: ReminderSettings =
            serde_json::from_str(r#"{"days_before":2,"enabled":false,"method":"sms"}"#).unwrap();
        assert_eq!(ok.days_before(), 2);
        assert!(serde_json::from_str::<ReminderSettings>(
            r#"{"days_before":0,"enabled":true,"method":"sms"}"#
        )
        .is_err());
    }
}
