//! Billing configuration: lookahead windows and reminder defaults

use serde::Deserialize;

use crate::application::handlers::subscription::LookaheadLimits;
use crate::domain::subscription::ReminderMethod;

use super::error::ValidationError;

/// Hard ceiling for `max_days_ahead`, ten years.
const MAX_LOOKAHEAD_CEILING: u32 = 3650;

/// Billing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Window used by the upcoming queries when `days_ahead` is omitted
    #[serde(default = "default_days_ahead")]
    pub default_days_ahead: u32,

    /// Largest `days_ahead` a caller may request
    #[serde(default = "default_max_days_ahead")]
    pub max_days_ahead: u32,

    /// Reminder method applied when a request omits one
    #[serde(default = "default_reminder_method")]
    pub default_reminder_method: ReminderMethod,
}

impl BillingConfig {
    /// Lookahead bounds handed to the query handlers
    pub fn lookahead_limits(&self) -> LookaheadLimits {
        LookaheadLimits {
            default_days_ahead: self.default_days_ahead,
            max_days_ahead: self.max_days_ahead,
        }
    }

    /// Validate billing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_days_ahead == 0 || self.max_days_ahead > MAX_LOOKAHEAD_CEILING {
            return Err(ValidationError::InvalidMaxDaysAhead {
                max: MAX_LOOKAHEAD_CEILING,
            });
        }
        if self.default_days_ahead == 0 || self.default_days_ahead > self.max_days_ahead {
            return Err(ValidationError::InvalidDefaultDaysAhead {
                max_days_ahead: self.max_days_ahead,
            });
        }
        Ok(())
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            default_days_ahead: default_days_ahead(),
            max_days_ahead: default_max_days_ahead(),
            default_reminder_method: default_reminder_method(),
        }
    }
}

fn default_days_ahead() -> u32 {
    30
}

fn default_max_days_ahead() -> u32 {
    365
}

fn default_reminder_method() -> ReminderMethod {
    ReminderMethod::Email
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_billing_config_defaults() {
        let config = BillingConfig::default();
        assert_eq!(config.default_days_ahead, 30);
        assert_eq!(config.max_days_ahead, 365);
        assert_eq!(config.default_reminder_method, ReminderMethod::Email);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_lookahead_limits_mirror_config() {
        let config = BillingConfig {
            default_days_ahead: 14,
            max_days_ahead: 90,
            ..Default::default()
        };
        let limits = config.lookahead_limits();
        assert_eq!(limits.default_days_ahead, 14);
        assert_eq!(limits.max_days_ahead, 90);
    }

    #[test]
    fn test_validation_default_exceeds_max() {
        let config = BillingConfig {
            default_days_ahead: 60,
            max_days_ahead: 30,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidDefaultDaysAhead { max_days_ahead: 30 })
        );
    }

    #[test]
    fn test_validation_zero_or_huge_max() {
        for max_days_ahead in [0, 10_000] {
            let config = BillingConfig {
                default_days_ahead: 1,
                max_days_ahead,
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }
    }
}
