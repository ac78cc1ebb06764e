//! Billing cycle cadence and calendar arithmetic.
//!
//! Month-based cycles use calendar months and clamp to the last valid day of
//! the target month: Jan 31 + 1 month is Feb 29 in a leap year and Feb 28
//! otherwise. Each step starts from the previous, possibly clamped, date.

use chrono::{Days, Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Recurrence cadence governing when a subscription's next payment is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Bimonthly,
    Quarterly,
    Semiannually,
    Annually,
}

/// A single calendar step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Days(u64),
    Months(u32),
}

impl BillingCycle {
    /// Every cycle, shortest first.
    pub const ALL: [BillingCycle; 8] = [
        BillingCycle::Daily,
        BillingCycle::Weekly,
        BillingCycle::Biweekly,
        BillingCycle::Monthly,
        BillingCycle::Bimonthly,
        BillingCycle::Quarterly,
        BillingCycle::Semiannually,
        BillingCycle::Annually,
    ];

    /// Returns the wire and storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Daily => "daily",
            BillingCycle::Weekly => "weekly",
            BillingCycle::Biweekly => "biweekly",
            BillingCycle::Monthly => "monthly",
            BillingCycle::Bimonthly => "bimonthly",
            BillingCycle::Quarterly => "quarterly",
            BillingCycle::Semiannually => "semiannually",
            BillingCycle::Annually => "annually",
        }
    }

    fn step(&self) -> Step {
        match self {
            BillingCycle::Daily => Step::Days(1),
            BillingCycle::Weekly => Step::Days(7),
            BillingCycle::Biweekly => Step::Days(14),
            BillingCycle::Monthly => Step::Months(1),
            BillingCycle::Bimonthly => Step::Months(2),
            BillingCycle::Quarterly => Step::Months(3),
            BillingCycle::Semiannually => Step::Months(6),
            BillingCycle::Annually => Step::Months(12),
        }
    }

    /// Computes the next due date strictly after `from`.
    ///
    /// Returns `None` only when the result falls outside the supported
    /// calendar range.
    pub fn next_occurrence(&self, from: NaiveDate) -> Option<NaiveDate> {
        match self.step() {
            Step::Days(n) => from.checked_add_days(Days::new(n)),
            Step::Months(n) => from.checked_add_months(Months::new(n)),
        }
    }

    /// Exact ratio `(numerator, denominator)` converting one charge of this
    /// cycle into a monthly amount.
    fn monthly_ratio(&self) -> (i64, i64) {
        match self {
            BillingCycle::Daily => (365, 12),
            BillingCycle::Weekly => (52, 12),
            BillingCycle::Biweekly => (26, 12),
            BillingCycle::Monthly => (1, 1),
            BillingCycle::Bimonthly => (1, 2),
            BillingCycle::Quarterly => (1, 3),
            BillingCycle::Semiannually => (1, 6),
            BillingCycle::Annually => (1, 12),
        }
    }

    /// Multiplier normalizing one charge of this cycle to a monthly amount.
    pub fn monthly_factor(&self) -> Decimal {
        let (num, den) = self.monthly_ratio();
        Decimal::from(num) / Decimal::from(den)
    }

    /// Monthly equivalent of `amount`, rounded to cents (midpoint away from zero).
    ///
    /// Returns `None` when the product does not fit in a `Decimal`.
    pub fn monthly_equivalent(&self, amount: Decimal) -> Option<Decimal> {
        let (num, den) = self.monthly_ratio();
        let monthly = amount
            .checked_mul(Decimal::from(num))?
            .checked_div(Decimal::from(den))?;
        Some(monthly.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingCycle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        BillingCycle::ALL
            .into_iter()
            .find(|cycle| cycle.as_str() == normalized)
            .ok_or_else(|| {
                ValidationError::invalid_format(
                    "billing_cycle",
                    format!("unknown billing cycle '{}'", s),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Calendar steps
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn day_based_cycles_add_fixed_days() {
        let from = date(2024, 1, 15);
        assert_eq!(BillingCycle::Daily.next_occurrence(from), Some(date(2024, 1, 16)));
        assert_eq!(BillingCycle::Weekly.next_occurrence(from), Some(date(2024, 1, 22)));
        assert_eq!(BillingCycle::Biweekly.next_occurrence(from), Some(date(2024, 1, 29)));
    }

    #[test]
    fn month_based_cycles_add_calendar_months() {
        let from = date(2024, 1, 15);
        assert_eq!(BillingCycle::Monthly.next_occurrence(from), Some(date(2024, 2, 15)));
        assert_eq!(BillingCycle::Bimonthly.next_occurrence(from), Some(date(2024, 3, 15)));
        assert_eq!(BillingCycle::Quarterly.next_occurrence(from), Some(date(2024, 4, 15)));
        assert_eq!(BillingCycle::Semiannually.next_occurrence(from), Some(date(2024, 7, 15)));
        assert_eq!(BillingCycle::Annually.next_occurrence(from), Some(date(2025, 1, 15)));
    }

    #[test]
    fn month_end_clamps_to_last_day_of_target_month() {
        assert_eq!(
            BillingCycle::Monthly.next_occurrence(date(2024, 1, 31)),
            Some(date(2024, 2, 29))
        );
        assert_eq!(
            BillingCycle::Monthly.next_occurrence(date(2023, 1, 31)),
            Some(date(2023, 2, 28))
        );
        assert_eq!(
            BillingCycle::Quarterly.next_occurrence(date(2024, 5, 31)),
            Some(date(2024, 8, 31))
        );
        assert_eq!(
            BillingCycle::Quarterly.next_occurrence(date(2024, 11, 30)),
            Some(date(2025, 2, 28))
        );
    }

    #[test]
    fn leap_day_annual_step_lands_on_feb_28() {
        assert_eq!(
            BillingCycle::Annually.next_occurrence(date(2024, 2, 29)),
            Some(date(2025, 2, 28))
        );
    }

    #[test]
    fn overflow_past_calendar_range_is_none() {
        assert_eq!(BillingCycle::Daily.next_occurrence(NaiveDate::MAX), None);
        assert_eq!(BillingCycle::Annually.next_occurrence(NaiveDate::MAX), None);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Monthly normalization
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn monthly_equivalent_for_annual_and_quarterly() {
        assert_eq!(BillingCycle::Annually.monthly_equivalent(dec!(120)), Some(dec!(10.00)));
        assert_eq!(BillingCycle::Quarterly.monthly_equivalent(dec!(30)), Some(dec!(10.00)));
        assert_eq!(BillingCycle::Monthly.monthly_equivalent(dec!(9.99)), Some(dec!(9.99)));
    }

    #[test]
    fn monthly_equivalent_for_short_cycles() {
        assert_eq!(BillingCycle::Weekly.monthly_equivalent(dec!(12)), Some(dec!(52.00)));
        assert_eq!(BillingCycle::Biweekly.monthly_equivalent(dec!(12)), Some(dec!(26.00)));
        assert_eq!(BillingCycle::Daily.monthly_equivalent(dec!(1)), Some(dec!(30.42)));
    }

    #[test]
    fn monthly_equivalent_rounds_half_away_from_zero() {
        // 0.01 * 1/2 = 0.005
        assert_eq!(BillingCycle::Bimonthly.monthly_equivalent(dec!(0.01)), Some(dec!(0.01)));
    }

    #[test]
    fn monthly_equivalent_overflow_is_none() {
        assert_eq!(BillingCycle::Daily.monthly_equivalent(Decimal::MAX), None);
        assert_eq!(BillingCycle::Weekly.monthly_equivalent(Decimal::MAX), None);
        assert!(BillingCycle::Annually.monthly_equivalent(Decimal::MAX).is_some());
    }

    #[test]
    fn monthly_factor_matches_ratio() {
        assert_eq!(BillingCycle::Monthly.monthly_factor(), Decimal::ONE);
        assert_eq!(BillingCycle::Bimonthly.monthly_factor(), dec!(0.5));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Parsing and serialization
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn parses_known_names_case_insensitively() {
        assert_eq!("semiannually".parse::<BillingCycle>().unwrap(), BillingCycle::Semiannually);
        assert_eq!(" Biweekly ".parse::<BillingCycle>().unwrap(), BillingCycle::Biweekly);
    }

    #[test]
    fn rejects_unknown_name() {
        let err = "fortnightly".parse::<BillingCycle>().unwrap_err();
        assert_eq!(err.field(), "billing_cycle");
    }

    #[test]
    fn display_matches_parse_for_all_cycles() {
        for cycle in BillingCycle::ALL {
            assert_eq!(cycle.to_string().parse::<BillingCycle>().unwrap(), cycle);
        }
    }

    #[test]
    fn serializes_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&BillingCycle::Semiannually).unwrap(),
            "\"semiannually\""
        );
    }

    // ════════════════════════════════════════════════════════════════════════
    // Properties
    // ════════════════════════════════════════════════════════════════════════

    fn any_cycle() -> impl Strategy<Value = BillingCycle> {
        proptest::sample::select(BillingCycle::ALL.to_vec())
    }

    fn any_date() -> impl Strategy<Value = NaiveDate> {
        // 1900-01-01 ..= 2199-12-31 as days since CE
        (693_596i32..=803_168i32).prop_map(|days| NaiveDate::from_num_days_from_ce_opt(days).unwrap())
    }

    proptest! {
        #[test]
        fn next_occurrence_is_strictly_after_reference(cycle in any_cycle(), from in any_date()) {
            let next = cycle.next_occurrence(from).unwrap();
            prop_assert!(next > from);
        }

        #[test]
        fn month_steps_never_skip_a_month(from in any_date()) {
            use chrono::Datelike;
            let next = BillingCycle::Monthly.next_occurrence(from).unwrap();
            let months = (next.year() - from.year()) * 12 + next.month() as i32 - from.month() as i32;
            prop_assert_eq!(months, 1);
        }

        #[test]
        fn monthly_equivalent_is_non_negative(cycle in any_cycle(), cents in 0i64..10_000_000) {
            let amount = Decimal::new(cents, 2);
            prop_assert!(cycle.monthly_equivalent(amount).unwrap() >= Decimal::ZERO);
        }
    }
}
