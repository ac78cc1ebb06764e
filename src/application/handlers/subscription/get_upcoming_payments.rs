//! GetUpcomingPaymentsHandler - Query handler for payments due soon.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::domain::subscription::{
    group_upcoming_payments, DateWindow, SubscriptionError, UpcomingPaymentsReport,
};
use crate::ports::SubscriptionReader;

use super::LookaheadLimits;

/// Query for payments due between `today` and `today + days_ahead`.
#[derive(Debug, Clone)]
pub struct GetUpcomingPaymentsQuery {
    pub today: NaiveDate,
    pub days_ahead: Option<i64>,
}

/// Payments grouped by date with per-currency totals.
pub type GetUpcomingPaymentsResult = UpcomingPaymentsReport;

/// Handler for the upcoming payments projection.
pub struct GetUpcomingPaymentsHandler {
    reader: Arc<dyn SubscriptionReader>,
    limits: LookaheadLimits,
}

impl GetUpcomingPaymentsHandler {
    pub fn new(reader: Arc<dyn SubscriptionReader>, limits: LookaheadLimits) -> Self {
        Self { reader, limits }
    }

    pub async fn handle(
        &self,
        query: GetUpcomingPaymentsQuery,
    ) -> Result<GetUpcomingPaymentsResult, SubscriptionError> {
        let days_ahead = self.limits.resolve(query.days_ahead)?;
        let window = DateWindow::ahead(query.today, days_ahead)
            .ok_or_else(|| SubscriptionError::validation("days_ahead", "window exceeds the calendar"))?;

        let payments = self.reader.upcoming_payments(window).await?;
        group_upcoming_payments(window, payments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::subscription::test_support::*;
    use crate::domain::foundation::SubscriptionId;
    use crate::domain::subscription::{BillingCycle, UpcomingPayment};
    use rust_decimal_macros::dec;

    fn due(name: &str, on: NaiveDate) -> UpcomingPayment {
        UpcomingPayment {
            subscription_id: SubscriptionId::new(),
            name: name.to_string(),
            amount: dec!(10),
            currency: usd(),
            billing_cycle: BillingCycle::Monthly,
            payment_date: on,
            category: None,
        }
    }

    #[tokio::test]
    async fn excludes_payment_45_days_out_with_default_window() {
        let today = date(2024, 1, 1);
        let mut reader = MockSubscriptionReader::new();
        reader.upcoming = vec![
            due("Soon", today + chrono::Duration::days(10)),
            due("Far", today + chrono::Duration::days(45)),
        ];
        let handler = GetUpcomingPaymentsHandler::new(Arc::new(reader), LookaheadLimits::default());

        let report = handler
            .handle(GetUpcomingPaymentsQuery {
                today,
                days_ahead: Some(30),
            })
            .await
            .unwrap();

        assert_eq!(report.count, 1);
        assert_eq!(report.days[0].payments[0].name, "Soon");
        assert_eq!(report.window.end, date(2024, 1, 31));
        assert_eq!(report.totals.get(&usd()), Some(&dec!(10)));
    }

    #[tokio::test]
    async fn uses_default_days_ahead() {
        let handler = GetUpcomingPaymentsHandler::new(
            Arc::new(MockSubscriptionReader::new()),
            LookaheadLimits {
                default_days_ahead: 7,
                max_days_ahead: 90,
            },
        );

        let report = handler
            .handle(GetUpcomingPaymentsQuery {
                today: date(2024, 1, 1),
                days_ahead: None,
            })
            .await
            .unwrap();
        assert_eq!(report.window.end, date(2024, 1, 8));
    }

    #[tokio::test]
    async fn rejects_out_of_range_days_ahead() {
        let handler = GetUpcomingPaymentsHandler::new(
            Arc::new(MockSubscriptionReader::new()),
            LookaheadLimits::default(),
        );

        let err = handler
            .handle(GetUpcomingPaymentsQuery {
                today: date(2024, 1, 1),
                days_ahead: Some(0),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::ValidationFailed { .. }));
    }
}
