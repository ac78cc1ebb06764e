//! GetSubscriptionHandler - Query handler for one subscription's details.

use std::sync::Arc;

use crate::domain::foundation::SubscriptionId;
use crate::domain::subscription::SubscriptionError;
use crate::ports::{SubscriptionReader, SubscriptionView};

/// Query to get one subscription.
#[derive(Debug, Clone)]
pub struct GetSubscriptionQuery {
    pub subscription_id: SubscriptionId,
}

/// Result of a successful subscription query.
pub type GetSubscriptionResult = SubscriptionView;

/// Handler for retrieving subscription details.
pub struct GetSubscriptionHandler {
    reader: Arc<dyn SubscriptionReader>,
}

impl GetSubscriptionHandler {
    pub fn new(reader: Arc<dyn SubscriptionReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: GetSubscriptionQuery,
    ) -> Result<GetSubscriptionResult, SubscriptionError> {
        self.reader
            .get(&query.subscription_id)
            .await?
            .ok_or_else(|| SubscriptionError::not_found(query.subscription_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::subscription::test_support::*;
    use crate::domain::foundation::Timestamp;
    use crate::domain::subscription::{BillingCycle, SubscriptionStatus};
    use rust_decimal_macros::dec;

    fn view(id: SubscriptionId) -> SubscriptionView {
        SubscriptionView {
            id,
            name: "Streaming".to_string(),
            description: String::new(),
            amount: dec!(12.99),
            currency: usd(),
            billing_cycle: BillingCycle::Monthly,
            start_date: date(2024, 1, 15),
            end_date: None,
            status: SubscriptionStatus::Active,
            next_payment_date: Some(date(2024, 2, 15)),
            website: None,
            category: None,
            reminder_settings: None,
            monthly_cost: dec!(12.99),
            payments: Vec::new(),
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn returns_view_when_exists() {
        let id = SubscriptionId::new();
        let mut reader = MockSubscriptionReader::new();
        reader.views.push(view(id));
        let handler = GetSubscriptionHandler::new(Arc::new(reader));

        let result = handler
            .handle(GetSubscriptionQuery { subscription_id: id })
            .await
            .unwrap();
        assert_eq!(result.id, id);
        assert_eq!(result.next_payment_date, Some(date(2024, 2, 15)));
    }

    #[tokio::test]
    async fn returns_not_found_when_missing() {
        let handler = GetSubscriptionHandler::new(Arc::new(MockSubscriptionReader::new()));
        let err = handler
            .handle(GetSubscriptionQuery {
                subscription_id: SubscriptionId::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::NotFound(_)));
    }

    #[tokio::test]
    async fn fails_when_reader_fails() {
        let handler = GetSubscriptionHandler::new(Arc::new(MockSubscriptionReader::failing()));
        let err = handler
            .handle(GetSubscriptionQuery {
                subscription_id: SubscriptionId::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::Infrastructure { .. }));
    }
}
