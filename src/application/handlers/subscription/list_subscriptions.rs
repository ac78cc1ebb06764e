//! ListSubscriptionsHandler - Query handler for subscription lists.

use std::sync::Arc;

use crate::domain::subscription::{SubscriptionError, SubscriptionStatus};
use crate::ports::{SubscriptionReader, SubscriptionSummary};

/// Query to list subscriptions, optionally by status.
#[derive(Debug, Clone, Default)]
pub struct ListSubscriptionsQuery {
    pub status: Option<SubscriptionStatus>,
}

/// Subscriptions ordered by name.
pub type ListSubscriptionsResult = Vec<SubscriptionSummary>;

/// Handler for listing subscriptions.
pub struct ListSubscriptionsHandler {
    reader: Arc<dyn SubscriptionReader>,
}

impl ListSubscriptionsHandler {
    pub fn new(reader: Arc<dyn SubscriptionReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: ListSubscriptionsQuery,
    ) -> Result<ListSubscriptionsResult, SubscriptionError> {
        Ok(self.reader.list(query.status).await?)
    }
}
