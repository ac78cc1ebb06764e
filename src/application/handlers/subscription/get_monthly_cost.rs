//! GetMonthlyCostHandler - Query handler for the monthly cost aggregate.

use std::sync::Arc;

use crate::domain::subscription::{summarize_monthly_cost, MonthlyCostReport, SubscriptionError};
use crate::ports::SubscriptionReader;

/// Query for the monthly equivalent cost of all Active subscriptions.
#[derive(Debug, Clone, Default)]
pub struct GetMonthlyCostQuery;

/// Per-subscription breakdown and per-currency totals.
pub type GetMonthlyCostResult = MonthlyCostReport;

/// Handler for the monthly cost aggregate.
pub struct GetMonthlyCostHandler {
    reader: Arc<dyn SubscriptionReader>,
}

impl GetMonthlyCostHandler {
    pub fn new(reader: Arc<dyn SubscriptionReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        _query: GetMonthlyCostQuery,
    ) -> Result<GetMonthlyCostResult, SubscriptionError> {
        let charges = self.reader.active_charges().await?;
        summarize_monthly_cost(charges)
    }
}
