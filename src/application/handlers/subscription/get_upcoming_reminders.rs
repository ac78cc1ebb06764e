//! GetUpcomingRemindersHandler - Query handler for reminders due soon.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::domain::subscription::{
    annotate_reminders, DateWindow, SubscriptionError, UpcomingRemindersReport,
};
use crate::ports::ReminderReader;

use super::LookaheadLimits;

/// Query for un-sent reminders firing between `today` and `today + days_ahead`.
#[derive(Debug, Clone)]
pub struct GetUpcomingRemindersQuery {
    pub today: NaiveDate,
    pub days_ahead: Option<i64>,
}

/// Reminders sorted by reminder date, annotated relative to today.
pub type GetUpcomingRemindersResult = UpcomingRemindersReport;

/// Handler for the upcoming reminders projection.
pub struct GetUpcomingRemindersHandler {
    reader: Arc<dyn ReminderReader>,
    limits: LookaheadLimits,
}

impl GetUpcomingRemindersHandler {
    pub fn new(reader: Arc<dyn ReminderReader>, limits: LookaheadLimits) -> Self {
        Self { reader, limits }
    }

    pub async fn handle(
        &self,
        query: GetUpcomingRemindersQuery,
    ) -> Result<GetUpcomingRemindersResult, SubscriptionError> {
        let days_ahead = self.limits.resolve(query.days_ahead)?;
        let window = DateWindow::ahead(query.today, days_ahead)
            .ok_or_else(|| SubscriptionError::validation("days_ahead", "window exceeds the calendar"))?;

        let reminders = self.reader.pending_reminders(window).await?;
        Ok(annotate_reminders(window, reminders))
    }
}
