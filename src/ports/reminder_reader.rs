//! Reminder reader port.
//!
//! Reads the scheduled-reminder projection that the write side maintains
//! whenever a subscription is saved.

use crate::domain::foundation::DomainError;
use crate::domain::subscription::{DateWindow, ScheduledReminder};
use async_trait::async_trait;

/// Reader port for scheduled payment reminders.
#[async_trait]
pub trait ReminderReader: Send + Sync {
    /// Un-sent reminders whose reminder date falls inside `window`.
    ///
    /// Ordering is not guaranteed; callers sort.
    async fn pending_reminders(&self, window: DateWindow) -> Result<Vec<ScheduledReminder>, DomainError>;
}
