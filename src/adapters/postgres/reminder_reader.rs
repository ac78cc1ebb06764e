//! PostgreSQL implementation of ReminderReader.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ReminderId, SubscriptionId};
use crate::domain::subscription::{DateWindow, ScheduledReminder};
use crate::ports::ReminderReader;

use super::rows::{parse_currency, parse_method};

/// Reads un-sent rows from `subscription_reminders`.
#[derive(Clone)]
pub struct PostgresReminderReader {
    pool: PgPool,
}

impl PostgresReminderReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReminderRow {
    id: Uuid,
    subscription_id: Uuid,
    subscription_name: String,
    amount: Decimal,
    currency: String,
    method: String,
    reminder_date: NaiveDate,
    payment_date: NaiveDate,
}

impl TryFrom<ReminderRow> for ScheduledReminder {
    type Error = DomainError;

    fn try_from(row: ReminderRow) -> Result<Self, Self::Error> {
        Ok(ScheduledReminder {
            id: ReminderId::from_uuid(row.id),
            subscription_id: SubscriptionId::from_uuid(row.subscription_id),
            subscription_name: row.subscription_name,
            amount: row.amount,
            currency: parse_currency(&row.currency)?,
            method: parse_method(&row.method)?,
            reminder_date: row.reminder_date,
            payment_date: row.payment_date,
        })
    }
}

#[async_trait]
impl ReminderReader for PostgresReminderReader {
    async fn pending_reminders(&self, window: DateWindow) -> Result<Vec<ScheduledReminder>, DomainError> {
        let rows: Vec<ReminderRow> = sqlx::query_as(
            r#"
            SELECT r.id, r.subscription_id, s.name AS subscription_name, s.amount, s.currency,
                   r.method, r.reminder_date, r.payment_date
            FROM subscription_reminders r
            JOIN subscriptions s ON s.id = r.subscription_id
            WHERE r.sent = FALSE
              AND r.reminder_date BETWEEN $1 AND $2
            ORDER BY r.reminder_date ASC, s.name ASC
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to get pending reminders", e))?;

        rows.into_iter().map(ScheduledReminder::try_from).collect()
    }
}
