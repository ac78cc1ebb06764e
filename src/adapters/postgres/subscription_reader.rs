//! PostgreSQL implementation of SubscriptionReader.
//!
//! Provides read-optimized queries for subscription views and projections.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, SubscriptionId};
use crate::domain::subscription::{ActiveCharge, DateWindow, SubscriptionStatus, UpcomingPayment};
use crate::ports::{SubscriptionReader, SubscriptionSummary, SubscriptionView};

use super::rows::{
    parse_billing_cycle, parse_currency, parse_status, PaymentRow, SubscriptionRow,
    SUBSCRIPTION_COLUMNS,
};

/// PostgreSQL implementation of the SubscriptionReader port.
#[derive(Clone)]
pub struct PostgresSubscriptionReader {
    pool: PgPool,
}

impl PostgresSubscriptionReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row for subscription list queries.
#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: Uuid,
    name: String,
    amount: Decimal,
    currency: String,
    billing_cycle: String,
    status: String,
    next_payment_date: Option<NaiveDate>,
    category: Option<String>,
}

/// Row for the upcoming payments projection.
#[derive(Debug, sqlx::FromRow)]
struct UpcomingRow {
    id: Uuid,
    name: String,
    amount: Decimal,
    currency: String,
    billing_cycle: String,
    next_payment_date: NaiveDate,
    category: Option<String>,
}

/// Row for the monthly cost aggregate.
#[derive(Debug, sqlx::FromRow)]
struct ChargeRow {
    id: Uuid,
    name: String,
    amount: Decimal,
    currency: String,
    billing_cycle: String,
}

impl TryFrom<SummaryRow> for SubscriptionSummary {
    type Error = DomainError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        Ok(SubscriptionSummary {
            id: SubscriptionId::from_uuid(row.id),
            name: row.name,
            amount: row.amount,
            currency: parse_currency(&row.currency)?,
            billing_cycle: parse_billing_cycle(&row.billing_cycle)?,
            status: parse_status(&row.status)?,
            next_payment_date: row.next_payment_date,
            category: row.category,
        })
    }
}

impl TryFrom<UpcomingRow> for UpcomingPayment {
    type Error = DomainError;

    fn try_from(row: UpcomingRow) -> Result<Self, Self::Error> {
        Ok(UpcomingPayment {
            subscription_id: SubscriptionId::from_uuid(row.id),
            name: row.name,
            amount: row.amount,
            currency: parse_currency(&row.currency)?,
            billing_cycle: parse_billing_cycle(&row.billing_cycle)?,
            payment_date: row.next_payment_date,
            category: row.category,
        })
    }
}

impl TryFrom<ChargeRow> for ActiveCharge {
    type Error = DomainError;

    fn try_from(row: ChargeRow) -> Result<Self, Self::Error> {
        Ok(ActiveCharge {
            subscription_id: SubscriptionId::from_uuid(row.id),
            name: row.name,
            amount: row.amount,
            currency: parse_currency(&row.currency)?,
            billing_cycle: parse_billing_cycle(&row.billing_cycle)?,
        })
    }
}

#[async_trait]
impl SubscriptionReader for PostgresSubscriptionReader {
    async fn get(&self, id: &SubscriptionId) -> Result<Option<SubscriptionView>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM subscriptions WHERE id = $1",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to get subscription", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payments: Vec<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, subscription_id, amount, payment_date, notes, recorded_at
            FROM subscription_payments
            WHERE subscription_id = $1
            ORDER BY payment_date DESC, recorded_at DESC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to get payments", e))?;

        row.into_view(payments).map(Some)
    }

    async fn list(
        &self,
        status: Option<SubscriptionStatus>,
    ) -> Result<Vec<SubscriptionSummary>, DomainError> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            r#"
            SELECT id, name, amount, currency, billing_cycle, status, next_payment_date, category
            FROM subscriptions
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY name ASC, id ASC
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list subscriptions", e))?;

        rows.into_iter().map(SubscriptionSummary::try_from).collect()
    }

    async fn upcoming_payments(&self, window: DateWindow) -> Result<Vec<UpcomingPayment>, DomainError> {
        let rows: Vec<UpcomingRow> = sqlx::query_as(
            r#"
            SELECT id, name, amount, currency, billing_cycle, next_payment_date, category
            FROM subscriptions
            WHERE status = 'active'
              AND next_payment_date IS NOT NULL
              AND next_payment_date BETWEEN $1 AND $2
            ORDER BY next_payment_date ASC, name ASC
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to get upcoming payments", e))?;

        rows.into_iter().map(UpcomingPayment::try_from).collect()
    }

    async fn active_charges(&self) -> Result<Vec<ActiveCharge>, DomainError> {
        let rows: Vec<ChargeRow> = sqlx::query_as(
            r#"
            SELECT id, name, amount, currency, billing_cycle
            FROM subscriptions
            WHERE status = 'active'
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to get active charges", e))?;

        rows.into_iter().map(ActiveCharge::try_from).collect()
    }
}
