//! PostgreSQL implementation of SubscriptionRepository.
//!
//! Persists the subscription row, its payments and its scheduled reminder in
//! one transaction.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, ReminderId, SubscriptionId};
use crate::domain::subscription::Subscription;
use crate::ports::SubscriptionRepository;

use super::rows::{reminder_columns, PaymentRow, SubscriptionRow, SUBSCRIPTION_COLUMNS};

/// PostgreSQL implementation of the SubscriptionRepository port.
#[derive(Clone)]
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, DomainError> {
        self.pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to start transaction", e))
    }
}

/// Appends payments that are not stored yet. Stored payments are immutable.
///
/// A payment id already stored under a different subscription fails with
/// `DuplicatePayment`, rolling back the whole save.
async fn insert_payments(
    tx: &mut Transaction<'_, Postgres>,
    subscription: &Subscription,
) -> Result<(), DomainError> {
    for payment in &subscription.payments {
        let inserted = sqlx::query(
            r#"
            INSERT INTO subscription_payments (
                id, subscription_id, amount, payment_date, notes, recorded_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(subscription.id.as_uuid())
        .bind(payment.amount)
        .bind(payment.payment_date)
        .bind(&payment.notes)
        .bind(payment.recorded_at.as_datetime())
        .execute(&mut **tx)
        .await
        .map_err(|e| DomainError::database("Failed to insert payment", e))?
        .rows_affected();

        if inserted > 0 {
            continue;
        }

        let (owner,): (Uuid,) =
            sqlx::query_as("SELECT subscription_id FROM subscription_payments WHERE id = $1")
                .bind(payment.id.as_uuid())
                .fetch_one(&mut **tx)
                .await
                .map_err(|e| DomainError::database("Failed to check payment owner", e))?;

        if &owner != subscription.id.as_uuid() {
            tracing::warn!(
                payment_id = %payment.id,
                subscription_id = %subscription.id,
                owner_id = %owner,
                "Payment id already belongs to another subscription"
            );
            return Err(DomainError::duplicate_payment(payment.id));
        }
    }
    Ok(())
}

/// Replaces the un-sent reminder for a subscription with its current one.
///
/// A reminder already sent for the same payment date is left alone and not
/// scheduled again.
async fn sync_reminder(
    tx: &mut Transaction<'_, Postgres>,
    subscription: &Subscription,
) -> Result<(), DomainError> {
    sqlx::query("DELETE FROM subscription_reminders WHERE subscription_id = $1 AND sent = FALSE")
        .bind(subscription.id.as_uuid())
        .execute(&mut **tx)
        .await
        .map_err(|e| DomainError::database("Failed to clear pending reminders", e))?;

    let (Some((reminder_date, payment_date)), Some(settings)) =
        (subscription.pending_reminder(), subscription.reminder_settings)
    else {
        return Ok(());
    };

    sqlx::query(
        r#"
        INSERT INTO subscription_reminders (
            id, subscription_id, reminder_date, payment_date, method, sent
        ) VALUES ($1, $2, $3, $4, $5, FALSE)
        ON CONFLICT (subscription_id, payment_date) DO NOTHING
        "#,
    )
    .bind(ReminderId::new().as_uuid())
    .bind(subscription.id.as_uuid())
    .bind(reminder_date)
    .bind(payment_date)
    .bind(settings.method().as_str())
    .execute(&mut **tx)
    .await
    .map_err(|e| DomainError::database("Failed to schedule reminder", e))?;

    Ok(())
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut tx = self.begin().await?;
        let (days_before, enabled, method) = reminder_columns(subscription.reminder_settings);

        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, name, description, amount, currency, billing_cycle, start_date, end_date,
                status, next_payment_date, website, category,
                reminder_days_before, reminder_enabled, reminder_method,
                created_at, updated_at, version
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(&subscription.name)
        .bind(&subscription.description)
        .bind(subscription.amount)
        .bind(subscription.currency.as_str())
        .bind(subscription.billing_cycle.as_str())
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .bind(subscription.status.as_str())
        .bind(subscription.next_payment_date)
        .bind(&subscription.website)
        .bind(&subscription.category)
        .bind(days_before)
        .bind(enabled)
        .bind(method)
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .bind(subscription.version)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database("Failed to save subscription", e))?;

        insert_payments(&mut tx, subscription).await?;
        sync_reminder(&mut tx, subscription).await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit transaction", e))?;

        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut tx = self.begin().await?;
        let (days_before, enabled, method) = reminder_columns(subscription.reminder_settings);

        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                name = $3,
                description = $4,
                amount = $5,
                currency = $6,
                billing_cycle = $7,
                end_date = $8,
                status = $9,
                next_payment_date = $10,
                website = $11,
                category = $12,
                reminder_days_before = $13,
                reminder_enabled = $14,
                reminder_method = $15,
                updated_at = $16,
                version = version + 1
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.version)
        .bind(&subscription.name)
        .bind(&subscription.description)
        .bind(subscription.amount)
        .bind(subscription.currency.as_str())
        .bind(subscription.billing_cycle.as_str())
        .bind(subscription.end_date)
        .bind(subscription.status.as_str())
        .bind(subscription.next_payment_date)
        .bind(&subscription.website)
        .bind(&subscription.category)
        .bind(days_before)
        .bind(enabled)
        .bind(method)
        .bind(subscription.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database("Failed to update subscription", e))?;

        if result.rows_affected() == 0 {
            let exists: Option<(i64,)> =
                sqlx::query_as("SELECT version FROM subscriptions WHERE id = $1")
                    .bind(subscription.id.as_uuid())
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|e| DomainError::database("Failed to check subscription", e))?;

            return Err(match exists {
                Some((stored,)) => DomainError::new(
                    ErrorCode::ConcurrentModification,
                    "Subscription was modified concurrently",
                )
                .with_detail("expected_version", subscription.version.to_string())
                .with_detail("stored_version", stored.to_string()),
                None => DomainError::new(ErrorCode::SubscriptionNotFound, "Subscription not found"),
            });
        }

        insert_payments(&mut tx, subscription).await?;
        sync_reminder(&mut tx, subscription).await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit transaction", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM subscriptions WHERE id = $1",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to find subscription", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payments: Vec<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, subscription_id, amount, payment_date, notes, recorded_at
            FROM subscription_payments
            WHERE subscription_id = $1
            ORDER BY payment_date ASC, recorded_at ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to load payments", e))?;

        row.into_subscription(payments).map(Some)
    }
}
