//! Subscription repository port (write side).
//!
//! Defines the contract for persisting and retrieving Subscription aggregates.
//!
//! # Example
//!
//! ```ignore
//! let (subscription, event) = Subscription::create(SubscriptionId::new(), terms, start_date)?;
//! repo.save(&subscription).await?;
//! ```

use crate::domain::foundation::{DomainError, SubscriptionId};
use crate::domain::subscription::Subscription;
use async_trait::async_trait;

/// Repository port for Subscription aggregate persistence.
///
/// Implementations must ensure:
/// - The subscription row, its new payments and its reminder projection are
///   written together or not at all
/// - Recorded payments are never modified or removed
/// - Optimistic locking: `update` fails with `ConcurrentModification` when the
///   stored version differs from `subscription.version`
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Save a new subscription.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Update an existing subscription, appending any new payments.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if the subscription doesn't exist
    /// - `ConcurrentModification` if it was changed since it was loaded
    /// - `DatabaseError` on persistence failure
    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Find a subscription by its ID, payments included.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn SubscriptionRepository) {}
    }
}
