//! PostgreSQL adapters - Database implementations for the subscription ports.
//!
//! - `PostgresSubscriptionRepository` - Aggregate persistence with optimistic locking
//! - `PostgresSubscriptionReader` - Views, lists and payment projections
//! - `PostgresReminderReader` - Scheduled reminder projection

mod reminder_reader;
mod rows;
mod subscription_reader;
mod subscription_repository;

pub use reminder_reader::PostgresReminderReader;
pub use subscription_reader::PostgresSubscriptionReader;
pub use subscription_repository::PostgresSubscriptionRepository;
