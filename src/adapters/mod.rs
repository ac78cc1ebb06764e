//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - sqlx-backed repository and readers
//! - `memory` - In-process store for tests and database-less runs
//! - `events` - Event publishers (in-memory capture, tracing log)
//! - `http` - axum REST API

pub mod events;
pub mod http;
pub mod memory;
pub mod postgres;

pub use events::{InMemoryEventBus, LoggingEventPublisher};
pub use memory::InMemorySubscriptionStore;
pub use postgres::{
    PostgresReminderReader, PostgresSubscriptionReader, PostgresSubscriptionRepository,
};
