//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Subscription Ports
//!
//! - `SubscriptionRepository` - Aggregate persistence (write side)
//! - `SubscriptionReader` - Subscription views and payment projections (read side)
//! - `ReminderReader` - Scheduled reminder projection (read side)
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for publishing domain events

mod event_publisher;
mod reminder_reader;
mod subscription_reader;
mod subscription_repository;

pub use event_publisher::EventPublisher;
pub use reminder_reader::ReminderReader;
pub use subscription_reader::{PaymentView, SubscriptionReader, SubscriptionSummary, SubscriptionView};
pub use subscription_repository::SubscriptionRepository;
