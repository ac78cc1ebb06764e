//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, error types and the event
//! envelope that form the vocabulary of the LifeOS domain.

mod command;
mod currency;
mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use command::CommandMetadata;
pub use currency::CurrencyCode;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent};
pub use ids::{PaymentId, ReminderId, SubscriptionId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
