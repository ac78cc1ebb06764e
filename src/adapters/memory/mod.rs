//! In-memory adapters.
//!
//! Back every subscription port with one shared store. Used by the
//! integration tests and for running the API without a database.

mod subscription_store;

pub use subscription_store::InMemorySubscriptionStore;
