//! HTTP adapter for subscription endpoints.
//!
//! Exposes subscriptions, payments, reminders and the billing projections
//! under `/api`. See `routes` for the endpoint list.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{SubscriptionApiError, SubscriptionAppState};
pub use routes::subscription_routes;
