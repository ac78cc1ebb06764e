//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, currency, errors, events, state machine)
//! - `subscription` - Recurring subscriptions, payments, reminders and their projections

pub mod foundation;
pub mod subscription;
