//! LifeOS - Personal life management backend
//!
//! This crate implements the subscriptions slice: recurring charges, their
//! payment history, reminder settings and the billing projections built on
//! top of them (upcoming payments, upcoming reminders, monthly cost).

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod server;
