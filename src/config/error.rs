//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid host/port combination: {0}")]
    InvalidBindAddress(String),

    #[error("request_timeout_secs must be between 1 and {max}")]
    InvalidTimeout { max: u64 },

    #[error("Database URL must use the postgres:// or postgresql:// scheme")]
    InvalidDatabaseUrl,

    #[error("database.max_connections must be at least 1")]
    EmptyPool,

    #[error("max_days_ahead must be between 1 and {max}")]
    InvalidMaxDaysAhead { max: u32 },

    #[error("default_days_ahead must be between 1 and max_days_ahead ({max_days_ahead})")]
    InvalidDefaultDaysAhead { max_days_ahead: u32 },
}
