//! Subscription-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | ValidationFailed | 422 |
//! | InvalidState | 400 |
//! | InvalidArgument | 400 |
//! | Infrastructure | 500 |

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, ValidationError};

use super::SubscriptionStatus;

/// Errors raised by subscription commands and queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    /// Subscription was not found.
    #[error("Subscription not found: {0}")]
    NotFound(SubscriptionId),

    /// Request input was malformed or missing.
    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    /// Operation is not allowed in the subscription's current status.
    #[error("Cannot {attempted} a {current} subscription")]
    InvalidState {
        current: SubscriptionStatus,
        attempted: String,
    },

    /// A domain rule rejected an argument.
    #[error("Invalid {field}: {message}")]
    InvalidArgument { field: String, message: String },

    /// Storage or other infrastructure failure.
    #[error("Error: {message}")]
    Infrastructure { code: ErrorCode, message: String },
}

impl SubscriptionError {
    pub fn not_found(id: SubscriptionId) -> Self {
        SubscriptionError::NotFound(id)
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SubscriptionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_state(current: SubscriptionStatus, attempted: impl Into<String>) -> Self {
        SubscriptionError::InvalidState {
            current,
            attempted: attempted.into(),
        }
    }

    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        SubscriptionError::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        SubscriptionError::Infrastructure {
            code: ErrorCode::InternalError,
            message: message.into(),
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::NotFound(_) => ErrorCode::SubscriptionNotFound,
            SubscriptionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SubscriptionError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            SubscriptionError::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            SubscriptionError::Infrastructure { code, .. } => *code,
        }
    }

    /// Field name for validation and argument errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            SubscriptionError::ValidationFailed { field, .. }
            | SubscriptionError::InvalidArgument { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        SubscriptionError::Infrastructure {
            code: err.code,
            message: err.message,
        }
    }
}

impl From<ValidationError> for SubscriptionError {
    fn from(err: ValidationError) -> Self {
        SubscriptionError::validation(err.field().to_string(), err.to_string())
    }
}

impl From<SubscriptionError> for DomainError {
    fn from(err: SubscriptionError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
