//! Command context for CQRS handlers.
//!
//! `CommandMetadata` travels with every command and is copied onto the
//! events that command emits, so a published event can be traced back to the
//! request that caused it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlation context for a single command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// Links the command and its events to the originating request.
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,

    /// Where the command came from (e.g. "http", "test").
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl CommandMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the correlation ID, usually the inbound `x-request-id`.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Builder: set the source identifier.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the correlation ID, generating one if none was set.
    pub fn correlation_id(&self) -> String {
        self.correlation_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    /// Returns the correlation ID only if explicitly set.
    pub fn correlation_id_opt(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let metadata = CommandMetadata::new()
            .with_correlation_id("req-123")
            .with_source("http");

        assert_eq!(metadata.correlation_id_opt(), Some("req-123"));
        assert_eq!(metadata.correlation_id(), "req-123");
        assert_eq!(metadata.source(), Some("http"));
    }

    #[test]
    fn correlation_id_is_generated_when_missing() {
        let metadata = CommandMetadata::new();
        assert!(metadata.correlation_id_opt().is_none());
        assert!(Uuid::parse_str(&metadata.correlation_id()).is_ok());
    }
}
