//! Request correlation extractor.
//!
//! Command endpoints take `RequestMetadata` so the `x-request-id` set by the
//! request-id layer ends up on every event the command publishes.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::foundation::CommandMetadata;

/// Header carrying the per-request correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Command metadata built from the inbound request.
///
/// A missing or non-UTF-8 header leaves the correlation ID unset, and the
/// handler generates one.
#[derive(Debug, Clone)]
pub struct RequestMetadata(pub CommandMetadata);

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestMetadata
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let metadata = CommandMetadata::new().with_source("http");
        let metadata = match parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
        {
            Some(request_id) => metadata.with_correlation_id(request_id),
            None => metadata,
        };
        Ok(RequestMetadata(metadata))
    }
}
