//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own HTTP adapter; `api_router` mounts them
//! under `/api` next to the health check.

mod request_metadata;
pub mod subscription;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

pub use request_metadata::{RequestMetadata, REQUEST_ID_HEADER};
pub use subscription::{subscription_routes, SubscriptionAppState};

/// GET /health - Liveness check
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Create the complete API router.
///
/// # Example
///
/// ```ignore
/// let app = api_router(state).layer(TraceLayer::new_for_http());
/// axum::serve(listener, app).await?;
/// ```
pub fn api_router(state: SubscriptionAppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", subscription_routes().with_state(state))
}
