//! Process wiring: tracing, storage selection, HTTP layers and shutdown.

use std::sync::Arc;

use axum::Router;
use http::header::{CONTENT_TYPE, HeaderName};
use http::{HeaderValue, Method};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::adapters::events::LoggingEventPublisher;
use crate::adapters::http::{api_router, SubscriptionAppState, REQUEST_ID_HEADER};
use crate::adapters::memory::InMemorySubscriptionStore;
use crate::adapters::postgres::{
    PostgresReminderReader, PostgresSubscriptionReader, PostgresSubscriptionRepository,
};
use crate::config::{AppConfig, ServerConfig};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` overrides `server.log_level`; production logs are JSON.
pub fn init_tracing(server: &ServerConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if server.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    }
}

/// Builds handler state over Postgres when configured, in memory otherwise.
pub async fn build_state(config: &AppConfig) -> Result<SubscriptionAppState, sqlx::Error> {
    let event_publisher = Arc::new(LoggingEventPublisher::new());
    let limits = config.billing.lookahead_limits();
    let default_reminder_method = config.billing.default_reminder_method;

    let Some(database) = &config.database else {
        tracing::warn!("No database configured; subscriptions are kept in memory");
        let store = Arc::new(InMemorySubscriptionStore::new());
        return Ok(SubscriptionAppState {
            repository: store.clone(),
            reader: store.clone(),
            reminder_reader: store,
            event_publisher,
            limits,
            default_reminder_method,
        });
    };

    let pool = database.connect().await?;
    tracing::info!(
        max_connections = database.max_connections,
        "Postgres connection pool established"
    );

    if database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    Ok(SubscriptionAppState {
        repository: Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
        reader: Arc::new(PostgresSubscriptionReader::new(pool.clone())),
        reminder_reader: Arc::new(PostgresReminderReader::new(pool)),
        event_publisher,
        limits,
        default_reminder_method,
    })
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}

/// The API router with request id, tracing, timeout, compression and CORS layers.
pub fn build_app(state: SubscriptionAppState, server: &ServerConfig) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    api_router(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(request_id))
            .layer(TimeoutLayer::new(server.request_timeout()))
            .layer(CompressionLayer::new())
            .layer(cors_layer(server)),
    )
}

/// Resolves on Ctrl+C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
