//! Axum router configuration for subscription endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    cancel_subscription, configure_reminders, create_subscription, get_subscription,
    list_subscriptions, monthly_cost, pause_subscription, record_payment, resume_subscription,
    update_subscription, upcoming_payments, upcoming_reminders, SubscriptionAppState,
};

/// Create the subscription routes, mounted under `/api`.
///
/// # Routes
///
/// - `GET /subscriptions` - List, optional `?status=`
/// - `POST /subscriptions` - Create
/// - `GET /subscriptions/monthly-cost` - Monthly cost aggregate
/// - `GET /subscriptions/:id` - Detail
/// - `PUT /subscriptions/:id` - Update
/// - `POST /subscriptions/:id/cancel` - Cancel
/// - `POST /subscriptions/:id/payments` - Record payment
/// - `POST /subscriptions/:id/reminders` - Configure reminders
/// - `POST /subscriptions/:id/pause` / `resume`
/// - `GET /upcoming-payments?days_ahead=N`
/// - `GET /upcoming-reminders?days_ahead=N`
pub fn subscription_routes() -> Router<SubscriptionAppState> {
    Router::new()
        .route(
            "/subscriptions",
            get(list_subscriptions).post(create_subscription),
        )
        .route("/subscriptions/monthly-cost", get(monthly_cost))
        .route(
            "/subscriptions/:id",
            get(get_subscription).put(update_subscription),
        )
        .route("/subscriptions/:id/cancel", post(cancel_subscription))
        .route("/subscriptions/:id/payments", post(record_payment))
        .route("/subscriptions/:id/reminders", post(configure_reminders))
        .route("/subscriptions/:id/pause", post(pause_subscription))
        .route("/subscriptions/:id/resume", post(resume_subscription))
        .route("/upcoming-payments", get(upcoming_payments))
        .route("/upcoming-reminders", get(upcoming_reminders))
}
