//! HTTP handlers for subscription endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::adapters::http::RequestMetadata;
use crate::application::handlers::subscription::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, ConfigureRemindersCommand,
    ConfigureRemindersHandler, CreateSubscriptionHandler, GetMonthlyCostHandler,
    GetMonthlyCostQuery, GetSubscriptionHandler, GetSubscriptionQuery,
    GetUpcomingPaymentsHandler, GetUpcomingPaymentsQuery, GetUpcomingRemindersHandler,
    GetUpcomingRemindersQuery, ListSubscriptionsHandler, ListSubscriptionsQuery,
    LookaheadLimits, PauseSubscriptionCommand, PauseSubscriptionHandler, RecordPaymentCommand,
    RecordPaymentHandler, ResumeSubscriptionCommand, ResumeSubscriptionHandler,
    UpdateSubscriptionCommand, UpdateSubscriptionHandler,
};
use crate::domain::foundation::{ErrorCode, SubscriptionId, Timestamp};
use crate::domain::subscription::{ReminderMethod, SubscriptionError};
use crate::ports::{EventPublisher, ReminderReader, SubscriptionReader, SubscriptionRepository};

use super::dto::{
    CancelSubscriptionRequest, ConfigureRemindersRequest, CreateSubscriptionRequest,
    ErrorResponse, FieldErrors, ListParams, LookaheadParams, PaymentResponse,
    RecordPaymentRequest, SubscriptionListResponse, SubscriptionResponse,
    UpdateSubscriptionRequest, ValidationErrorResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the subscription endpoints.
///
/// Cloned per request; dependencies are Arc-wrapped.
#[derive(Clone)]
pub struct SubscriptionAppState {
    pub repository: Arc<dyn SubscriptionRepository>,
    pub reader: Arc<dyn SubscriptionReader>,
    pub reminder_reader: Arc<dyn ReminderReader>,
    pub event_publisher: Arc<dyn EventPublisher>,
    pub limits: LookaheadLimits,
    pub default_reminder_method: ReminderMethod,
}

impl SubscriptionAppState {
    pub fn create_handler(&self) -> CreateSubscriptionHandler {
        CreateSubscriptionHandler::new(self.repository.clone(), self.event_publisher.clone())
    }

    pub fn update_handler(&self) -> UpdateSubscriptionHandler {
        UpdateSubscriptionHandler::new(self.repository.clone(), self.event_publisher.clone())
    }

    pub fn cancel_handler(&self) -> CancelSubscriptionHandler {
        CancelSubscriptionHandler::new(self.repository.clone(), self.event_publisher.clone())
    }

    pub fn record_payment_handler(&self) -> RecordPaymentHandler {
        RecordPaymentHandler::new(self.repository.clone(), self.event_publisher.clone())
    }

    pub fn configure_reminders_handler(&self) -> ConfigureRemindersHandler {
        ConfigureRemindersHandler::new(self.repository.clone(), self.event_publisher.clone())
    }

    pub fn pause_handler(&self) -> PauseSubscriptionHandler {
        PauseSubscriptionHandler::new(self.repository.clone(), self.event_publisher.clone())
    }

    pub fn resume_handler(&self) -> ResumeSubscriptionHandler {
        ResumeSubscriptionHandler::new(self.repository.clone(), self.event_publisher.clone())
    }

    pub fn get_handler(&self) -> GetSubscriptionHandler {
        GetSubscriptionHandler::new(self.reader.clone())
    }

    pub fn list_handler(&self) -> ListSubscriptionsHandler {
        ListSubscriptionsHandler::new(self.reader.clone())
    }

    pub fn upcoming_payments_handler(&self) -> GetUpcomingPaymentsHandler {
        GetUpcomingPaymentsHandler::new(self.reader.clone(), self.limits)
    }

    pub fn upcoming_reminders_handler(&self) -> GetUpcomingRemindersHandler {
        GetUpcomingRemindersHandler::new(self.reminder_reader.clone(), self.limits)
    }

    pub fn monthly_cost_handler(&self) -> GetMonthlyCostHandler {
        GetMonthlyCostHandler::new(self.reader.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Extraction Helpers
// ════════════════════════════════════════════════════════════════════════════════

fn parse_id(raw: &str) -> Result<SubscriptionId, SubscriptionApiError> {
    raw.parse()
        .map_err(|_| SubscriptionApiError::UnknownId(raw.to_string()))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, SubscriptionApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| SubscriptionApiError::field("body", rejection.body_text()))
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, SubscriptionApiError> {
    params
        .map(|Query(value)| value)
        .map_err(|rejection| SubscriptionApiError::field("query", rejection.body_text()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST/PUT endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/subscriptions - Add a subscription
pub async fn create_subscription(
    State(state): State<SubscriptionAppState>,
    RequestMetadata(metadata): RequestMetadata,
    payload: Result<Json<CreateSubscriptionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let cmd = body(payload)?.into_command()?;
    let result = state.create_handler().handle(cmd, metadata).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionResponse::try_from(result.subscription)?),
    ))
}

/// PUT /api/subscriptions/:id - Change descriptive and billing fields
pub async fn update_subscription(
    State(state): State<SubscriptionAppState>,
    RequestMetadata(metadata): RequestMetadata,
    Path(id): Path<String>,
    payload: Result<Json<UpdateSubscriptionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let subscription_id = parse_id(&id)?;
    let terms = body(payload)?.into_terms()?;

    let result = state
        .update_handler()
        .handle(
            UpdateSubscriptionCommand {
                subscription_id,
                terms,
            },
            metadata,
        )
        .await?;

    Ok(Json(SubscriptionResponse::try_from(result.subscription)?))
}

/// POST /api/subscriptions/:id/cancel - Cancel with an end date
pub async fn cancel_subscription(
    State(state): State<SubscriptionAppState>,
    RequestMetadata(metadata): RequestMetadata,
    Path(id): Path<String>,
    payload: Result<Json<CancelSubscriptionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let subscription_id = parse_id(&id)?;
    let end_date = body(payload)?.into_end_date()?;

    let result = state
        .cancel_handler()
        .handle(
            CancelSubscriptionCommand {
                subscription_id,
                end_date,
            },
            metadata,
        )
        .await?;

    Ok(Json(SubscriptionResponse::try_from(result.subscription)?))
}

/// POST /api/subscriptions/:id/payments - Record a payment
pub async fn record_payment(
    State(state): State<SubscriptionAppState>,
    RequestMetadata(metadata): RequestMetadata,
    Path(id): Path<String>,
    payload: Result<Json<RecordPaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let subscription_id = parse_id(&id)?;
    let fields = body(payload)?.into_fields()?;

    let result = state
        .record_payment_handler()
        .handle(
            RecordPaymentCommand {
                subscription_id,
                payment_id: fields.payment_id,
                amount: fields.amount,
                payment_date: fields.payment_date,
                notes: fields.notes,
            },
            metadata,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(PaymentResponse::from(result))))
}

/// POST /api/subscriptions/:id/reminders - Replace reminder settings
pub async fn configure_reminders(
    State(state): State<SubscriptionAppState>,
    RequestMetadata(metadata): RequestMetadata,
    Path(id): Path<String>,
    payload: Result<Json<ConfigureRemindersRequest>, JsonRejection>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let subscription_id = parse_id(&id)?;
    let fields = body(payload)?.into_fields(state.default_reminder_method)?;

    let result = state
        .configure_reminders_handler()
        .handle(
            ConfigureRemindersCommand {
                subscription_id,
                days_before: fields.days_before,
                enabled: fields.enabled,
                method: fields.method,
            },
            metadata,
        )
        .await?;

    Ok(Json(SubscriptionResponse::try_from(result.subscription)?))
}

/// POST /api/subscriptions/:id/pause
pub async fn pause_subscription(
    State(state): State<SubscriptionAppState>,
    RequestMetadata(metadata): RequestMetadata,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let subscription_id = parse_id(&id)?;
    let result = state
        .pause_handler()
        .handle(PauseSubscriptionCommand { subscription_id }, metadata)
        .await?;

    Ok(Json(SubscriptionResponse::try_from(result.subscription)?))
}

/// POST /api/subscriptions/:id/resume
pub async fn resume_subscription(
    State(state): State<SubscriptionAppState>,
    RequestMetadata(metadata): RequestMetadata,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let subscription_id = parse_id(&id)?;
    let result = state
        .resume_handler()
        .handle(ResumeSubscriptionCommand { subscription_id }, metadata)
        .await?;

    Ok(Json(SubscriptionResponse::try_from(result.subscription)?))
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/subscriptions?status=S - List subscriptions by name
pub async fn list_subscriptions(
    State(state): State<SubscriptionAppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let status = query(params)?.status()?;
    let result = state
        .list_handler()
        .handle(ListSubscriptionsQuery { status })
        .await?;

    Ok(Json(SubscriptionListResponse::from(result)))
}

/// GET /api/subscriptions/:id - Detailed view with payments
pub async fn get_subscription(
    State(state): State<SubscriptionAppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let subscription_id = parse_id(&id)?;
    let view = state
        .get_handler()
        .handle(GetSubscriptionQuery { subscription_id })
        .await?;

    Ok(Json(view))
}

/// GET /api/upcoming-payments?days_ahead=N
pub async fn upcoming_payments(
    State(state): State<SubscriptionAppState>,
    params: Result<Query<LookaheadParams>, QueryRejection>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let days_ahead = query(params)?.days_ahead()?;
    let report = state
        .upcoming_payments_handler()
        .handle(GetUpcomingPaymentsQuery {
            today: Timestamp::today(),
            days_ahead,
        })
        .await?;

    Ok(Json(report))
}

/// GET /api/upcoming-reminders?days_ahead=N
pub async fn upcoming_reminders(
    State(state): State<SubscriptionAppState>,
    params: Result<Query<LookaheadParams>, QueryRejection>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let days_ahead = query(params)?.days_ahead()?;
    let report = state
        .upcoming_reminders_handler()
        .handle(GetUpcomingRemindersQuery {
            today: Timestamp::today(),
            days_ahead,
        })
        .await?;

    Ok(Json(report))
}

/// GET /api/subscriptions/monthly-cost
pub async fn monthly_cost(
    State(state): State<SubscriptionAppState>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let report = state
        .monthly_cost_handler()
        .handle(GetMonthlyCostQuery)
        .await?;

    Ok(Json(report))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error wrapper for converting application errors to HTTP responses.
#[derive(Debug)]
pub enum SubscriptionApiError {
    Domain(SubscriptionError),
    Validation(FieldErrors),
    UnknownId(String),
}

impl SubscriptionApiError {
    fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        SubscriptionApiError::Validation(errors)
    }
}

impl From<SubscriptionError> for SubscriptionApiError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::ValidationFailed { field, message } => Self::field(&field, message),
            other => SubscriptionApiError::Domain(other),
        }
    }
}

impl From<FieldErrors> for SubscriptionApiError {
    fn from(errors: FieldErrors) -> Self {
        SubscriptionApiError::Validation(errors)
    }
}

impl IntoResponse for SubscriptionApiError {
    fn into_response(self) -> Response {
        let err = match self {
            SubscriptionApiError::Validation(errors) => {
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(ValidationErrorResponse::new(errors)),
                )
                    .into_response();
            }
            SubscriptionApiError::UnknownId(raw) => {
                let body = ErrorResponse::new(
                    ErrorCode::SubscriptionNotFound.to_string(),
                    format!("Subscription not found: {}", raw),
                );
                return (StatusCode::NOT_FOUND, Json(body)).into_response();
            }
            SubscriptionApiError::Domain(err) => err,
        };

        let code = err.code();
        let status = match &err {
            SubscriptionError::NotFound(_) => StatusCode::NOT_FOUND,
            SubscriptionError::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            SubscriptionError::InvalidState { .. } | SubscriptionError::InvalidArgument { .. } => {
                StatusCode::BAD_REQUEST
            }
            SubscriptionError::Infrastructure { code, .. } => match code {
                ErrorCode::SubscriptionNotFound => StatusCode::NOT_FOUND,
                ErrorCode::ConcurrentModification | ErrorCode::DuplicatePayment => {
                    StatusCode::CONFLICT
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error_code = %code, error = %err, "Subscription request failed");
            "Internal server error".to_string()
        } else {
            err.to_string()
        };

        (status, Json(ErrorResponse::new(code.to_string(), message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, PaymentId};
    use crate::domain::subscription::SubscriptionStatus;

    fn status_of(err: SubscriptionApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = SubscriptionApiError::from(SubscriptionError::not_found(SubscriptionId::new()));
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_state_maps_to_400() {
        let err = SubscriptionApiError::from(SubscriptionError::invalid_state(
            SubscriptionStatus::Cancelled,
            "cancel",
        ));
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_argument_maps_to_400() {
        let err = SubscriptionApiError::from(SubscriptionError::invalid_argument(
            "days_before",
            "must be at least 1",
        ));
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn validation_failed_maps_to_422() {
        let err = SubscriptionApiError::from(SubscriptionError::validation(
            "days_ahead",
            "must be between 1 and 365",
        ));
        assert!(matches!(err, SubscriptionApiError::Validation(ref e) if e.contains_key("days_ahead")));
        assert_eq!(status_of(err), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn infrastructure_maps_by_code() {
        let conflict = SubscriptionError::Infrastructure {
            code: ErrorCode::ConcurrentModification,
            message: "stale".to_string(),
        };
        assert_eq!(status_of(conflict.into()), StatusCode::CONFLICT);

        let duplicate = SubscriptionError::from(DomainError::duplicate_payment(PaymentId::new()));
        assert_eq!(status_of(duplicate.into()), StatusCode::CONFLICT);

        let database = SubscriptionError::Infrastructure {
            code: ErrorCode::DatabaseError,
            message: "connection refused".to_string(),
        };
        assert_eq!(status_of(database.into()), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_id_maps_to_404() {
        let err = parse_id("not-a-uuid").unwrap_err();
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }
}
