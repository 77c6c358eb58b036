//! HTTP handlers for the public API.
//!
//! Handlers stay thin: extract and validate the request shape, call the
//! application layer, map the result. All status-code policy lives in
//! [`ApiError`]; the webhook handler is the one place where the status
//! code itself is a retry signal to the provider.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::application::{CredentialService, EntitlementCoordinator, ProviderNotification};
use crate::domain::{DomainError, UserId};

use super::dto::{
    ConfirmPaymentRequest, CreatePreferenceRequest, ErrorResponse, LoginRequest, MarkAsPaidRequest,
    MessageResponse, PreferenceResponse, RegisterRequest, UserResponse, WebhookNotification,
};

/// Header carrying the pre-shared operator token for override endpoints.
const OPERATOR_TOKEN_HEADER: &str = "x-operator-token";

// ════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialService>,
    pub entitlement: Arc<EntitlementCoordinator>,
    /// Gate for `/mark-as-paid`.
    pub operator_token: SecretString,
}

// ════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /health - liveness probe
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// POST /register - create an account
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = required(request.name.as_deref(), "name")?;
    let email = required(request.email.as_deref(), "email")?;
    let password = required(request.password.as_deref(), "password")?;

    let user = state.credentials.register(name, email, password).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// POST /login - credential check
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = required(request.email.as_deref(), "email")?;
    let password = required(request.password.as_deref(), "password")?;

    let user = state.credentials.authenticate(email, password).await?;

    Ok(Json(UserResponse::from(user)))
}

/// POST /create-payment-preference - start the checkout flow
pub async fn create_payment_preference(
    State(state): State<AppState>,
    Json(request): Json<CreatePreferenceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = required(request.user_id.as_deref(), "userId")?;
    let user_email = required(request.user_email.as_deref(), "userEmail")?;

    let user_id: UserId = user_id
        .parse()
        .map_err(|_| DomainError::invalid("userId", "is not a valid user id"))?;

    let preference = state
        .entitlement
        .create_preference(user_id, user_email)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PreferenceResponse {
            id: preference.id,
            init_point: preference.init_point,
        }),
    ))
}

/// POST /payment-webhook - provider notification sink
///
/// The body is read leniently: anything that doesn't parse is logged and
/// acknowledged with 200, because a malformed event will be identical on
/// every redelivery and must not loop forever. Only infrastructure
/// failures return 500, which asks the provider to redeliver.
pub async fn payment_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let notification: WebhookNotification = match serde_json::from_slice(&body) {
        Ok(notification) => notification,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable webhook body, acknowledging");
            return Ok(StatusCode::OK);
        }
    };

    let notification = ProviderNotification {
        event_type: notification.event_type.unwrap_or_default(),
        resource_id: notification.data.as_ref().and_then(|d| d.id_as_string()),
    };

    state.entitlement.handle_notification(notification).await?;

    Ok(StatusCode::OK)
}

/// POST /confirm-payment - client-reported success after the redirect
pub async fn confirm_payment(
    State(state): State<AppState>,
    Json(request): Json<ConfirmPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = required(request.user_id.as_deref(), "userId")?;
    let user_id: UserId = user_id
        .parse()
        .map_err(|_| DomainError::invalid("userId", "is not a valid user id"))?;

    state.entitlement.confirm_from_client(user_id).await?;

    Ok(Json(MessageResponse::new(
        "Payment confirmed. Access granted.",
    )))
}

/// POST /mark-as-paid - operator override, token-gated
pub async fn mark_as_paid(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<MarkAsPaidRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize_operator(&headers, &state.operator_token)?;

    let email = required(request.email.as_deref(), "email")?;

    state.entitlement.mark_paid_manually(email).await?;

    Ok(Json(MessageResponse::new("User marked as paid.")))
}

/// Requires the operator token header to match the configured secret.
///
/// Comparison is constant-time so the token cannot be guessed byte by
/// byte from response timing.
fn authorize_operator(headers: &HeaderMap, expected: &SecretString) -> Result<(), ApiError> {
    let provided = headers
        .get(OPERATOR_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let matches: bool = provided
        .as_bytes()
        .ct_eq(expected.expose_secret().as_bytes())
        .into();

    if matches {
        Ok(())
    } else {
        tracing::warn!("operator endpoint called without a valid token");
        Err(ApiError::unauthorized_operator())
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(DomainError::missing(field).into()),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════

/// API error that maps the domain taxonomy to HTTP responses.
///
/// Provider and storage detail is logged server-side and replaced with an
/// opaque message before it reaches the wire.
pub struct ApiError(ApiErrorKind);

enum ApiErrorKind {
    Domain(DomainError),
    OperatorUnauthorized,
}

impl ApiError {
    fn unauthorized_operator() -> Self {
        Self(ApiErrorKind::OperatorUnauthorized)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(ApiErrorKind::Domain(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match &self.0 {
            ApiErrorKind::Domain(err) => match err {
                DomainError::Validation { .. } => (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("VALIDATION_FAILED", err.to_string()),
                ),
                DomainError::DuplicateEmail => (
                    StatusCode::CONFLICT,
                    ErrorResponse::new("EMAIL_TAKEN", "Email is already registered."),
                ),
                DomainError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse::new("INVALID_CREDENTIALS", "Invalid credentials."),
                ),
                DomainError::UserNotFound => (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new("USER_NOT_FOUND", "User not found."),
                ),
                DomainError::ProviderUnavailable(detail) => {
                    tracing::error!(detail = %detail, "payment provider failure");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorResponse::new(
                            "PAYMENT_PROVIDER_ERROR",
                            "Could not reach the payment provider.",
                        ),
                    )
                }
                DomainError::Storage(detail) => {
                    tracing::error!(detail = %detail, "storage failure");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorResponse::new("INTERNAL_ERROR", "Internal server error."),
                    )
                }
            },
            ApiErrorKind::OperatorUnauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("OPERATOR_TOKEN_REQUIRED", "Operator token missing or wrong."),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    // ════════════════════════════════════════════════════════════════════════
    // Error Mapping Tests
    // ════════════════════════════════════════════════════════════════════════

    fn status_of(err: DomainError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn api_error_maps_validation_to_400() {
        assert_eq!(status_of(DomainError::missing("email")), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_maps_duplicate_email_to_409() {
        assert_eq!(status_of(DomainError::DuplicateEmail), StatusCode::CONFLICT);
    }

    #[test]
    fn api_error_maps_invalid_credentials_to_401() {
        assert_eq!(
            status_of(DomainError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn api_error_maps_not_found_to_404() {
        assert_eq!(status_of(DomainError::UserNotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_maps_provider_failure_to_500() {
        assert_eq!(
            status_of(DomainError::ProviderUnavailable("tls handshake".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn api_error_maps_storage_failure_to_500() {
        assert_eq!(
            status_of(DomainError::Storage("pool exhausted".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    // ════════════════════════════════════════════════════════════════════════
    // Operator Authorization Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn operator_check_accepts_matching_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            OPERATOR_TOKEN_HEADER,
            HeaderValue::from_static("op-secret"),
        );

        let expected = SecretString::new("op-secret".to_string());
        assert!(authorize_operator(&headers, &expected).is_ok());
    }

    #[test]
    fn operator_check_rejects_wrong_and_missing_tokens() {
        let expected = SecretString::new("op-secret".to_string());

        let mut wrong = HeaderMap::new();
        wrong.insert(OPERATOR_TOKEN_HEADER, HeaderValue::from_static("guess"));
        assert!(authorize_operator(&wrong, &expected).is_err());

        let missing = HeaderMap::new();
        assert!(authorize_operator(&missing, &expected).is_err());
    }
}
