//! HTTP DTOs for the public API.
//!
//! Request fields are `Option` so that a missing field is reported as a
//! 400 with the field name rather than a generic deserialization
//! rejection. The webhook types tolerate anything: a notification body is
//! untrusted input and never worth a parse failure.

use serde::{Deserialize, Serialize};

use crate::domain::User;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /register`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /create-payment-preference`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePreferenceRequest {
    pub user_id: Option<String>,
    pub user_email: Option<String>,
}

/// Body of `POST /confirm-payment`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub user_id: Option<String>,
}

/// Body of `POST /mark-as-paid`.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkAsPaidRequest {
    pub email: Option<String>,
}

/// Provider notification body, `{type, data: {id}}`.
///
/// Every field is optional; classification happens in the coordinator.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookNotification {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub data: Option<WebhookData>,
}

/// Resource pointer inside a notification.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookData {
    /// The provider sends this as a string or a number depending on the
    /// notification channel.
    pub id: Option<serde_json::Value>,
}

impl WebhookData {
    /// The resource id as text, whatever JSON type it arrived as.
    pub fn id_as_string(&self) -> Option<String> {
        match &self.id {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Public view of a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_paid: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            is_paid: user.has_paid,
        }
    }
}

/// Response of `POST /create-payment-preference`.
///
/// `init_point` keeps the provider's field name; the frontend forwards the
/// browser straight to it.
#[derive(Debug, Clone, Serialize)]
pub struct PreferenceResponse {
    pub id: String,
    pub init_point: String,
}

/// Generic confirmation message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body: a stable code plus a user-safe message.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &'static str, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
        }
    }
}
