//! Error types for the domain layer.
//!
//! One taxonomy for everything the application layer can surface. The HTTP
//! adapter owns the mapping to status codes; provider and storage failures
//! carry internal detail that must never reach a response body.

use thiserror::Error;

/// Errors produced by domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A request field is missing or malformed.
    #[error("Field '{field}' {reason}")]
    Validation { field: &'static str, reason: &'static str },

    /// The email is already registered.
    #[error("Email is already registered")]
    DuplicateEmail,

    /// Login failed. Deliberately covers both unknown email and wrong
    /// password so the response cannot be used to enumerate accounts.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No user matches the given id or email.
    #[error("User not found")]
    UserNotFound,

    /// The payment provider could not be reached or returned an error.
    #[error("Payment provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The persistence layer failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Missing-field validation error.
    pub fn missing(field: &'static str) -> Self {
        DomainError::Validation {
            field,
            reason: "is required",
        }
    }

    /// Malformed-field validation error.
    pub fn invalid(field: &'static str, reason: &'static str) -> Self {
        DomainError::Validation { field, reason }
    }

    /// Whether this error represents an infrastructure failure, as opposed
    /// to a caller mistake. The webhook path retries on exactly these.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            DomainError::ProviderUnavailable(_) | DomainError::Storage(_)
        )
    }
}
