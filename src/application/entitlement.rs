//! Entitlement coordinator - the payment-confirmation state machine.
//!
//! Three independent signals can claim that a user's payment succeeded:
//!
//! 1. the provider's asynchronous webhook (push, at-least-once, unordered),
//! 2. the client's confirm call after the browser redirect (pull),
//! 3. an operator override.
//!
//! All three converge on one idempotent transition: the user's monotonic
//! paid flag is set, never incremented and never reset. The webhook path is
//! the only authoritative one: it re-fetches the payment record from the
//! gateway by id and ignores any status carried in the notification body.
//!
//! ## Redelivery contract
//!
//! The provider redelivers a notification until it is acknowledged.
//! Irrelevant, malformed, or non-approved events must therefore be
//! acknowledged as handled (`Disregarded`), never surfaced as errors; only
//! gateway and store failures propagate, which the HTTP layer turns into a
//! retry signal.

use std::sync::Arc;

use crate::config::PaymentConfig;
use crate::domain::{DomainError, UserId};
use crate::ports::{
    AccountStore, BackUrls, CheckoutPreference, PaymentGateway, PreferenceItem, PreferenceRequest,
};

/// Provider event type that carries a payment reference.
const PAYMENT_EVENT_TYPE: &str = "payment";

/// Checkout construction parameters, derived from [`PaymentConfig`].
#[derive(Debug, Clone)]
pub struct EntitlementConfig {
    pub product_title: String,
    pub product_description: String,
    pub unit_price: f64,
    pub currency_id: String,
    /// Frontend origin the back-URLs point at (no trailing slash).
    pub frontend_origin: String,
    /// Public origin of this service for the webhook callback.
    pub backend_origin: String,
}

impl EntitlementConfig {
    pub fn from_payment(config: &PaymentConfig) -> Self {
        Self {
            product_title: config.product_title.clone(),
            product_description: config.product_description.clone(),
            unit_price: config.unit_price,
            currency_id: config.currency_id.clone(),
            frontend_origin: config.frontend_origin().to_string(),
            backend_origin: config.backend_origin().to_string(),
        }
    }
}

/// An inbound provider notification, reduced to what this service reads.
///
/// The body is treated as a pointer only: the event type decides whether we
/// care, and the resource id tells us which payment to look up. Nothing
/// else in the payload is trusted.
#[derive(Debug, Clone)]
pub struct ProviderNotification {
    /// Provider event type, e.g. `payment`.
    pub event_type: String,

    /// Provider id of the resource the event refers to.
    pub resource_id: Option<String>,
}

/// Outcome of processing a provider notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// An approved payment matched a user; the paid flag is set (it may
    /// already have been set by an earlier delivery or another path).
    Granted { user_id: UserId },

    /// The event was acknowledged without changing any state.
    Disregarded(DisregardReason),
}

/// Why a notification changed nothing. All of these are acknowledged as
/// successfully handled; none is a retry signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisregardReason {
    /// The event type is not `payment`.
    NotAPaymentEvent,

    /// A payment event without a resource id.
    MissingResourceId,

    /// The authoritative record's status does not grant entitlement.
    NotApproved,

    /// The payment carries no external reference.
    MissingReference,

    /// The external reference is not a user id.
    UnparseableReference,

    /// The reference parses but matches no user.
    UnknownUser,
}

/// Orchestrates checkout creation and payment-confirmation reconciliation.
pub struct EntitlementCoordinator {
    store: Arc<dyn AccountStore>,
    gateway: Arc<dyn PaymentGateway>,
    config: EntitlementConfig,
}

impl EntitlementCoordinator {
    pub fn new(
        store: Arc<dyn AccountStore>,
        gateway: Arc<dyn PaymentGateway>,
        config: EntitlementConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            config,
        }
    }

    /// Creates a checkout preference for the fixed product, tied to a user.
    ///
    /// The user must exist; this is checked before any provider call so a
    /// mistyped id cannot mint a preference whose approval would later match
    /// nobody. The payer email is prefill only and is not checked against
    /// the stored account email.
    pub async fn create_preference(
        &self,
        user_id: UserId,
        payer_email: &str,
    ) -> Result<CheckoutPreference, DomainError> {
        if self.store.find_by_id(user_id).await?.is_none() {
            return Err(DomainError::UserNotFound);
        }

        let request = PreferenceRequest {
            items: vec![PreferenceItem {
                title: self.config.product_title.clone(),
                description: self.config.product_description.clone(),
                quantity: 1,
                unit_price: self.config.unit_price,
                currency_id: self.config.currency_id.clone(),
            }],
            payer_email: payer_email.to_string(),
            external_reference: user_id.to_string(),
            back_urls: BackUrls {
                success: format!("{}/index.html?status=approved", self.config.frontend_origin),
                failure: format!("{}/index.html?status=failure", self.config.frontend_origin),
                pending: format!("{}/index.html?status=pending", self.config.frontend_origin),
            },
            notification_url: format!("{}/payment-webhook", self.config.backend_origin),
        };

        let preference = self.gateway.create_preference(request).await.map_err(|e| {
            tracing::error!(error = %e, user_id = %user_id, "preference creation failed");
            DomainError::ProviderUnavailable(e.to_string())
        })?;

        tracing::info!(
            preference_id = %preference.id,
            user_id = %user_id,
            "payment preference created"
        );
        Ok(preference)
    }

    /// Processes an asynchronous provider notification.
    ///
    /// The notification is untrusted and may be delivered any number of
    /// times, in any order. For a payment event, the authoritative record
    /// is fetched from the gateway; an approved status whose external
    /// reference names an existing user sets that user's paid flag.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures (gateway fetch, store update) are
    /// errors; the caller signals them to the provider so the event is
    /// redelivered. Everything else is a `Disregarded` acknowledgment.
    pub async fn handle_notification(
        &self,
        notification: ProviderNotification,
    ) -> Result<NotificationOutcome, DomainError> {
        if notification.event_type != PAYMENT_EVENT_TYPE {
            tracing::debug!(event_type = %notification.event_type, "ignoring non-payment event");
            return Ok(NotificationOutcome::Disregarded(
                DisregardReason::NotAPaymentEvent,
            ));
        }

        let payment_id = match notification.resource_id {
            Some(id) if !id.is_empty() => id,
            _ => {
                tracing::warn!("payment event without a resource id");
                return Ok(NotificationOutcome::Disregarded(
                    DisregardReason::MissingResourceId,
                ));
            }
        };

        // The notification body is only a pointer; fetch the authoritative
        // record before acting.
        let payment = self.gateway.fetch_payment(&payment_id).await.map_err(|e| {
            tracing::error!(error = %e, payment_id = %payment_id, "payment read-back failed");
            DomainError::ProviderUnavailable(e.to_string())
        })?;

        if !payment.status.grants_entitlement() {
            tracing::info!(
                payment_id = %payment_id,
                status = ?payment.status,
                "payment not approved, nothing to do"
            );
            return Ok(NotificationOutcome::Disregarded(DisregardReason::NotApproved));
        }

        let reference = match payment.external_reference.as_deref() {
            Some(r) if !r.is_empty() => r,
            _ => {
                tracing::warn!(payment_id = %payment_id, "approved payment without a reference");
                return Ok(NotificationOutcome::Disregarded(
                    DisregardReason::MissingReference,
                ));
            }
        };

        let user_id: UserId = match reference.parse() {
            Ok(id) => id,
            Err(_) => {
                tracing::warn!(
                    payment_id = %payment_id,
                    reference = %reference,
                    "external reference is not a user id"
                );
                return Ok(NotificationOutcome::Disregarded(
                    DisregardReason::UnparseableReference,
                ));
            }
        };

        // Monotonic set: repeat deliveries and concurrent writers all land
        // on has_paid = true with no read-modify-write.
        if self.store.set_paid_by_id(user_id).await? {
            tracing::info!(user_id = %user_id, payment_id = %payment_id, "access granted");
            Ok(NotificationOutcome::Granted { user_id })
        } else {
            tracing::warn!(
                user_id = %user_id,
                payment_id = %payment_id,
                "approved payment references an unknown user"
            );
            Ok(NotificationOutcome::Disregarded(DisregardReason::UnknownUser))
        }
    }

    /// Marks a user paid on the client's word, after the browser redirect.
    ///
    /// This path performs no provider verification: a forged query string
    /// reaches it just as easily as a real redirect. It exists because the
    /// redirect can arrive before the webhook does, and is a UX convenience
    /// rather than a security boundary. See DESIGN.md for the decision to
    /// keep it as-is instead of re-verifying.
    pub async fn confirm_from_client(&self, user_id: UserId) -> Result<(), DomainError> {
        if self.store.set_paid_by_id(user_id).await? {
            tracing::info!(user_id = %user_id, "access confirmed from client redirect");
            Ok(())
        } else {
            Err(DomainError::UserNotFound)
        }
    }

    /// Operator override: marks the user with the given email paid.
    ///
    /// The HTTP layer gates this behind the operator token; by the time it
    /// reaches the coordinator it is an authorized idempotent set.
    pub async fn mark_paid_manually(&self, email: &str) -> Result<(), DomainError> {
        if self.store.set_paid_by_email(email).await? {
            tracing::info!(email = %email, "access granted by operator");
            Ok(())
        } else {
            Err(DomainError::UserNotFound)
        }
    }
}
