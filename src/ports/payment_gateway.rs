//! Payment gateway port - the boundary to the payment provider.
//!
//! Defines the contract for checkout-preference creation and authoritative
//! payment read-back (Mercado Pago in production). The gateway is an
//! untrusted, network-fallible collaborator: every failure is opaque to
//! callers, and a notification referencing a payment is only a pointer.
//! `fetch_payment` is the sole source of truth for a payment's status.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for payment provider integrations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a checkout preference and returns the redirect target.
    async fn create_preference(
        &self,
        request: PreferenceRequest,
    ) -> Result<CheckoutPreference, GatewayError>;

    /// Fetches the authoritative record for a payment by provider id.
    ///
    /// Must be used instead of trusting any status field pushed in a
    /// notification payload.
    async fn fetch_payment(&self, payment_id: &str) -> Result<PaymentRecord, GatewayError>;
}

/// Request to create a checkout preference.
#[derive(Debug, Clone, Serialize)]
pub struct PreferenceRequest {
    /// Line items; this service always sends exactly one.
    pub items: Vec<PreferenceItem>,

    /// Payer email for checkout prefill.
    pub payer_email: String,

    /// Internal user id rendered as text; echoed back on the payment.
    pub external_reference: String,

    /// Where the provider redirects the browser after checkout.
    pub back_urls: BackUrls,

    /// Where the provider POSTs asynchronous payment notifications.
    pub notification_url: String,
}

/// A single line item on a preference.
#[derive(Debug, Clone, Serialize)]
pub struct PreferenceItem {
    pub title: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub currency_id: String,
}

/// Browser return targets for the three checkout outcomes.
#[derive(Debug, Clone, Serialize)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

/// A created checkout preference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutPreference {
    /// Provider's preference id.
    pub id: String,

    /// URL the client must send the end user to.
    pub init_point: String,
}

/// Authoritative payment record as read back from the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub status: PaymentStatus,

    /// The `external_reference` stamped at preference creation, if any.
    pub external_reference: Option<String>,
}

/// Payment status from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment settled; the only status that grants entitlement.
    Approved,

    /// Awaiting settlement (e.g. offline payment methods).
    Pending,

    /// Declined or charged back.
    Rejected,

    /// Any status this service does not act on.
    Other(String),
}

impl PaymentStatus {
    /// Parses the provider's status string.
    pub fn parse(s: &str) -> Self {
        match s {
            "approved" => PaymentStatus::Approved,
            "pending" => PaymentStatus::Pending,
            "rejected" => PaymentStatus::Rejected,
            other => PaymentStatus::Other(other.to_string()),
        }
    }

    /// Whether this status grants the paid entitlement.
    pub fn grants_entitlement(&self) -> bool {
        matches!(self, PaymentStatus::Approved)
    }
}

/// Errors from gateway operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// Could not reach the provider.
    #[error("network error: {0}")]
    Network(String),

    /// The call exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The provider rejected our credentials.
    #[error("authentication rejected by provider")]
    Authentication,

    /// The provider answered with an unexpected status or body.
    #[error("provider error: {0}")]
    Provider(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }

    #[test]
    fn status_parsing_covers_known_values() {
        assert_eq!(PaymentStatus::parse("approved"), PaymentStatus::Approved);
        assert_eq!(PaymentStatus::parse("pending"), PaymentStatus::Pending);
        assert_eq!(PaymentStatus::parse("rejected"), PaymentStatus::Rejected);
        assert_eq!(
            PaymentStatus::parse("in_mediation"),
            PaymentStatus::Other("in_mediation".to_string())
        );
    }

    #[test]
    fn only_approved_grants_entitlement() {
        assert!(PaymentStatus::Approved.grants_entitlement());
        assert!(!PaymentStatus::Pending.grants_entitlement());
        assert!(!PaymentStatus::Rejected.grants_entitlement());
        assert!(!PaymentStatus::Other("refunded".into()).grants_entitlement());
    }
}
