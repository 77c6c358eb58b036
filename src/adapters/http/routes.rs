//! Axum router for the public API.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    confirm_payment, create_payment_preference, health, login, mark_as_paid, payment_webhook,
    register, AppState,
};

/// Create the API router.
///
/// # Routes
///
/// ## Account
/// - `POST /register` - create an account
/// - `POST /login` - credential check
///
/// ## Payment flow
/// - `POST /create-payment-preference` - start checkout
/// - `POST /payment-webhook` - provider notifications (no auth; the
///   handler re-verifies against the provider instead)
/// - `POST /confirm-payment` - client-reported success fallback
///
/// ## Operator
/// - `POST /mark-as-paid` - manual override, requires `X-Operator-Token`
///
/// ## Infrastructure
/// - `GET /health` - liveness probe
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/create-payment-preference", post(create_payment_preference))
        .route("/payment-webhook", post(payment_webhook))
        .route("/confirm-payment", post(confirm_payment))
        .route("/mark-as-paid", post(mark_as_paid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use secrecy::SecretString;

    use crate::adapters::memory::InMemoryAccountStore;
    use crate::adapters::mercadopago::MockPaymentGateway;
    use crate::application::{CredentialService, EntitlementConfig, EntitlementCoordinator};

    fn test_state() -> AppState {
        let store = Arc::new(InMemoryAccountStore::new());
        let gateway = Arc::new(MockPaymentGateway::new());
        let config = EntitlementConfig {
            product_title: "t".to_string(),
            product_description: "d".to_string(),
            unit_price: 1300.0,
            currency_id: "ARS".to_string(),
            frontend_origin: "http://front".to_string(),
            backend_origin: "http://back".to_string(),
        };

        AppState {
            credentials: Arc::new(CredentialService::new(store.clone())),
            entitlement: Arc::new(EntitlementCoordinator::new(store, gateway, config)),
            operator_token: SecretString::new("op-secret".to_string()),
        }
    }

    #[test]
    fn api_routes_creates_router() {
        let router = api_routes();
        let _: Router<()> = router.with_state(test_state());
    }
}
