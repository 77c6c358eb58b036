//! Mock payment gateway for testing.
//!
//! Configurable implementation of `PaymentGateway` for unit and
//! integration tests. Supports pre-configured payments, error injection,
//! and call tracking.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{
    CheckoutPreference, GatewayError, PaymentGateway, PaymentRecord, PreferenceRequest,
};

/// Mock payment gateway.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentGateway::new();
/// mock.insert_payment("PAY1", PaymentRecord {
///     status: PaymentStatus::Approved,
///     external_reference: Some(user_id.to_string()),
/// });
///
/// let record = mock.fetch_payment("PAY1").await?;
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Payments the gateway knows about, by provider id.
    payments: HashMap<String, PaymentRecord>,

    /// Preference returned on the next create call.
    next_preference: Option<CheckoutPreference>,

    /// When set, every call fails with this error.
    error: Option<GatewayError>,

    /// Preference requests seen, for assertions.
    created: Vec<PreferenceRequest>,

    /// Payment ids fetched, for assertions.
    fetched: Vec<String>,
}

impl MockPaymentGateway {
    /// Create a new mock with default behavior: preference creation
    /// succeeds with a canned redirect, payment lookups miss.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a payment record to be returned by `fetch_payment`.
    pub fn insert_payment(&self, payment_id: impl Into<String>, record: PaymentRecord) {
        self.inner
            .lock()
            .unwrap()
            .payments
            .insert(payment_id.into(), record);
    }

    /// Set the preference returned by the next `create_preference` call.
    pub fn set_preference(&self, preference: CheckoutPreference) {
        self.inner.lock().unwrap().next_preference = Some(preference);
    }

    /// Make every subsequent call fail with the given error.
    pub fn fail_with(&self, error: GatewayError) {
        self.inner.lock().unwrap().error = Some(error);
    }

    /// Clear an injected error.
    pub fn recover(&self) {
        self.inner.lock().unwrap().error = None;
    }

    /// Preference requests the mock has seen.
    pub fn created_requests(&self) -> Vec<PreferenceRequest> {
        self.inner.lock().unwrap().created.clone()
    }

    /// Payment ids fetched so far.
    pub fn fetched_ids(&self) -> Vec<String> {
        self.inner.lock().unwrap().fetched.clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_preference(
        &self,
        request: PreferenceRequest,
    ) -> Result<CheckoutPreference, GatewayError> {
        let mut state = self.inner.lock().unwrap();
        if let Some(error) = &state.error {
            return Err(error.clone());
        }
        state.created.push(request);
        Ok(state.next_preference.clone().unwrap_or(CheckoutPreference {
            id: "mock-pref-1".to_string(),
            init_point: "https://www.mercadopago.com/checkout/mock-pref-1".to_string(),
        }))
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<PaymentRecord, GatewayError> {
        let mut state = self.inner.lock().unwrap();
        if let Some(error) = &state.error {
            return Err(error.clone());
        }
        state.fetched.push(payment_id.to_string());
        state
            .payments
            .get(payment_id)
            .cloned()
            .ok_or_else(|| GatewayError::Provider(format!("payment {payment_id} not found")))
    }
}
