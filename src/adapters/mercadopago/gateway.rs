//! Mercado Pago payment gateway adapter.
//!
//! Implements the `PaymentGateway` trait over the Mercado Pago REST API:
//! `POST /checkout/preferences` for checkout creation and
//! `GET /v1/payments/{id}` for authoritative payment read-back.
//!
//! # Security
//!
//! - The access token is held in a `secrecy::SecretString` and only exposed
//!   at the moment the Authorization header is built.
//! - Every request carries a timeout; a hung provider call surfaces as
//!   `GatewayError::Timeout` instead of hanging the inbound request.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::PaymentConfig;
use crate::ports::{
    CheckoutPreference, GatewayError, PaymentGateway, PaymentRecord, PaymentStatus,
    PreferenceRequest,
};

use super::types::{PaymentResponse, PreferencePayload, PreferenceResponse};

/// Mercado Pago API configuration.
#[derive(Clone)]
pub struct MercadoPagoConfig {
    /// Access token (APP_USR-... or TEST-...).
    access_token: SecretString,

    /// Base URL for the API (default: https://api.mercadopago.com).
    api_base_url: String,

    /// Per-request timeout.
    timeout: Duration,
}

impl MercadoPagoConfig {
    /// Create a new configuration.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            api_base_url: "https://api.mercadopago.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Build from the application payment configuration.
    pub fn from_payment(config: &PaymentConfig) -> Self {
        Self {
            access_token: config.access_token.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.http_timeout_secs),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Mercado Pago payment gateway.
pub struct MercadoPagoGateway {
    config: MercadoPagoConfig,
    http_client: reqwest::Client,
}

impl MercadoPagoGateway {
    /// Create a new gateway with the given configuration.
    pub fn new(config: MercadoPagoConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn map_transport_error(e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Network(e.to_string())
        }
    }

    fn map_status_error(status: reqwest::StatusCode) -> GatewayError {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            GatewayError::Authentication
        } else {
            GatewayError::Provider(format!("unexpected status {status}"))
        }
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoGateway {
    async fn create_preference(
        &self,
        request: PreferenceRequest,
    ) -> Result<CheckoutPreference, GatewayError> {
        let payload = PreferencePayload::from(request);
        let url = format!("{}/checkout/preferences", self.config.api_base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.config.access_token.expose_secret())
            .timeout(self.config.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "preference creation request failed");
                Self::map_transport_error(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "preference creation rejected");
            return Err(Self::map_status_error(status));
        }

        let body: PreferenceResponse = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "preference response unreadable");
            GatewayError::Provider(format!("invalid response body: {e}"))
        })?;

        Ok(CheckoutPreference {
            id: body.id,
            init_point: body.init_point,
        })
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<PaymentRecord, GatewayError> {
        let url = format!("{}/v1/payments/{}", self.config.api_base_url, payment_id);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.config.access_token.expose_secret())
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, payment_id = %payment_id, "payment fetch failed");
                Self::map_transport_error(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, payment_id = %payment_id, "payment fetch rejected");
            return Err(Self::map_status_error(status));
        }

        let body: PaymentResponse = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, payment_id = %payment_id, "payment response unreadable");
            GatewayError::Provider(format!("invalid response body: {e}"))
        })?;

        Ok(PaymentRecord {
            status: PaymentStatus::parse(&body.status),
            external_reference: body.external_reference,
        })
    }
}
