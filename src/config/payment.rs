//! Payment configuration (Mercado Pago)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration.
///
/// Covers the provider credential, the URLs the checkout flow is built
/// from, the fixed product being sold, and the operator override token.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Mercado Pago access token
    pub access_token: SecretString,

    /// Base URL for the Mercado Pago API (overridable for tests)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Timeout for provider API calls, in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Frontend origin; checkout back-URLs are built from it
    pub frontend_url: String,

    /// Public origin of this service; the webhook callback URL is built
    /// from it
    pub backend_url: String,

    /// Pre-shared operator token gating the manual mark-as-paid endpoint
    pub operator_token: SecretString,

    /// Product title shown at checkout
    #[serde(default = "default_product_title")]
    pub product_title: String,

    /// Product description shown at checkout
    #[serde(default = "default_product_description")]
    pub product_description: String,

    /// Product unit price, in the configured currency
    #[serde(default = "default_unit_price")]
    pub unit_price: f64,

    /// ISO currency id
    #[serde(default = "default_currency_id")]
    pub currency_id: String,
}

impl PaymentConfig {
    /// Frontend origin with any trailing slash removed.
    pub fn frontend_origin(&self) -> &str {
        self.frontend_url.trim_end_matches('/')
    }

    /// Backend origin with any trailing slash removed.
    pub fn backend_origin(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.access_token.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__ACCESS_TOKEN"));
        }
        if self.operator_token.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__OPERATOR_TOKEN"));
        }
        if !is_http_url(&self.frontend_url) {
            return Err(ValidationError::InvalidUrl("frontend_url"));
        }
        if !is_http_url(&self.backend_url) {
            return Err(ValidationError::InvalidUrl("backend_url"));
        }
        if !is_http_url(&self.api_base_url) {
            return Err(ValidationError::InvalidUrl("api_base_url"));
        }
        if self.unit_price <= 0.0 {
            return Err(ValidationError::InvalidUnitPrice);
        }
        Ok(())
    }
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

fn default_api_base_url() -> String {
    "https://api.mercadopago.com".to_string()
}

fn default_http_timeout() -> u64 {
    10
}

fn default_product_title() -> String {
    "Acceso a 10 Ideas de Negocio Exclusivas".to_string()
}

fn default_product_description() -> String {
    "Contenido digital con guías en PDF para emprender.".to_string()
}

fn default_unit_price() -> f64 {
    1300.0
}

fn default_currency_id() -> String {
    "ARS".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> PaymentConfig {
        PaymentConfig {
            access_token: SecretString::new("APP_USR-token".to_string()),
            api_base_url: default_api_base_url(),
            http_timeout_secs: default_http_timeout(),
            frontend_url: "https://ideas.example.com/".to_string(),
            backend_url: "https://api.ideas.example.com".to_string(),
            operator_token: SecretString::new("op-secret".to_string()),
            product_title: default_product_title(),
            product_description: default_product_description(),
            unit_price: default_unit_price(),
            currency_id: default_currency_id(),
        }
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validation_missing_access_token() {
        let config = PaymentConfig {
            access_token: SecretString::new(String::new()),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_missing_operator_token() {
        let config = PaymentConfig {
            operator_token: SecretString::new(String::new()),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_non_http_urls() {
        let config = PaymentConfig {
            frontend_url: "ideas.example.com".to_string(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_non_positive_price() {
        let config = PaymentConfig {
            unit_price: 0.0,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_origins_strip_trailing_slash() {
        let config = valid_config();
        assert_eq!(config.frontend_origin(), "https://ideas.example.com");
        assert_eq!(config.backend_origin(), "https://api.ideas.example.com");
    }

    #[test]
    fn test_product_defaults_match_catalog() {
        let config = valid_config();
        assert_eq!(config.unit_price, 1300.0);
        assert_eq!(config.currency_id, "ARS");
    }
}
