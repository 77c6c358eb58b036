//! Wire types for the Mercado Pago REST API.
//!
//! Request bodies match the `POST /checkout/preferences` schema; responses
//! keep only the fields this service reads.

use serde::{Deserialize, Serialize};

use crate::ports::PreferenceRequest;

/// Body for `POST /checkout/preferences`.
#[derive(Debug, Serialize)]
pub(super) struct PreferencePayload {
    pub items: Vec<ItemPayload>,
    pub payer: PayerPayload,
    pub external_reference: String,
    pub back_urls: BackUrlsPayload,
    pub notification_url: String,
    /// Auto-redirect the browser back on this outcome.
    pub auto_return: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct ItemPayload {
    pub title: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub currency_id: String,
}

#[derive(Debug, Serialize)]
pub(super) struct PayerPayload {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub(super) struct BackUrlsPayload {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

impl From<PreferenceRequest> for PreferencePayload {
    fn from(request: PreferenceRequest) -> Self {
        Self {
            items: request
                .items
                .into_iter()
                .map(|item| ItemPayload {
                    title: item.title,
                    description: item.description,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    currency_id: item.currency_id,
                })
                .collect(),
            payer: PayerPayload {
                email: request.payer_email,
            },
            external_reference: request.external_reference,
            back_urls: BackUrlsPayload {
                success: request.back_urls.success,
                failure: request.back_urls.failure,
                pending: request.back_urls.pending,
            },
            notification_url: request.notification_url,
            auto_return: "approved",
        }
    }
}

/// Response from `POST /checkout/preferences`.
#[derive(Debug, Deserialize)]
pub(super) struct PreferenceResponse {
    pub id: String,
    pub init_point: String,
}

/// Response from `GET /v1/payments/{id}`.
#[derive(Debug, Deserialize)]
pub(super) struct PaymentResponse {
    pub status: String,
    #[serde(default)]
    pub external_reference: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{BackUrls, PreferenceItem};

    fn request() -> PreferenceRequest {
        PreferenceRequest {
            items: vec![PreferenceItem {
                title: "Acceso a 10 Ideas de Negocio Exclusivas".to_string(),
                description: "Contenido digital con guías en PDF para emprender.".to_string(),
                quantity: 1,
                unit_price: 1300.0,
                currency_id: "ARS".to_string(),
            }],
            payer_email: "ana@example.com".to_string(),
            external_reference: "user-1".to_string(),
            back_urls: BackUrls {
                success: "https://front/index.html?status=approved".to_string(),
                failure: "https://front/index.html?status=failure".to_string(),
                pending: "https://front/index.html?status=pending".to_string(),
            },
            notification_url: "https://back/payment-webhook".to_string(),
        }
    }

    #[test]
    fn payload_matches_the_preferences_schema() {
        let payload = PreferencePayload::from(request());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["items"][0]["unit_price"], 1300.0);
        assert_eq!(json["items"][0]["currency_id"], "ARS");
        assert_eq!(json["payer"]["email"], "ana@example.com");
        assert_eq!(json["external_reference"], "user-1");
        assert_eq!(
            json["back_urls"]["success"],
            "https://front/index.html?status=approved"
        );
        assert_eq!(json["notification_url"], "https://back/payment-webhook");
        assert_eq!(json["auto_return"], "approved");
    }

    #[test]
    fn preference_response_keeps_id_and_init_point() {
        let response: PreferenceResponse = serde_json::from_str(
            r#"{"id":"123-abc","init_point":"https://www.mercadopago.com.ar/checkout/v1/redirect?pref_id=123-abc","collector_id":109}"#,
        )
        .unwrap();

        assert_eq!(response.id, "123-abc");
        assert!(response.init_point.contains("pref_id=123-abc"));
    }

    #[test]
    fn payment_response_tolerates_missing_reference() {
        let response: PaymentResponse =
            serde_json::from_str(r#"{"status":"approved","transaction_amount":1300}"#).unwrap();

        assert_eq!(response.status, "approved");
        assert!(response.external_reference.is_none());
    }
}
