//! Ports - trait contracts between the application core and its adapters.

mod account_store;
mod payment_gateway;

pub use account_store::AccountStore;
pub use payment_gateway::{
    BackUrls, CheckoutPreference, GatewayError, PaymentGateway, PaymentRecord, PaymentStatus,
    PreferenceItem, PreferenceRequest,
};
