//! Mercado Pago adapter for the PaymentGateway port.

mod gateway;
mod mock;
mod types;

pub use gateway::{MercadoPagoConfig, MercadoPagoGateway};
pub use mock::MockPaymentGateway;
