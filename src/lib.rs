//! Idea Vault - Paid-access backend
//!
//! Registration/login service gated by a Mercado Pago checkout. A single
//! fixed-price digital product; a user's entitlement is a monotonic paid
//! flag reconciled from webhook, client-confirm, and operator signals.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
