//! Application layer - use-case services wired from ports.

pub mod credentials;
pub mod entitlement;

pub use credentials::CredentialService;
pub use entitlement::{
    DisregardReason, EntitlementConfig, EntitlementCoordinator, NotificationOutcome,
    ProviderNotification,
};
