//! HTTP adapter - axum handlers, routes, and DTOs.

mod dto;
mod handlers;
mod routes;

pub use dto::*;
pub use handlers::{ApiError, AppState};
pub use routes::api_routes;
