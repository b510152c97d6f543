//! HTTP API layer for the RentMate moderation service.
//!
//! - **Endpoints**: report lifecycle REST API under `/reports`
//! - **Extractors**: bearer-token authentication
//! - **Middleware**: auth resolution into request extensions
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
