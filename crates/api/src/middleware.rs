//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use rentmate_core::{ReportService, UserService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub report_service: ReportService,
    pub user_service: UserService,
}

/// Authentication middleware.
///
/// Resolves a bearer token into a user model stored in request extensions;
/// handlers that require authentication pull it out with the `AuthUser`
/// extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        if let Ok(user) = state.user_service.authenticate_by_token(token).await {
            req.extensions_mut().insert(user);
        }
    }

    next.run(req).await
}
