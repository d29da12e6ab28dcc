//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use hostel_core::{AnalyticsService, ComplaintService, TokenService, UserService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub complaint_service: ComplaintService,
    pub analytics_service: AnalyticsService,
    pub token_service: TokenService,
}

/// Authentication middleware.
///
/// A valid `Authorization: Bearer <jwt>` attaches the freshly loaded user to
/// the request. Anything else leaves the request anonymous.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(claims) = state.token_service.verify(token.trim())
    {
        match state.user_service.get(&claims.sub).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => {
                tracing::debug!(user_id = %claims.sub, error = %e, "Token subject not loadable");
            }
        }
    }

    next.run(req).await
}
