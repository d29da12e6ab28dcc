//! API endpoints.

mod admin;
mod auth;
mod complaints;
mod health;
mod users;

pub use users::UserResponse;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/complaints", complaints::router())
        .nest("/admin", admin::router())
        .nest("/health", health::router())
}
