//! HTTP API layer for the hostel complaint desk.
//!
//! - **Endpoints**: auth, profile, complaints and admin routers
//! - **Extractors**: authenticated user and admin guards
//! - **Middleware**: bearer-token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
