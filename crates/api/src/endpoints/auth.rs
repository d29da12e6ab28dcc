//! Authentication endpoints.

use axum::{Router, extract::State, routing::post};
use hostel_common::AppResult;
use hostel_core::{LoginInput, RegisterInput};
use serde::Serialize;

use super::users::UserResponse;
use crate::{extractors::AppJson, middleware::AppState, response::ApiResponse};

/// Response for register and login.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Register a student account.
async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterInput>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let user = state.user_service.register(req).await?;
    let token = state.token_service.issue(&user)?;

    Ok(ApiResponse::created(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// Exchange credentials for a token.
async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginInput>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let user = state.user_service.authenticate(req).await?;
    let token = state.token_service.issue(&user)?;
    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(ApiResponse::ok(AuthResponse {
        user: user.into(),
        token,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
