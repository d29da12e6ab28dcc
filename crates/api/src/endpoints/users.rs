//! Profile endpoints.

use axum::{Router, extract::State, routing::get};
use hostel_common::AppResult;
use hostel_core::UpdateProfileInput;
use hostel_db::entities::user::{self, Role};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::{
    extractors::{AppJson, AuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// User as returned by the API. Never includes the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub block: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            block: user.block,
            created_at: user.created_at,
        }
    }
}

async fn me(AuthUser(user): AuthUser) -> AppResult<ApiResponse<UserResponse>> {
    Ok(ApiResponse::ok(user.into()))
}

async fn update_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppJson(req): AppJson<UpdateProfileInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.update_profile(user, req).await?;
    Ok(ApiResponse::ok(user.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(me).put(update_me))
}
