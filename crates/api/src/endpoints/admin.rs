//! Admin endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use hostel_common::AppResult;
use hostel_core::{ComplaintAnalytics, CreateWardenInput, Hotspot};
use hostel_db::entities::user::Role;
use serde::Deserialize;

use super::users::UserResponse;
use crate::{
    extractors::{AdminUser, AppJson},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

async fn analytics(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ComplaintAnalytics>> {
    let stats = state.analytics_service.analytics().await?;
    Ok(ApiResponse::ok(stats))
}

async fn hotspots(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<Hotspot>>> {
    let grid = state.analytics_service.hotspots().await?;
    Ok(ApiResponse::ok(grid))
}

async fn list_users(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let role = query.role.as_deref().map(Role::parse).transpose()?;
    let users = state.user_service.list(role).await?;
    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

async fn list_students(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state.user_service.list(Some(Role::Student)).await?;
    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

async fn list_wardens(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state.user_service.list(Some(Role::Warden)).await?;
    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

async fn create_warden(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateWardenInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let warden = state.user_service.create_warden(req).await?;
    Ok(ApiResponse::created(warden.into()))
}

async fn update_role(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateRoleRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let role = Role::parse(&req.role)?;
    let user = state.user_service.update_role(&id, role).await?;
    Ok(ApiResponse::ok(user.into()))
}

async fn delete_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.user_service.delete(&admin, &id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analytics/complaints", get(analytics))
        .route("/hotspots", get(hotspots))
        .route("/users", get(list_users))
        .route("/students", get(list_students))
        .route("/wardens", get(list_wardens))
        .route("/warden/new", post(create_warden))
        .route("/users/{id}/role", put(update_role))
        .route("/users/{id}", delete(delete_user))
}
