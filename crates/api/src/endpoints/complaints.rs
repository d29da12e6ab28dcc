//! Complaint endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, put},
};
use hostel_common::AppResult;
use hostel_core::{
    AssignInput, CommentInput, ComplaintView, CreateComplaintInput, UpdateComplaintInput,
};
use hostel_db::entities::user::Role;

use crate::{
    extractors::{AdminUser, AppJson, AuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// File a complaint.
async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateComplaintInput>,
) -> AppResult<ApiResponse<ComplaintView>> {
    let student = auth.require(&[Role::Student])?;
    let complaint = state.complaint_service.create(student, req).await?;
    Ok(ApiResponse::created(complaint))
}

/// Complaints filed by the caller.
async fn mine(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ComplaintView>>> {
    let student = auth.require(&[Role::Student])?;
    let complaints = state.complaint_service.list_for_student(student).await?;
    Ok(ApiResponse::ok(complaints))
}

/// Complaints assigned to the calling warden.
async fn assigned(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ComplaintView>>> {
    let warden = auth.require(&[Role::Warden])?;
    let complaints = state.complaint_service.list_assigned(warden).await?;
    Ok(ApiResponse::ok(complaints))
}

/// All complaints. Admins receive the priority-ranked feed.
async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ComplaintView>>> {
    let viewer = auth.require(&[Role::Warden, Role::Admin])?;
    let complaints = state.complaint_service.list_all(viewer).await?;
    Ok(ApiResponse::ok(complaints))
}

async fn show(
    AuthUser(viewer): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ComplaintView>> {
    let complaint = state.complaint_service.get(&viewer, &id).await?;
    Ok(ApiResponse::ok(complaint))
}

/// Change status and/or add a comment.
async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateComplaintInput>,
) -> AppResult<ApiResponse<ComplaintView>> {
    let actor = auth.require(&[Role::Warden, Role::Admin])?;
    let complaint = state.complaint_service.update(actor, &id, req).await?;
    Ok(ApiResponse::ok(complaint))
}

async fn comment(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<CommentInput>,
) -> AppResult<ApiResponse<ComplaintView>> {
    let complaint = state.complaint_service.comment(&actor, &id, req).await?;
    Ok(ApiResponse::ok(complaint))
}

async fn assign(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<AssignInput>,
) -> AppResult<ApiResponse<ComplaintView>> {
    let complaint = state.complaint_service.assign(&admin, &id, req).await?;
    Ok(ApiResponse::ok(complaint))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/me", get(mine))
        .route("/assigned", get(assigned))
        .route("/{id}", get(show).put(update))
        .route("/{id}/comment", put(comment))
        .route("/{id}/assign", put(assign))
}
