//! API integration tests.
//!
//! These tests drive the full router, auth middleware included, against a
//! mock database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware,
};
use chrono::Utc;
use hostel_api::{AppState, auth_middleware, router as api_router};
use hostel_common::config::AuthConfig;
use hostel_core::{
    AnalyticsService, ComplaintService, TokenService, UserService,
    triage::{NoOpClassifier, Triage},
};
use hostel_db::{
    entities::{
        complaint::{self, Category, ComplaintStatus, Urgency},
        user::{self, Role},
    },
    repositories::{ComplaintRepository, UserRepository},
};
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::{Value, json};
use tower::ServiceExt;

fn token_service() -> TokenService {
    TokenService::new(&AuthConfig {
        jwt_secret: "integration-secret".to_string(),
        token_ttl_hours: 1,
    })
}

/// Create test app state with mock database.
fn create_test_state(db: MockDatabase) -> AppState {
    let db = Arc::new(db.into_connection());

    let user_repo = UserRepository::new(Arc::clone(&db));
    let complaint_repo = ComplaintRepository::new(Arc::clone(&db));
    let triage = Triage::new(Arc::new(NoOpClassifier), Duration::from_millis(100)).unwrap();

    AppState {
        user_service: UserService::new(user_repo.clone()),
        complaint_service: ComplaintService::new(complaint_repo.clone(), user_repo, triage),
        analytics_service: AnalyticsService::new(complaint_repo),
        token_service: token_service(),
    }
}

/// Create test router with the auth middleware in front.
fn create_test_router(db: MockDatabase) -> Router {
    let state = create_test_state(db);
    Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

fn test_user(id: &str, role: Role) -> user::Model {
    user::Model {
        id: id.to_string(),
        name: format!("User {id}"),
        email: format!("{id}@hostel.test"),
        password_hash: "$argon2id$placeholder".to_string(),
        role,
        block: Some("A".to_string()),
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn test_complaint(id: &str, status: ComplaintStatus) -> complaint::Model {
    complaint::Model {
        id: id.to_string(),
        title: "Flickering light".to_string(),
        description: "Room 7".to_string(),
        category: Category::Other,
        block: "A".to_string(),
        status,
        urgency: Urgency::Low,
        ai_tags: json!(["Text-Triaged"]),
        images: json!([]),
        student_id: "s1".to_string(),
        warden_id: None,
        comments: json!([]),
        assigned_at: None,
        resolved_at: None,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn bearer(user: &user::Model) -> String {
    format!("Bearer {}", token_service().issue(user).unwrap())
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_router(MockDatabase::new(DatabaseBackend::Postgres));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "ok");
}

#[tokio::test]
async fn test_complaints_require_auth() {
    let app = create_test_router(MockDatabase::new(DatabaseBackend::Postgres));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/complaints/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_garbage_token_stays_anonymous() {
    let app = create_test_router(MockDatabase::new(DatabaseBackend::Postgres));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users/me")
                .header("Authorization", "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_hides_password_hash() {
    let student = test_user("s1", Role::Student);
    let app = create_test_router(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[student.clone()]]),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users/me")
                .header("Authorization", bearer(&student))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["id"], "s1");
    assert_eq!(body["data"]["role"], "student");
    assert!(body["data"].get("passwordHash").is_none());
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_student_lists_own_complaints() {
    let student = test_user("s1", Role::Student);
    let app = create_test_router(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[student.clone()]])
            .append_query_results([Vec::<complaint::Model>::new()]),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/complaints/me")
                .header("Authorization", bearer(&student))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"], json!([]));
}

#[tokio::test]
async fn test_student_cannot_list_all_complaints() {
    let student = test_user("s1", Role::Student);
    let app = create_test_router(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[student.clone()]]),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/complaints")
                .header("Authorization", bearer(&student))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_complaint_without_title_is_bad_request() {
    let student = test_user("s1", Role::Student);
    let app = create_test_router(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[student.clone()]]),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/complaints")
                .method("POST")
                .header("Authorization", bearer(&student))
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"description":"","category":"other"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_update_resolved_complaint_is_conflict() {
    let warden = test_user("w1", Role::Warden);
    let app = create_test_router(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[warden.clone()]])
            .append_query_results([[test_complaint("c1", ComplaintStatus::Resolved)]]),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/complaints/c1")
                .method("PUT")
                .header("Authorization", bearer(&warden))
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"status":"In Progress"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error"]["code"],
        "INVALID_TRANSITION"
    );
}

#[tokio::test]
async fn test_assign_without_warden_id_is_bad_request() {
    let admin = test_user("a1", Role::Admin);
    let app = create_test_router(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[admin.clone()]]),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/complaints/c1/assign")
                .method("PUT")
                .header("Authorization", bearer(&admin))
                .header("Content-Type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("wardenId")
    );
}

#[tokio::test]
async fn test_register_with_malformed_json_is_bad_request() {
    let app = create_test_router(MockDatabase::new(DatabaseBackend::Postgres));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/register")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"name":"Asha","email":"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_get_missing_complaint_is_not_found() {
    let admin = test_user("a1", Role::Admin);
    let app = create_test_router(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[admin.clone()]])
            .append_query_results([Vec::<complaint::Model>::new()]),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/complaints/nope")
                .header("Authorization", bearer(&admin))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_warden_cannot_reach_admin_routes() {
    let warden = test_user("w1", Role::Warden);
    let app = create_test_router(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[warden.clone()]]),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/admin/hotspots")
                .header("Authorization", bearer(&warden))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let admin = test_user("a1", Role::Admin);
    let app = create_test_router(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[admin.clone()]]),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/admin/users/a1")
                .method("DELETE")
                .header("Authorization", bearer(&admin))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_login_unknown_email_is_unauthorized() {
    let app = create_test_router(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()]),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/login")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"email":"nobody@hostel.test","password":"whatever1"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_users_rejects_unknown_role() {
    let admin = test_user("a1", Role::Admin);
    let app = create_test_router(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[admin.clone()]]),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/admin/users?role=janitor")
                .header("Authorization", bearer(&admin))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
