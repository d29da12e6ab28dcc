//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test -p hostel-db --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `hostel_test`)
//!   `TEST_DB_PASSWORD` (default: `hostel_test`)
//!   `TEST_DB_NAME` (default: `hostel_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Utc;
use hostel_common::AppError;
use hostel_db::{
    entities::{
        complaint::{self, Category, Comment, ComplaintStatus, Urgency},
        user::{self, Role},
    },
    repositories::{ComplaintRepository, UserRepository},
    test_utils::{TestDatabase, TestDbConfig},
};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;

fn student(id: &str) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(id.to_string()),
        name: Set("Asha".to_string()),
        email: Set(format!("{id}@hostel.test")),
        password_hash: Set("$argon2id$placeholder".to_string()),
        role: Set(Role::Student),
        block: Set(Some("A".to_string())),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
}

fn complaint(id: &str, student_id: &str) -> complaint::ActiveModel {
    complaint::ActiveModel {
        id: Set(id.to_string()),
        title: Set("Water leak".to_string()),
        description: Set("Ceiling drips onto the bed".to_string()),
        category: Set(Category::Plumbing),
        block: Set("A".to_string()),
        status: Set(ComplaintStatus::Open),
        urgency: Set(Urgency::Low),
        ai_tags: Set(json!(["Text-Triaged"])),
        images: Set(json!([])),
        student_id: Set(student_id.to_string()),
        warden_id: Set(None),
        comments: Set(json!([])),
        assigned_at: Set(None),
        resolved_at: Set(None),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_complaint_round_trip() {
    let db = TestDatabase::create_unique().await.unwrap();
    assert!(db.is_unique());

    let conn = db.shared();
    let users = UserRepository::new(Arc::clone(&conn));
    let complaints = ComplaintRepository::new(Arc::clone(&conn));

    users.create(student("s1")).await.unwrap();
    let created = complaints.create(complaint("c1", "s1")).await.unwrap();
    assert_eq!(created.status, ComplaintStatus::Open);

    let mut active: complaint::ActiveModel = created.into();
    active.comments = Set(json!([Comment {
        text: "Plumber booked".to_string(),
        user_id: "s1".to_string(),
        created_at: Utc::now(),
    }]));
    active.status = Set(ComplaintStatus::InProgress);
    let updated = complaints.update(active).await.unwrap();

    let reloaded = complaints.get_by_id("c1").await.unwrap();
    assert_eq!(reloaded.status, ComplaintStatus::InProgress);
    assert_eq!(reloaded.comment_list().unwrap().len(), 1);
    assert_eq!(updated.id, reloaded.id);

    let by_category = complaints.count_by_category().await.unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].count, 1);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_deleting_student_removes_complaints() {
    let db = TestDatabase::migrated().await.unwrap();
    db.cleanup().await.unwrap();

    let conn = db.shared();
    let users = UserRepository::new(Arc::clone(&conn));
    let complaints = ComplaintRepository::new(Arc::clone(&conn));

    users.create(student("s2")).await.unwrap();
    complaints.create(complaint("c2", "s2")).await.unwrap();

    users.delete("s2").await.unwrap();

    let result = complaints.get_by_id("c2").await;
    assert!(matches!(result, Err(AppError::ComplaintNotFound(_))));

    db.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_email_rejected() {
    let db = TestDatabase::migrated().await.unwrap();
    db.cleanup().await.unwrap();

    let conn = db.connection();
    student("dup").insert(conn).await.unwrap();

    let mut again = student("dup2");
    again.email = Set("dup@hostel.test".to_string());
    assert!(again.insert(conn).await.is_err());

    db.cleanup().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_postgres_url_format() {
    let config = TestDbConfig::default();
    let url = config.postgres_url();
    assert!(url.ends_with("/postgres"));
}
