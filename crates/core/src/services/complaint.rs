//! Complaint service.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use hostel_common::{AppError, AppResult, IdGenerator};
use hostel_db::{
    entities::{
        complaint::{self, Category, ComplaintStatus, Urgency},
        user::{self, Role},
    },
    repositories::{ComplaintRepository, UserRepository},
};
use sea_orm::{Set, prelude::DateTimeWithTimeZone};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{assignment, lifecycle, priority, services::user::normalize_block, triage::Triage};

/// Maximum number of images per complaint.
pub const MAX_IMAGES: usize = 5;

/// Block recorded when neither the request nor the student names one.
pub const UNSPECIFIED_BLOCK: &str = "UNSPECIFIED";

/// Input for filing a complaint.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateComplaintInput {
    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    pub category: Option<String>,

    /// Single image URL.
    pub image: Option<String>,

    #[serde(default)]
    pub images: Vec<String>,

    #[validate(length(max = 32))]
    pub block: Option<String>,
}

/// Input for a warden or admin update.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateComplaintInput {
    pub status: Option<String>,

    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

/// Input for appending a comment.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CommentInput {
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

/// Input for assigning a warden.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignInput {
    pub warden_id: String,
}

/// Public view of a user embedded in complaint responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&user::Model> for UserSummary {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// A comment with its author resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub text: String,
    pub user: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
}

/// A complaint with its student, warden and comment authors resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub block: String,
    pub status: ComplaintStatus,
    pub urgency: Urgency,
    pub ai_tags: Vec<String>,
    pub images: Vec<String>,
    pub student: Option<UserSummary>,
    pub warden: Option<UserSummary>,
    pub comments: Vec<CommentView>,
    pub assigned_at: Option<DateTimeWithTimeZone>,
    pub resolved_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
    /// Only present in the admin feed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_score: Option<f64>,
}

/// Complaint service for business logic.
#[derive(Clone)]
pub struct ComplaintService {
    complaint_repo: ComplaintRepository,
    user_repo: UserRepository,
    triage: Triage,
    id_gen: IdGenerator,
}

fn required(value: Option<String>, field: &str) -> AppResult<String> {
    value.ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

fn collect_images(image: Option<String>, images: Vec<String>) -> AppResult<Vec<String>> {
    let mut urls: Vec<String> = Vec::new();
    for url in image.into_iter().chain(images) {
        let url = url.trim();
        if !url.is_empty() && !urls.iter().any(|u| u == url) {
            urls.push(url.to_string());
        }
    }
    if urls.len() > MAX_IMAGES {
        return Err(AppError::Validation(format!(
            "at most {MAX_IMAGES} images are allowed"
        )));
    }
    Ok(urls)
}

/// Active model carrying every column the lifecycle may touch.
fn changes(original: complaint::Model, working: complaint::Model) -> complaint::ActiveModel {
    let mut active: complaint::ActiveModel = original.into();
    active.status = Set(working.status);
    active.comments = Set(working.comments);
    active.warden_id = Set(working.warden_id);
    active.assigned_at = Set(working.assigned_at);
    active.resolved_at = Set(working.resolved_at);
    active.updated_at = Set(working.updated_at);
    active
}

impl ComplaintService {
    /// Create a new complaint service.
    #[must_use]
    pub const fn new(
        complaint_repo: ComplaintRepository,
        user_repo: UserRepository,
        triage: Triage,
    ) -> Self {
        Self {
            complaint_repo,
            user_repo,
            triage,
            id_gen: IdGenerator::new(),
        }
    }

    /// File a complaint on behalf of `student`.
    pub async fn create(
        &self,
        student: &user::Model,
        input: CreateComplaintInput,
    ) -> AppResult<ComplaintView> {
        input.validate()?;

        let title = required(input.title, "title")?.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("title must not be blank".to_string()));
        }
        let description = required(input.description, "description")?
            .trim()
            .to_string();
        let category = Category::parse(&required(input.category, "category")?)?;
        let images = collect_images(input.image, input.images)?;
        let block = input
            .block
            .as_deref()
            .and_then(normalize_block)
            .or_else(|| student.block.as_deref().and_then(normalize_block))
            .unwrap_or_else(|| UNSPECIFIED_BLOCK.to_string());

        let assessment = self
            .triage
            .assess(&title, &description, category, images.first().map(String::as_str))
            .await;

        let model = complaint::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(title),
            description: Set(description),
            category: Set(category),
            block: Set(block),
            status: Set(assessment.status),
            urgency: Set(assessment.urgency),
            ai_tags: Set(json!(assessment.tags)),
            images: Set(json!(images)),
            student_id: Set(student.id.clone()),
            warden_id: Set(None),
            comments: Set(json!([])),
            assigned_at: Set(None),
            resolved_at: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let complaint = self.complaint_repo.create(model).await?;
        info!(
            complaint_id = %complaint.id,
            student_id = %student.id,
            category = %complaint.category,
            status = %complaint.status,
            "Complaint filed"
        );

        self.view(complaint, None).await
    }

    /// Get one complaint. Students may only see their own.
    pub async fn get(&self, viewer: &user::Model, id: &str) -> AppResult<ComplaintView> {
        let complaint = self.complaint_repo.get_by_id(id).await?;
        if viewer.role == Role::Student && complaint.student_id != viewer.id {
            return Err(AppError::Forbidden(
                "Students can only view their own complaints".to_string(),
            ));
        }
        self.view(complaint, None).await
    }

    /// Complaints filed by `student`, newest first.
    pub async fn list_for_student(&self, student: &user::Model) -> AppResult<Vec<ComplaintView>> {
        let complaints = self.complaint_repo.find_by_student(&student.id).await?;
        self.views(complaints.into_iter().map(|c| (c, None)).collect())
            .await
    }

    /// Complaints assigned to `warden`, newest first.
    pub async fn list_assigned(&self, warden: &user::Model) -> AppResult<Vec<ComplaintView>> {
        let complaints = self.complaint_repo.find_by_warden(&warden.id).await?;
        self.views(complaints.into_iter().map(|c| (c, None)).collect())
            .await
    }

    /// Every complaint. Admins get the priority-ranked feed with scores.
    pub async fn list_all(&self, viewer: &user::Model) -> AppResult<Vec<ComplaintView>> {
        let complaints = self.complaint_repo.find_all().await?;

        if viewer.role == Role::Admin {
            let ranked = priority::rank(complaints, Utc::now());
            return self
                .views(ranked.into_iter().map(|(c, s)| (c, Some(s))).collect())
                .await;
        }

        self.views(complaints.into_iter().map(|c| (c, None)).collect())
            .await
    }

    /// Apply a comment and/or status change as one write.
    ///
    /// The comment is applied first. Nothing is stored if either step fails.
    pub async fn update(
        &self,
        actor: &user::Model,
        id: &str,
        input: UpdateComplaintInput,
    ) -> AppResult<ComplaintView> {
        input.validate()?;

        let status = input
            .status
            .as_deref()
            .map(ComplaintStatus::parse)
            .transpose()?;
        if status.is_none() && input.comment.is_none() {
            return Err(AppError::Validation(
                "status or comment is required".to_string(),
            ));
        }

        let original = self.complaint_repo.get_by_id(id).await?;
        let mut working = original.clone();
        let now = Utc::now();

        if let Some(text) = input.comment.as_deref() {
            lifecycle::append_comment(&mut working, text, &actor.id, now)?;
        }
        if let Some(status) = status {
            lifecycle::apply_status_change(&mut working, status, now)?;
        }

        let previous = original.status;
        let complaint = self
            .complaint_repo
            .update(changes(original, working))
            .await?;
        info!(
            complaint_id = %complaint.id,
            actor_id = %actor.id,
            from = %previous,
            to = %complaint.status,
            "Complaint updated"
        );

        self.view(complaint, None).await
    }

    /// Append a comment. Students may only comment on their own complaints.
    pub async fn comment(
        &self,
        actor: &user::Model,
        id: &str,
        input: CommentInput,
    ) -> AppResult<ComplaintView> {
        input.validate()?;
        let text = required(input.comment, "comment")?;

        let original = self.complaint_repo.get_by_id(id).await?;
        if actor.role == Role::Student && original.student_id != actor.id {
            return Err(AppError::Forbidden(
                "Students can only comment on their own complaints".to_string(),
            ));
        }

        let mut working = original.clone();
        lifecycle::append_comment(&mut working, &text, &actor.id, Utc::now())?;

        let complaint = self
            .complaint_repo
            .update(changes(original, working))
            .await?;
        info!(complaint_id = %complaint.id, actor_id = %actor.id, "Comment added");

        self.view(complaint, None).await
    }

    /// Assign a warden.
    pub async fn assign(
        &self,
        actor: &user::Model,
        id: &str,
        input: AssignInput,
    ) -> AppResult<ComplaintView> {
        let original = self.complaint_repo.get_by_id(id).await?;
        let warden = self
            .user_repo
            .find_by_id(&input.warden_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Warden {}", input.warden_id)))?;

        let mut working = original.clone();
        assignment::assign(&mut working, &warden, Utc::now())?;

        let complaint = self
            .complaint_repo
            .update(changes(original, working))
            .await?;
        info!(
            complaint_id = %complaint.id,
            warden_id = %warden.id,
            assigned_by = %actor.id,
            status = %complaint.status,
            "Complaint assigned"
        );

        self.view(complaint, None).await
    }

    async fn view(
        &self,
        complaint: complaint::Model,
        priority_score: Option<f64>,
    ) -> AppResult<ComplaintView> {
        let mut views = self.views(vec![(complaint, priority_score)]).await?;
        views
            .pop()
            .ok_or_else(|| AppError::Internal("complaint view missing".to_string()))
    }

    async fn views(
        &self,
        complaints: Vec<(complaint::Model, Option<f64>)>,
    ) -> AppResult<Vec<ComplaintView>> {
        let mut decoded = Vec::with_capacity(complaints.len());
        let mut user_ids: Vec<String> = Vec::new();

        for (complaint, score) in complaints {
            let comments = complaint.comment_list()?;
            user_ids.push(complaint.student_id.clone());
            if let Some(warden_id) = &complaint.warden_id {
                user_ids.push(warden_id.clone());
            }
            user_ids.extend(comments.iter().map(|c| c.user_id.clone()));
            decoded.push((complaint, comments, score));
        }

        user_ids.sort_unstable();
        user_ids.dedup();

        let users: HashMap<String, UserSummary> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .iter()
            .map(|u| (u.id.clone(), UserSummary::from(u)))
            .collect();

        decoded
            .into_iter()
            .map(|(complaint, comments, priority_score)| {
                Ok(ComplaintView {
                    ai_tags: complaint.tag_list()?,
                    images: complaint.image_list()?,
                    student: users.get(&complaint.student_id).cloned(),
                    warden: complaint
                        .warden_id
                        .as_ref()
                        .and_then(|id| users.get(id).cloned()),
                    comments: comments
                        .into_iter()
                        .map(|c| CommentView {
                            user: users.get(&c.user_id).cloned(),
                            text: c.text,
                            created_at: c.created_at,
                        })
                        .collect(),
                    id: complaint.id,
                    title: complaint.title,
                    description: complaint.description,
                    category: complaint.category,
                    block: complaint.block,
                    status: complaint.status,
                    urgency: complaint.urgency,
                    assigned_at: complaint.assigned_at,
                    resolved_at: complaint.resolved_at,
                    created_at: complaint.created_at,
                    updated_at: complaint.updated_at,
                    priority_score,
                })
            })
            .collect()
    }
}
