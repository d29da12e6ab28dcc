//! Complaint entity.

use chrono::{DateTime, Utc};
use hostel_common::{AppError, AppResult};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Where a complaint is in its lifecycle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[derive(Default)]
pub enum ComplaintStatus {
    #[sea_orm(string_value = "Open")]
    #[default]
    Open,
    #[sea_orm(string_value = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,
    #[sea_orm(string_value = "Resolved")]
    Resolved,
    #[sea_orm(string_value = "Critical")]
    Critical,
}

impl ComplaintStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Critical => "Critical",
        }
    }

    /// Parse a wire status value.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value.trim() {
            "Open" => Ok(Self::Open),
            "In Progress" => Ok(Self::InProgress),
            "Resolved" => Ok(Self::Resolved),
            "Critical" => Ok(Self::Critical),
            other => Err(AppError::Validation(format!("Unknown status: {other}"))),
        }
    }

    /// Resolved complaints accept no further mutation.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved)
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estimated urgency of a complaint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[derive(Default)]
pub enum Urgency {
    #[sea_orm(string_value = "Low")]
    #[default]
    Low,
    #[sea_orm(string_value = "Medium")]
    Medium,
    #[sea_orm(string_value = "High")]
    High,
}

impl Urgency {
    /// Wire name of the urgency.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// Kind of problem being reported.
///
/// `electricity` and `wifi` were used by earlier releases; they deserialize to
/// [`Category::Electrical`] and [`Category::Internet`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[sea_orm(string_value = "plumbing")]
    Plumbing,
    #[sea_orm(string_value = "electrical")]
    #[serde(alias = "electricity")]
    Electrical,
    #[sea_orm(string_value = "cleanliness")]
    Cleanliness,
    #[sea_orm(string_value = "internet")]
    #[serde(alias = "wifi")]
    Internet,
    #[sea_orm(string_value = "security")]
    Security,
    #[sea_orm(string_value = "other")]
    Other,
}

impl Category {
    /// Wire name of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plumbing => "plumbing",
            Self::Electrical => "electrical",
            Self::Cleanliness => "cleanliness",
            Self::Internet => "internet",
            Self::Security => "security",
            Self::Other => "other",
        }
    }

    /// Parse a category, accepting the historical aliases.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "plumbing" => Ok(Self::Plumbing),
            "electrical" | "electricity" => Ok(Self::Electrical),
            "cleanliness" => Ok(Self::Cleanliness),
            "internet" | "wifi" => Ok(Self::Internet),
            "security" => Ok(Self::Security),
            "other" => Ok(Self::Other),
            other => Err(AppError::Validation(format!("Unknown category: {other}"))),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A note left on a complaint. Stored inline in the `comments` column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub text: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "complaint")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub category: Category,

    /// Upper-cased block name
    #[sea_orm(indexed)]
    pub block: String,

    pub status: ComplaintStatus,

    pub urgency: Urgency,

    /// Triage labels (JSON array of strings)
    #[sea_orm(column_type = "JsonBinary")]
    pub ai_tags: Json,

    /// Image URLs (JSON array of strings)
    #[sea_orm(column_type = "JsonBinary")]
    pub images: Json,

    /// Creator
    #[sea_orm(indexed)]
    pub student_id: String,

    /// Assigned warden
    #[sea_orm(nullable, indexed)]
    pub warden_id: Option<String>,

    /// Append-only comment log (JSON array of [`Comment`])
    #[sea_orm(column_type = "JsonBinary")]
    pub comments: Json,

    #[sea_orm(nullable)]
    pub assigned_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub resolved_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Decoded comment log, oldest first.
    pub fn comment_list(&self) -> AppResult<Vec<Comment>> {
        decode_column(&self.comments, "comments", &self.id)
    }

    /// Decoded triage labels.
    pub fn tag_list(&self) -> AppResult<Vec<String>> {
        decode_column(&self.ai_tags, "ai_tags", &self.id)
    }

    /// Decoded image URLs.
    pub fn image_list(&self) -> AppResult<Vec<String>> {
        decode_column(&self.images, "images", &self.id)
    }
}

fn decode_column<T: serde::de::DeserializeOwned>(
    value: &Json,
    column: &str,
    id: &str,
) -> AppResult<Vec<T>> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value.clone())
        .map_err(|e| AppError::Internal(format!("Corrupt {column} on complaint {id}: {e}")))
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Student,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::WardenId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Warden,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
