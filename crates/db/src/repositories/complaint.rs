//! Complaint repository.

use std::sync::Arc;

use crate::entities::{
    Complaint,
    complaint::{self, Category, ComplaintStatus},
};
use hostel_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Number of complaints per category.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct CategoryCount {
    pub category: Category,
    pub count: i64,
}

/// Number of complaints per block.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct BlockCount {
    pub block: String,
    pub count: i64,
}

/// Number of complaints per status.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct StatusCount {
    pub status: ComplaintStatus,
    pub count: i64,
}

/// Number of complaints per (block, category) cell.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct HotspotCount {
    pub block: String,
    pub category: Category,
    pub count: i64,
}

/// Open and close timestamps of a resolved complaint.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct ResolutionSpan {
    pub created_at: sea_orm::prelude::DateTimeWithTimeZone,
    pub resolved_at: Option<sea_orm::prelude::DateTimeWithTimeZone>,
}

/// Complaint repository for database operations.
#[derive(Clone)]
pub struct ComplaintRepository {
    db: Arc<DatabaseConnection>,
}

impl ComplaintRepository {
    /// Create a new complaint repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a complaint by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<complaint::Model>> {
        Complaint::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a complaint by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<complaint::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ComplaintNotFound(id.to_string()))
    }

    /// Insert a new complaint.
    pub async fn create(&self, model: complaint::ActiveModel) -> AppResult<complaint::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Persist changed columns of a complaint.
    pub async fn update(&self, model: complaint::ActiveModel) -> AppResult<complaint::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Complaints filed by a student, newest first.
    pub async fn find_by_student(&self, student_id: &str) -> AppResult<Vec<complaint::Model>> {
        Complaint::find()
            .filter(complaint::Column::StudentId.eq(student_id))
            .order_by_desc(complaint::Column::CreatedAt)
            .order_by_desc(complaint::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Complaints assigned to a warden, newest first.
    pub async fn find_by_warden(&self, warden_id: &str) -> AppResult<Vec<complaint::Model>> {
        Complaint::find()
            .filter(complaint::Column::WardenId.eq(warden_id))
            .order_by_desc(complaint::Column::CreatedAt)
            .order_by_desc(complaint::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every complaint, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<complaint::Model>> {
        Complaint::find()
            .order_by_desc(complaint::Column::CreatedAt)
            .order_by_desc(complaint::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Complaint counts grouped by category.
    pub async fn count_by_category(&self) -> AppResult<Vec<CategoryCount>> {
        Complaint::find()
            .select_only()
            .column(complaint::Column::Category)
            .column_as(complaint::Column::Id.count(), "count")
            .group_by(complaint::Column::Category)
            .into_model::<CategoryCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Complaint counts grouped by block.
    pub async fn count_by_block(&self) -> AppResult<Vec<BlockCount>> {
        Complaint::find()
            .select_only()
            .column(complaint::Column::Block)
            .column_as(complaint::Column::Id.count(), "count")
            .group_by(complaint::Column::Block)
            .into_model::<BlockCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Complaint counts grouped by status.
    pub async fn count_by_status(&self) -> AppResult<Vec<StatusCount>> {
        Complaint::find()
            .select_only()
            .column(complaint::Column::Status)
            .column_as(complaint::Column::Id.count(), "count")
            .group_by(complaint::Column::Status)
            .into_model::<StatusCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Complaint counts grouped by block and category.
    pub async fn count_by_block_and_category(&self) -> AppResult<Vec<HotspotCount>> {
        Complaint::find()
            .select_only()
            .column(complaint::Column::Block)
            .column(complaint::Column::Category)
            .column_as(complaint::Column::Id.count(), "count")
            .group_by(complaint::Column::Block)
            .group_by(complaint::Column::Category)
            .order_by_asc(complaint::Column::Block)
            .order_by_asc(complaint::Column::Category)
            .into_model::<HotspotCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Timestamps of every resolved complaint.
    pub async fn find_resolution_spans(&self) -> AppResult<Vec<ResolutionSpan>> {
        Complaint::find()
            .select_only()
            .column(complaint::Column::CreatedAt)
            .column(complaint::Column::ResolvedAt)
            .filter(complaint::Column::Status.eq(ComplaintStatus::Resolved))
            .filter(complaint::Column::ResolvedAt.is_not_null())
            .into_model::<ResolutionSpan>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
