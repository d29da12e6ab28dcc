//! Complaint state machine.
//!
//! `Open -> In Progress -> Resolved`, with `Critical` entered at creation when
//! a hazard is detected. `Resolved` is terminal: once reached, the complaint
//! rejects status changes, comments and reassignment.

use chrono::{DateTime, Utc};
use hostel_common::{AppError, AppResult};
use hostel_db::entities::complaint::{self, Comment, ComplaintStatus, Urgency};

/// Fail with `InvalidTransition` when the complaint is closed.
pub fn ensure_mutable(complaint: &complaint::Model) -> AppResult<()> {
    if complaint.status.is_terminal() {
        return Err(AppError::InvalidTransition(format!(
            "complaint {} is resolved",
            complaint.id
        )));
    }
    Ok(())
}

/// Move a complaint to `new_status`.
///
/// Entering `Resolved` stamps `resolved_at`. Re-applying the current status
/// is accepted and changes nothing but the last-modified stamp.
pub fn apply_status_change(
    complaint: &mut complaint::Model,
    new_status: ComplaintStatus,
    now: DateTime<Utc>,
) -> AppResult<()> {
    ensure_mutable(complaint)?;

    complaint.status = new_status;
    if new_status == ComplaintStatus::Resolved {
        complaint.resolved_at = Some(now.into());
    }
    complaint.updated_at = Some(now.into());
    Ok(())
}

/// Append a trimmed comment authored by `author_id`.
pub fn append_comment(
    complaint: &mut complaint::Model,
    text: &str,
    author_id: &str,
    now: DateTime<Utc>,
) -> AppResult<()> {
    ensure_mutable(complaint)?;

    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("comment must not be empty".to_string()));
    }

    let mut comments = complaint.comment_list()?;
    comments.push(Comment {
        text: text.to_string(),
        user_id: author_id.to_string(),
        created_at: now,
    });
    complaint.comments = serde_json::to_value(comments)
        .map_err(|e| AppError::Internal(format!("Failed to encode comments: {e}")))?;
    complaint.updated_at = Some(now.into());
    Ok(())
}

/// Initial status and urgency of a new complaint.
///
/// Any hazard signal makes the complaint `Critical`/`High`; otherwise it starts
/// `Open`/`Low`. A `Medium` classifier verdict does not escalate.
#[must_use]
pub fn initial_state(
    text_is_hazard: bool,
    category_is_hazard: bool,
    classifier_urgency: Urgency,
) -> (ComplaintStatus, Urgency) {
    if text_is_hazard || category_is_hazard || classifier_urgency == Urgency::High {
        (ComplaintStatus::Critical, Urgency::High)
    } else {
        (ComplaintStatus::Open, Urgency::Low)
    }
}
