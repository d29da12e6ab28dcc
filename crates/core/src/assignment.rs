//! Binding complaints to wardens.

use chrono::{DateTime, Utc};
use hostel_common::{AppError, AppResult};
use hostel_db::entities::{
    complaint::{self, ComplaintStatus},
    user::{self, Role},
};
use tracing::warn;

use crate::lifecycle::ensure_mutable;

/// Assign `warden` to `complaint`.
///
/// An `Open` complaint moves to `In Progress`; any other status is kept.
/// Reassignment overwrites the warden and re-stamps `assigned_at`. The
/// warden's block is not required to match the complaint's.
pub fn assign(
    complaint: &mut complaint::Model,
    warden: &user::Model,
    now: DateTime<Utc>,
) -> AppResult<()> {
    if warden.role != Role::Warden {
        return Err(AppError::NotFound(format!("Warden {}", warden.id)));
    }
    ensure_mutable(complaint)?;

    if let Some(block) = warden.block.as_deref() {
        if !block.eq_ignore_ascii_case(&complaint.block) {
            warn!(
                complaint_id = %complaint.id,
                complaint_block = %complaint.block,
                warden_id = %warden.id,
                warden_block = %block,
                "Assigning warden outside their block"
            );
        }
    }

    complaint.warden_id = Some(warden.id.clone());
    complaint.assigned_at = Some(now.into());
    if complaint.status == ComplaintStatus::Open {
        complaint.status = ComplaintStatus::InProgress;
    }
    complaint.updated_at = Some(now.into());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::lifecycle::tests::complaint_with_status;

    fn user_with_role(id: &str, role: Role, block: Option<&str>) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: "Meera".to_string(),
            email: format!("{id}@hostel.test"),
            password_hash: String::new(),
            role,
            block: block.map(str::to_string),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_assign_open_moves_to_in_progress() {
        let mut c = complaint_with_status(ComplaintStatus::Open);
        let warden = user_with_role("w1", Role::Warden, Some("B"));

        assign(&mut c, &warden, Utc::now()).unwrap();

        assert_eq!(c.status, ComplaintStatus::InProgress);
        assert_eq!(c.warden_id.as_deref(), Some("w1"));
        assert!(c.assigned_at.is_some());
    }

    #[test]
    fn test_assign_critical_keeps_status() {
        let mut c = complaint_with_status(ComplaintStatus::Critical);
        let warden = user_with_role("w1", Role::Warden, None);

        assign(&mut c, &warden, Utc::now()).unwrap();

        assert_eq!(c.status, ComplaintStatus::Critical);
        assert!(c.assigned_at.is_some());
    }

    #[test]
    fn test_reassign_overwrites_warden() {
        let mut c = complaint_with_status(ComplaintStatus::Open);
        let first = Utc::now();
        assign(&mut c, &user_with_role("w1", Role::Warden, None), first).unwrap();

        let second = first + chrono::Duration::minutes(5);
        assign(&mut c, &user_with_role("w2", Role::Warden, Some("Z")), second).unwrap();

        assert_eq!(c.warden_id.as_deref(), Some("w2"));
        assert_eq!(c.assigned_at, Some(second.into()));
        assert_eq!(c.status, ComplaintStatus::InProgress);
    }

    #[test]
    fn test_assign_resolved_fails() {
        let mut c = complaint_with_status(ComplaintStatus::Resolved);
        let before = c.clone();

        let result = assign(&mut c, &user_with_role("w1", Role::Warden, None), Utc::now());

        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
        assert_eq!(c, before);
    }

    #[test]
    fn test_non_warden_is_not_found() {
        let mut c = complaint_with_status(ComplaintStatus::Open);

        let result = assign(&mut c, &user_with_role("s9", Role::Student, None), Utc::now());

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(c.warden_id.is_none());
    }
}
