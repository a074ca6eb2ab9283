use serde::Serialize;

use crate::error::AppResult;
use crate::models::{parse_complaint_id, Complaint, ComplaintPatch, CreatedComplaint, CreateComplaintRequest};
use crate::store::ComplaintStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub const OK: Success = Success { success: true };
}

pub async fn list_complaints(store: &dyn ComplaintStore) -> AppResult<Vec<Complaint>> {
    let complaints = store.list().await?;
    tracing::debug!(count = complaints.len(), "Listed complaints");
    Ok(complaints)
}

pub async fn create_complaint(
    store: &dyn ComplaintStore,
    request: CreateComplaintRequest,
) -> AppResult<CreatedComplaint> {
    let complaint = request.into_new_complaint()?;
    let created = store.create(&complaint).await?;
    tracing::info!(
        complaint_id = created.id,
        player = %complaint.player_nickname,
        server = %complaint.server,
        "Complaint submitted"
    );
    Ok(created)
}

/// No existence check: an unknown id touches zero rows and still succeeds.
/// A missing id is treated the same way.
pub async fn update_complaint(
    store: &dyn ComplaintStore,
    id: Option<&str>,
    patch: ComplaintPatch,
) -> AppResult<Success> {
    let Some(raw_id) = id else {
        tracing::warn!("Update without a complaint id; nothing to do");
        return Ok(Success::OK);
    };
    let id = parse_complaint_id(raw_id)?;

    if patch.is_empty() {
        tracing::debug!(complaint_id = id, "Update carried no known fields");
    }

    let touched = store.update(id, &patch).await?;
    tracing::info!(
        complaint_id = id,
        status_changed = patch.status.is_some(),
        response_changed = patch.admin_response.is_some(),
        rows = touched,
        "Complaint updated"
    );
    Ok(Success::OK)
}

pub async fn delete_complaint(store: &dyn ComplaintStore, id: Option<&str>) -> AppResult<Success> {
    let Some(raw_id) = id else {
        tracing::warn!("Delete without a complaint id; nothing to do");
        return Ok(Success::OK);
    };
    let id = parse_complaint_id(raw_id)?;

    let removed = store.delete(id).await?;
    tracing::info!(complaint_id = id, rows = removed, "Complaint deleted");
    Ok(Success::OK)
}
