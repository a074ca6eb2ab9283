use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::error::{AppError, AppResult};
use crate::models::{Complaint, ComplaintPatch, CreatedComplaint, NewComplaint, STATUS_PENDING};

use super::ComplaintStore;

#[derive(Default)]
struct State {
    rows: Vec<Complaint>,
    next_id: i64,
    last_created: Option<DateTime<Utc>>,
}

/// In-process store for handler tests. Timestamps are forced to be strictly
/// increasing so insertion order is observable through `created_at`.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_with: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails like an unreachable database.
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn get(&self, id: i64) -> Option<Complaint> {
        let state = self.state.lock().unwrap();
        state.rows.iter().find(|c| c.id == id).cloned()
    }

    fn check(&self) -> AppResult<()> {
        match &self.fail_with {
            Some(message) => Err(AppError::Database(sqlx::Error::Protocol(message.clone()))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ComplaintStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Complaint>> {
        self.check()?;
        let state = self.state.lock().unwrap();
        let mut rows = state.rows.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn create(&self, complaint: &NewComplaint) -> AppResult<CreatedComplaint> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;

        let mut created_at = Utc::now();
        if let Some(last) = state.last_created {
            if created_at <= last {
                created_at = last + Duration::microseconds(1);
            }
        }
        state.last_created = Some(created_at);

        let row = Complaint {
            id: state.next_id,
            player_nickname: complaint.player_nickname.clone(),
            server: complaint.server.clone(),
            title: complaint.title.clone(),
            description: complaint.description.clone(),
            image_url: complaint.image_url.clone(),
            status: Some(STATUS_PENDING.to_string()),
            admin_response: None,
            created_at: Some(created_at),
        };
        let created = CreatedComplaint {
            id: row.id,
            created_at,
        };
        state.rows.push(row);
        Ok(created)
    }

    async fn update(&self, id: i64, patch: &ComplaintPatch) -> AppResult<u64> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        let Some(row) = state.rows.iter_mut().find(|c| c.id == id) else {
            return Ok(0);
        };

        let mut touched = 0;
        if let Some(status) = &patch.status {
            row.status = status.clone();
            touched += 1;
        }
        if let Some(admin_response) = &patch.admin_response {
            row.admin_response = admin_response.clone();
            touched += 1;
        }
        Ok(touched)
    }

    async fn delete(&self, id: i64) -> AppResult<u64> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        let before = state.rows.len();
        state.rows.retain(|c| c.id != id);
        Ok((before - state.rows.len()) as u64)
    }

    async fn ping(&self) -> AppResult<()> {
        self.check()
    }
}
