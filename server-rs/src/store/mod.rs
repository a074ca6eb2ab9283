//! Persistence seam for complaints.

#[cfg(test)]
pub mod memory;
mod postgres;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Complaint, ComplaintPatch, CreatedComplaint, NewComplaint};

pub use postgres::PgComplaintStore;

#[async_trait]
pub trait ComplaintStore: Send + Sync {
    /// All complaints, newest first.
    async fn list(&self) -> AppResult<Vec<Complaint>>;

    /// Inserts with status `pending` and returns the server-assigned fields.
    async fn create(&self, complaint: &NewComplaint) -> AppResult<CreatedComplaint>;

    /// Applies the present keys of `patch`. Returns the number of rows touched.
    async fn update(&self, id: i64, patch: &ComplaintPatch) -> AppResult<u64>;

    /// Returns the number of rows removed.
    async fn delete(&self, id: i64) -> AppResult<u64>;

    async fn ping(&self) -> AppResult<()>;
}
