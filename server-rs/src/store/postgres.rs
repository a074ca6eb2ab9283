use async_trait::async_trait;
use sqlx::{postgres::PgConnection, Connection};
use tracing::instrument;

use crate::db::ConnectionProvider;
use crate::error::AppResult;
use crate::models::{Complaint, ComplaintPatch, CreatedComplaint, NewComplaint, STATUS_PENDING};

use super::ComplaintStore;

/// PostgreSQL-backed store. Every operation acquires its own connection and
/// releases it before returning, on success and on error.
#[derive(Clone)]
pub struct PgComplaintStore {
    provider: ConnectionProvider,
}

impl PgComplaintStore {
    pub fn new(provider: ConnectionProvider) -> Self {
        Self { provider }
    }
}

async fn select_all(conn: &mut PgConnection) -> Result<Vec<Complaint>, sqlx::Error> {
    sqlx::query_as::<_, Complaint>(
        r#"SELECT id::bigint AS id, player_nickname, server, title, description, image_url,
                  status, admin_response, created_at::timestamptz AS created_at
        FROM complaints
        ORDER BY created_at DESC, id DESC"#,
    )
    .fetch_all(conn)
    .await
}

async fn insert(
    conn: &mut PgConnection,
    complaint: &NewComplaint,
) -> Result<CreatedComplaint, sqlx::Error> {
    sqlx::query_as::<_, CreatedComplaint>(
        r#"INSERT INTO complaints (player_nickname, server, title, description, image_url, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id::bigint AS id, created_at::timestamptz AS created_at"#,
    )
    .bind(&complaint.player_nickname)
    .bind(&complaint.server)
    .bind(&complaint.title)
    .bind(&complaint.description)
    .bind(complaint.image_url.as_deref())
    .bind(STATUS_PENDING)
    .fetch_one(conn)
    .await
}

async fn apply_patch(
    conn: &mut PgConnection,
    id: i64,
    patch: &ComplaintPatch,
) -> Result<u64, sqlx::Error> {
    let mut tx = conn.begin().await?;
    let mut touched = 0;

    if let Some(status) = &patch.status {
        touched += sqlx::query("UPDATE complaints SET status = $1 WHERE id = $2")
            .bind(status.as_deref())
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }

    if let Some(admin_response) = &patch.admin_response {
        touched += sqlx::query("UPDATE complaints SET admin_response = $1 WHERE id = $2")
            .bind(admin_response.as_deref())
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }

    tx.commit().await?;
    Ok(touched)
}

async fn remove(conn: &mut PgConnection, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM complaints WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

#[async_trait]
impl ComplaintStore for PgComplaintStore {
    #[instrument(skip(self))]
    async fn list(&self) -> AppResult<Vec<Complaint>> {
        let mut conn = self.provider.acquire().await?;
        let result = select_all(&mut conn).await;
        self.provider.release(conn).await;
        Ok(result?)
    }

    #[instrument(skip(self, complaint))]
    async fn create(&self, complaint: &NewComplaint) -> AppResult<CreatedComplaint> {
        let mut conn = self.provider.acquire().await?;
        let result = insert(&mut conn, complaint).await;
        self.provider.release(conn).await;
        Ok(result?)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: i64, patch: &ComplaintPatch) -> AppResult<u64> {
        let mut conn = self.provider.acquire().await?;
        let result = apply_patch(&mut conn, id, patch).await;
        self.provider.release(conn).await;
        Ok(result?)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> AppResult<u64> {
        let mut conn = self.provider.acquire().await?;
        let result = remove(&mut conn, id).await;
        self.provider.release(conn).await;
        Ok(result?)
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.provider.acquire().await?;
        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&mut conn)
            .await;
        self.provider.release(conn).await;
        result?;
        Ok(())
    }
}
