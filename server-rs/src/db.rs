use sqlx::{postgres::PgConnection, Connection};

use crate::config::DbConfig;
use crate::error::AppResult;

/// Opens one PostgreSQL connection per acquisition. Nothing is pooled, so a
/// connection never outlives the invocation that opened it.
#[derive(Clone)]
pub struct ConnectionProvider {
    url: String,
}

impl ConnectionProvider {
    pub fn new(config: &DbConfig) -> Self {
        Self {
            url: config.url.clone(),
        }
    }

    pub async fn acquire(&self) -> AppResult<PgConnection> {
        Ok(PgConnection::connect(&self.url).await?)
    }

    /// Closes the connection gracefully. A failed close is logged and
    /// otherwise ignored; the socket is dropped either way.
    pub async fn release(&self, conn: PgConnection) {
        if let Err(e) = conn.close().await {
            tracing::warn!("Failed to close database connection: {e}");
        }
    }
}
