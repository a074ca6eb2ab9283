use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};

pub const STATUS_PENDING: &str = "pending";

/// A stored complaint, serialized in the client-facing camelCase shape.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: i64,
    pub player_nickname: String,
    pub server: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub status: Option<String>,
    pub admin_response: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CreatedComplaint {
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComplaint {
    pub player_nickname: String,
    pub server: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
}

/// Only keys that are present are applied. `Some(None)` writes NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintPatch {
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub admin_response: Option<Option<String>>,
}

impl ComplaintPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.admin_response.is_none()
    }
}

/// Any `status` key in the body is accepted and discarded.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComplaintRequest {
    pub player_nickname: Option<String>,
    pub server: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl CreateComplaintRequest {
    pub fn into_new_complaint(self) -> AppResult<NewComplaint> {
        Ok(NewComplaint {
            player_nickname: self
                .player_nickname
                .ok_or(AppError::MissingField("playerNickname"))?,
            server: self.server.ok_or(AppError::MissingField("server"))?,
            title: self.title.ok_or(AppError::MissingField("title"))?,
            description: self
                .description
                .ok_or(AppError::MissingField("description"))?,
            image_url: self.image_url,
        })
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Parses a request body that must be a JSON object into `T`.
pub fn parse_object<T: serde::de::DeserializeOwned>(body: &str) -> AppResult<T> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| AppError::InvalidBody(e.to_string()))?;
    if !value.is_object() {
        return Err(AppError::InvalidBody(
            "request body must be a JSON object".into(),
        ));
    }
    serde_json::from_value(value).map_err(|e| AppError::InvalidBody(e.to_string()))
}

pub fn parse_complaint_id(raw: &str) -> AppResult<i64> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::InvalidId(raw.to_string()))
}
