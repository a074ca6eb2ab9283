use http::StatusCode;

use crate::invocation::HandlerResponse;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid complaint id: {0}")]
    InvalidId(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Everything except an unsupported method collapses to 500, including
    /// malformed client input.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::MethodNotAllowed
                | AppError::InvalidBody(_)
                | AppError::MissingField(_)
                | AppError::InvalidId(_)
        )
    }

    pub fn into_handler_response(self) -> HandlerResponse {
        if self.is_client_error() {
            tracing::warn!(error = %self, "Rejected complaints request");
        } else {
            tracing::error!(error = %self, "Complaints request failed");
        }
        HandlerResponse::error(self.status(), &self.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
