//! Method dispatch for the complaints function.

use http::StatusCode;
use tracing::Instrument;

use crate::error::{AppError, AppResult};
use crate::invocation::{HandlerEvent, HandlerResponse, InvocationContext};
use crate::models::parse_object;
use crate::routes::complaints;
use crate::store::ComplaintStore;

/// The request kinds this function understands, chosen once from the
/// event's method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    Preflight,
    List,
    Create { body: String },
    Update { id: Option<String>, body: String },
    Delete { id: Option<String> },
    Unsupported { method: String },
}

impl RequestKind {
    pub fn from_event(event: &HandlerEvent) -> Self {
        match event.method() {
            "OPTIONS" => RequestKind::Preflight,
            "GET" => RequestKind::List,
            "POST" => RequestKind::Create {
                body: event.body_or_empty_object().to_string(),
            },
            "PUT" => RequestKind::Update {
                id: event.path_param("id"),
                body: event.body_or_empty_object().to_string(),
            },
            "DELETE" => RequestKind::Delete {
                id: event.path_param("id"),
            },
            other => RequestKind::Unsupported {
                method: other.to_string(),
            },
        }
    }
}

pub async fn handle(
    store: &dyn ComplaintStore,
    event: HandlerEvent,
    ctx: &InvocationContext,
) -> HandlerResponse {
    let kind = RequestKind::from_event(&event);
    let span = tracing::info_span!(
        "invocation",
        request_id = %ctx.request_id,
        function = %ctx.function_name,
        method = %event.method(),
    );

    if let Some(query) = event.query_string_parameters.as_ref().filter(|q| !q.is_empty()) {
        span.in_scope(|| tracing::debug!(params = query.len(), "Ignoring query parameters"));
    }

    dispatch(store, kind)
        .instrument(span)
        .await
        .unwrap_or_else(AppError::into_handler_response)
}

async fn dispatch(store: &dyn ComplaintStore, kind: RequestKind) -> AppResult<HandlerResponse> {
    match kind {
        RequestKind::Preflight => Ok(HandlerResponse::preflight()),
        RequestKind::List => {
            let complaints = complaints::list_complaints(store).await?;
            HandlerResponse::json(StatusCode::OK, &complaints)
        }
        RequestKind::Create { body } => {
            let request = parse_object(&body)?;
            let created = complaints::create_complaint(store, request).await?;
            HandlerResponse::json(StatusCode::CREATED, &created)
        }
        RequestKind::Update { id, body } => {
            let patch = parse_object(&body)?;
            let result = complaints::update_complaint(store, id.as_deref(), patch).await?;
            HandlerResponse::json(StatusCode::OK, &result)
        }
        RequestKind::Delete { id } => {
            let result = complaints::delete_complaint(store, id.as_deref()).await?;
            HandlerResponse::json(StatusCode::OK, &result)
        }
        RequestKind::Unsupported { method } => {
            tracing::debug!(%method, "Unsupported method");
            Err(AppError::MethodNotAllowed)
        }
    }
}
