//! Request/response descriptors exchanged with the function host.

use std::collections::{BTreeMap, HashMap};

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AppResult;

pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";
pub const PREFLIGHT_MAX_AGE_SECS: u32 = 86_400;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerEvent {
    pub http_method: Option<String>,
    pub body: Option<String>,
    pub path_params: Option<HashMap<String, Value>>,
    pub query_string_parameters: Option<HashMap<String, Value>>,
}

impl HandlerEvent {
    pub fn method(&self) -> &str {
        self.http_method.as_deref().unwrap_or("GET")
    }

    pub fn body_or_empty_object(&self) -> &str {
        self.body.as_deref().unwrap_or("{}")
    }

    /// Scalar path parameters are accepted as strings or bare JSON numbers.
    pub fn path_param(&self, key: &str) -> Option<String> {
        match self.path_params.as_ref()?.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// Invocation metadata. Only used for log correlation.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub request_id: String,
    pub function_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl HandlerResponse {
    fn with_headers(status: StatusCode, headers: &[(&str, String)], body: String) -> Self {
        Self {
            status_code: status.as_u16(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            body,
            is_base64_encoded: false,
        }
    }

    fn json_headers() -> [(&'static str, String); 2] {
        [
            ("Content-Type", "application/json".to_string()),
            ("Access-Control-Allow-Origin", "*".to_string()),
        ]
    }

    pub fn json<T: Serialize>(status: StatusCode, payload: &T) -> AppResult<Self> {
        let body = serde_json::to_string(payload)?;
        Ok(Self::with_headers(status, &Self::json_headers(), body))
    }

    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = json!({ "error": message }).to_string();
        Self::with_headers(status, &Self::json_headers(), body)
    }

    pub fn preflight() -> Self {
        Self::with_headers(
            StatusCode::OK,
            &[
                ("Access-Control-Allow-Origin", "*".to_string()),
                ("Access-Control-Allow-Methods", ALLOWED_METHODS.to_string()),
                ("Access-Control-Allow-Headers", ALLOWED_HEADERS.to_string()),
                ("Access-Control-Max-Age", PREFLIGHT_MAX_AGE_SECS.to_string()),
            ],
            String::new(),
        )
    }

    #[cfg(test)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        for (name, value) in &self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping unrepresentable response header"),
            }
        }

        response
    }
}
