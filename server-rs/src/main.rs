use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

mod config;
mod db;
mod error;
mod handler;
mod invocation;
mod models;
mod routes;
mod store;

use config::Config;
use db::ConnectionProvider;
use invocation::{HandlerEvent, HandlerResponse, InvocationContext};
use store::{ComplaintStore, PgComplaintStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ComplaintStore>,
    pub config: Arc<Config>,
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/complaints", any(invoke_collection))
        .route("/api/complaints/:id", any(invoke_item))
        .route("/invoke", post(invoke_event))
        .route("/health", get(routes::health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn context(state: &AppState, headers: &HeaderMap) -> InvocationContext {
    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    InvocationContext {
        request_id,
        function_name: state.config.function_name.clone(),
    }
}

fn http_event(
    method: &Method,
    id: Option<String>,
    query: HashMap<String, String>,
    body: String,
) -> HandlerEvent {
    HandlerEvent {
        http_method: Some(method.as_str().to_string()),
        body: Some(body).filter(|b| !b.is_empty()),
        path_params: id.map(|id| HashMap::from([("id".to_string(), id.into())])),
        query_string_parameters: Some(query.into_iter().map(|(k, v)| (k, v.into())).collect()),
    }
}

async fn invoke_collection(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    let ctx = context(&state, &headers);
    let event = http_event(&method, None, query, body);
    handler::handle(state.store.as_ref(), event, &ctx)
        .await
        .into_response()
}

async fn invoke_item(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    let ctx = context(&state, &headers);
    let event = http_event(&method, Some(id), query, body);
    handler::handle(state.store.as_ref(), event, &ctx)
        .await
        .into_response()
}

/// Accepts a raw host event and replies with the response descriptor itself.
async fn invoke_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<HandlerEvent>,
) -> Json<HandlerResponse> {
    let ctx = context(&state, &headers);
    Json(handler::handle(state.store.as_ref(), event, &ctx).await)
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .json()
        .init();

    let provider = ConnectionProvider::new(&config.db);
    let state = AppState {
        store: Arc::new(PgComplaintStore::new(provider)),
        config: Arc::new(config),
    };

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, function = %state.config.function_name, "Complaints handler listening");

    if let Err(e) = axum::serve(listener, build_router(state)).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use store::memory::MemoryStore;
    use tower::ServiceExt;

    fn app() -> Router {
        let config = Config::from_lookup(|_| None);
        build_router(AppState {
            store: Arc::new(MemoryStore::new()),
            config: Arc::new(config),
        })
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn preflight_over_http_has_no_content_type() {
        let app = app();
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/complaints")
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        assert!(headers.get("content-type").is_none());
        assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
        assert_eq!(headers.get("access-control-max-age").unwrap(), "86400");
    }

    #[tokio::test]
    async fn crud_over_http() {
        let app = app();
        let (status, _, body) = send(
            &app,
            json_request(
                "POST",
                "/api/complaints",
                json!({"playerNickname": "Bob", "server": "S1", "title": "Cheater", "description": "uses aimbot"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = serde_json::from_str::<Value>(&body).unwrap()["id"].as_i64().unwrap();

        let (status, _, body) = send(
            &app,
            json_request("PUT", &format!("/api/complaints/{id}"), json!({"status": "resolved"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"success":true}"#);

        let request = Request::builder()
            .uri("/api/complaints?server=S1")
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
        let list: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(list[0]["status"], "resolved");

        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/api/complaints/{id}"))
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn patch_over_http_is_405() {
        let app = app();
        let (status, _, body) =
            send(&app, json_request("PATCH", "/api/complaints/1", json!({}))).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, r#"{"error":"Method not allowed"}"#);
    }

    #[tokio::test]
    async fn raw_event_invocation_returns_descriptor() {
        let app = app();
        let event = json!({
            "httpMethod": "POST",
            "body": json!({"playerNickname": "Bob", "server": "S1", "description": "no title"}).to_string(),
            "pathParams": {},
            "queryStringParameters": null
        });
        let (status, _, body) = send(&app, json_request("POST", "/invoke", event)).await;

        assert_eq!(status, StatusCode::OK);
        let descriptor: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(descriptor["statusCode"], 500);
        assert_eq!(descriptor["isBase64Encoded"], false);
        let inner: Value = serde_json::from_str(descriptor["body"].as_str().unwrap()).unwrap();
        assert!(inner["error"].as_str().unwrap().contains("title"));
    }

    #[tokio::test]
    async fn health_reports_store_state() {
        let app = app();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, _, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        let health: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["postgres"], true);
    }
}
