// Mock upstream webhook and request helpers shared by the integration tests.
#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chat_relay::{config::RelayConfig, routes::create_router, state::AppState};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// What the mock webhook saw: the secret header (if any) and the JSON body.
#[derive(Debug, Clone)]
pub struct Captured {
    pub secret: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

pub type CaptureLog = Arc<Mutex<Vec<Captured>>>;

#[derive(Clone)]
struct MockState {
    captured: CaptureLog,
    slow_dropped: Arc<AtomicBool>,
}

/// Flips its flag when the slow handler's future is dropped mid-sleep.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

pub struct MockUpstream {
    pub base_url: String,
    pub captured: CaptureLog,
    slow_dropped: Arc<AtomicBool>,
    handle: tokio::task::JoinHandle<()>,
}

impl MockUpstream {
    pub async fn start() -> Self {
        let captured: CaptureLog = Arc::new(Mutex::new(Vec::new()));
        let slow_dropped = Arc::new(AtomicBool::new(false));

        let app = Router::new()
            .route("/json", post(json_reply))
            .route("/text", post(text_reply))
            .route("/fail", post(failing_reply))
            .route("/slow", post(slow_reply))
            .route("/bad-json", post(bad_json_reply))
            .route("/echo", post(echo_reply))
            .with_state(MockState {
                captured: captured.clone(),
                slow_dropped: slow_dropped.clone(),
            });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("mock upstream error: {}", e);
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            captured,
            slow_dropped,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn captured(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }

    /// True once a `/slow` handler was abandoned before finishing its sleep.
    pub fn slow_call_dropped(&self) -> bool {
        self.slow_dropped.load(Ordering::SeqCst)
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn json_reply() -> Response {
    (
        [(header::CONTENT_TYPE, "application/json")],
        r#"{"reply":"hi"}"#,
    )
        .into_response()
}

async fn text_reply() -> Response {
    ([(header::CONTENT_TYPE, "text/plain")], "hello").into_response()
}

async fn failing_reply() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "workflow crashed: db password is hunter2",
    )
        .into_response()
}

async fn slow_reply(State(state): State<MockState>) -> Response {
    let guard = DropFlag(state.slow_dropped.clone());
    tokio::time::sleep(Duration::from_secs(30)).await;
    std::mem::forget(guard);
    Json(json!({ "output": "too late" })).into_response()
}

async fn bad_json_reply() -> Response {
    ([(header::CONTENT_TYPE, "application/json")], "<html>oops</html>").into_response()
}

async fn echo_reply(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.captured.lock().unwrap().push(Captured {
        secret: header_str("x-webhook-secret"),
        content_type: header_str("content-type"),
        body,
    });
    Json(json!({ "output": "Hi there" }))
}

/// Port that nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/webhook", addr)
}

pub fn app(config: RelayConfig) -> Router {
    let state = Arc::new(AppState::new(config).unwrap());
    create_router().with_state(state)
}

pub const VALID_BODY: &str = r#"{"message":"Hello","sessionId":"abcd1234"}"#;

/// Same-origin POST for example.com carrying `body`.
pub fn chat_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("origin", "https://example.com")
        .header("host", "example.com")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
