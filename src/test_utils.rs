//! In-process stand-ins for the image host and the analysis service
//!
//! A single axum app serves both roles on an ephemeral port and records every
//! request it sees.

use crate::config::RelayConfig;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use axum::Router;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-png-pixels";
pub const JPEG_BYTES: &[u8] = b"\xff\xd8\xff\xe0fake-jpeg-pixels";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn content_type(&self) -> &str {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn body_contains(&self, needle: &[u8]) -> bool {
        self.body.windows(needle.len()).any(|w| w == needle)
    }

    pub fn body_json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is not JSON")
    }
}

type Recorded = Arc<Mutex<Vec<RecordedRequest>>>;

pub struct StubService {
    addr: SocketAddr,
    recorded: Recorded,
    handle: JoinHandle<()>,
}

impl StubService {
    pub async fn start() -> Self {
        let recorded: Recorded = Arc::default();
        let app = Router::new()
            .fallback(handle_request)
            .with_state(recorded.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub service");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            recorded,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Relay settings pointing at this stub's `/echo`
    pub fn relay_config(&self) -> RelayConfig {
        self.relay_config_for("/echo")
    }

    pub fn relay_config_for(&self, echo_path: &str) -> RelayConfig {
        RelayConfig {
            echo_url: self.url(echo_path),
            use_system_proxy: false,
            ..RelayConfig::default()
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

impl Drop for StubService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_request(
    State(recorded): State<Recorded>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let body_len = body.len();
    recorded.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        headers,
        body: body.to_vec(),
    });

    match (method, path.as_str()) {
        (Method::GET, "/face.png") => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "image/png")
            .body(Body::from(PNG_BYTES))
            .unwrap(),
        // No Content-Type header at all
        (Method::GET, "/untyped.jpg") => Response::new(Body::from(JPEG_BYTES)),
        // Not parseable as a MIME type
        (Method::GET, "/oddtype.jpg") => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "image")
            .body(Body::from(JPEG_BYTES))
            .unwrap(),
        (Method::GET, "/slow.jpg") => {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Response::new(Body::from(JPEG_BYTES))
        },
        (Method::POST, "/echo") => {
            Json(json!({"received": true, "bytes": body_len, "skin": "oily"})).into_response()
        },
        (Method::POST, "/broken/echo") => "<html>not json</html>".into_response(),
        (Method::POST, "/failing/echo") => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "analysis backend unavailable"})),
        )
            .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// URL on a local port that nothing listens on
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/x.jpg", addr)
}
