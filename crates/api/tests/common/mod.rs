#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use brainview_bfl::batch::BatchImageGenerator;
use brainview_bfl::poll::PollConfig;
use brainview_bfl::provider::{ImageProvider, JobHandle, JobStatus, ProviderError};
use brainview_core::store::InMemoryCaseStore;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use brainview_api::config::ServerConfig;
use brainview_api::router::build_app_router;
use brainview_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 150,
    }
}

/// In-memory provider. Prompts containing `reject` fail submission;
/// everything else is ready on the first poll with a URL derived from the
/// submission number.
pub struct StubProvider {
    configured: bool,
    pub submissions: AtomicUsize,
}

impl StubProvider {
    pub fn configured() -> Arc<Self> {
        Arc::new(Self {
            configured: true,
            submissions: AtomicUsize::new(0),
        })
    }

    pub fn unconfigured() -> Arc<Self> {
        Arc::new(Self {
            configured: false,
            submissions: AtomicUsize::new(0),
        })
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ImageProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn missing_credential(&self) -> Option<&'static str> {
        (!self.configured).then_some("BFL_API_KEY")
    }

    async fn submit(&self, prompt: &str) -> Result<JobHandle, ProviderError> {
        let n = self.submissions.fetch_add(1, Ordering::SeqCst);
        if prompt.contains("reject") {
            return Err(ProviderError::ApiError {
                status: 400,
                body: "rejected".into(),
            });
        }
        Ok(JobHandle {
            id: format!("job-{n}"),
            polling_url: format!("https://stub/poll/{n}"),
        })
    }

    async fn poll(&self, handle: &JobHandle) -> Result<JobStatus, ProviderError> {
        Ok(JobStatus::Ready(format!("https://img.example/{}.png", handle.id)))
    }
}

/// Build the full application router backed by `provider` and a fresh
/// in-memory case store.
pub fn build_test_app(provider: Arc<StubProvider>) -> Router {
    let config = test_config();
    let poll = PollConfig {
        interval: Duration::from_millis(1),
        deadline: Duration::from_secs(5),
    };

    let state = AppState {
        config: Arc::new(config.clone()),
        cases: Arc::new(InMemoryCaseStore::new()),
        generator: Arc::new(BatchImageGenerator::new(provider, poll)),
    };

    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// POST an arbitrary body, with an optional `content-type`.
pub async fn post_raw(app: Router, uri: &str, content_type: Option<&str>, body: &str) -> Response {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    app.oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
