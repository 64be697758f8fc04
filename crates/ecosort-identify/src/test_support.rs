//! Fakes shared by the unit tests: an HTTP endpoint that replays scripted
//! replies and an in-process backend with scripted outcomes.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Notify};

use crate::backend::{BackendHealth, BackendKind, IdentificationBackend};
use crate::config::ResolverConfig;
use crate::error::BackendFailure;
use crate::request::{IdentificationRequest, RequestKind};
use crate::result::IdentificationResult;

/// 1x1 PNG.
pub(crate) const PIXEL: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

#[derive(Debug, Clone)]
pub(crate) struct MockReply {
    status: u16,
    body: Value,
    delay: Option<Duration>,
}

impl MockReply {
    pub(crate) fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            delay: None,
        }
    }

    /// A remote-endpoint reply whose `completion` is the given text.
    pub(crate) fn completion(text: &str) -> Self {
        Self::json(200, json!({ "completion": text }))
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Counter shared by several endpoints so tests can tell which was hit
/// first.
#[derive(Debug, Clone, Default)]
pub(crate) struct HitClock(Arc<AtomicUsize>);

struct MockState {
    replies: Vec<MockReply>,
    hits: AtomicUsize,
    clock: HitClock,
    stamps: Mutex<Vec<usize>>,
    paths: Mutex<Vec<String>>,
    bodies: Mutex<Vec<Value>>,
}

/// HTTP server on an ephemeral port. Replies are served in order; the last
/// one repeats once the script runs out.
pub(crate) struct MockEndpoint {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockEndpoint {
    pub(crate) async fn start(replies: Vec<MockReply>) -> Self {
        Self::start_with_clock(replies, HitClock::default()).await
    }

    /// Stamps each hit from `clock`; see [`MockEndpoint::stamps`].
    pub(crate) async fn start_with_clock(replies: Vec<MockReply>, clock: HitClock) -> Self {
        assert!(!replies.is_empty(), "mock endpoint needs at least one reply");
        let state = Arc::new(MockState {
            replies,
            hits: AtomicUsize::new(0),
            clock,
            stamps: Mutex::new(Vec::new()),
            paths: Mutex::new(Vec::new()),
            bodies: Mutex::new(Vec::new()),
        });
        let app = Router::new().fallback(reply).with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock");
        let addr = listener.local_addr().expect("mock addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });
        Self {
            addr,
            state,
            shutdown: Some(shutdown_tx),
        }
    }

    pub(crate) fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub(crate) fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub(crate) fn stamps(&self) -> Vec<usize> {
        self.state.stamps.lock().expect("stamps").clone()
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.state.paths.lock().expect("paths").clone()
    }

    pub(crate) fn bodies(&self) -> Vec<Value> {
        self.state.bodies.lock().expect("bodies").clone()
    }
}

impl Drop for MockEndpoint {
    fn drop(&mut self) {
        if let Some(sender) = self.shutdown.take() {
            let _ = sender.send(());
        }
    }
}

async fn reply(State(state): State<Arc<MockState>>, uri: Uri, body: Bytes) -> Response {
    let index = state.hits.fetch_add(1, Ordering::SeqCst);
    let stamp = state.clock.0.fetch_add(1, Ordering::SeqCst);
    state.stamps.lock().expect("stamps").push(stamp);
    state
        .paths
        .lock()
        .expect("paths")
        .push(uri.path().to_string());
    let parsed = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.bodies.lock().expect("bodies").push(parsed);

    let scripted = state.replies[index.min(state.replies.len() - 1)].clone();
    if let Some(delay) = scripted.delay {
        tokio::time::sleep(delay).await;
    }
    let status = StatusCode::from_u16(scripted.status).expect("status");
    (status, Json(scripted.body)).into_response()
}

/// A base URL nothing listens on.
pub(crate) async fn refused_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

pub(crate) fn can_prediction(confidence: f64) -> Value {
    json!({
        "class_id": 1,
        "class_name": "Aluminum Can",
        "category": "metal",
        "confidence": confidence,
        "is_recyclable": true,
        "predictions": [confidence]
    })
}

pub(crate) fn config_with_endpoints(candidate_endpoints: Vec<String>) -> ResolverConfig {
    ResolverConfig {
        candidate_endpoints,
        remote_endpoint: "http://127.0.0.1:9/unused".to_string(),
        request_timeout_ms: 2_000,
        ..ResolverConfig::default()
    }
}

pub(crate) fn config_with_remote(remote_endpoint: String) -> ResolverConfig {
    ResolverConfig {
        remote_endpoint,
        request_timeout_ms: 2_000,
        ..ResolverConfig::default()
    }
}

/// In-process backend that replays scripted outcomes.
pub(crate) struct ScriptedBackend {
    kind: BackendKind,
    handles: Vec<RequestKind>,
    outcomes: Vec<Result<IdentificationResult, BackendFailure>>,
    calls: AtomicUsize,
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl ScriptedBackend {
    pub(crate) fn new(
        kind: BackendKind,
        outcome: Result<IdentificationResult, BackendFailure>,
    ) -> Self {
        let handles = match kind {
            BackendKind::LocalModel => vec![RequestKind::Image],
            BackendKind::RemoteAi => {
                vec![RequestKind::Image, RequestKind::Barcode, RequestKind::Text]
            }
        };
        Self {
            kind,
            handles,
            outcomes: vec![outcome],
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Announces on `started` and waits on `release` before answering.
    pub(crate) fn gated(mut self, started: Arc<Notify>, release: Arc<Notify>) -> Self {
        self.gate = Some((started, release));
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentificationBackend for ScriptedBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn supports(&self, request: &IdentificationRequest) -> bool {
        self.handles.contains(&request.kind())
    }

    async fn query(
        &self,
        _request: &IdentificationRequest,
        _config: &ResolverConfig,
    ) -> Result<IdentificationResult, BackendFailure> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some((started, release)) = &self.gate {
            started.notify_one();
            release.notified().await;
        }
        self.outcomes[index.min(self.outcomes.len() - 1)].clone()
    }

    async fn health(&self, _config: &ResolverConfig) -> BackendHealth {
        BackendHealth {
            available: true,
            endpoint: format!("scripted://{}", self.kind),
        }
    }
}
