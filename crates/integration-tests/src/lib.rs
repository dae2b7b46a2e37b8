//! Integration tests for Corner Shop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cornershop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog` - Product fetch, coercion and fallback
//! - `newsletter` - Newsletter signup against the backend
//! - `page` - Page controller end to end with file storage
//!
//! Every test talks to a [`StubBackend`]: an `axum` server on an ephemeral
//! local port whose responses the test scripts.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use cornershop_storefront::config::StorefrontConfig;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// A scripted HTTP response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Reply {
    /// A 200 response with a JSON body.
    #[must_use]
    pub fn json(value: &serde_json::Value) -> Self {
        Self::raw(200, value.to_string())
    }

    /// A response with an arbitrary status and body.
    #[must_use]
    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    /// Delay the response.
    #[must_use]
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn into_http(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

#[derive(Debug)]
struct StubState {
    products: Mutex<Reply>,
    newsletter: Mutex<Reply>,
    product_requests: Mutex<Vec<Option<String>>>,
    subscriptions: Mutex<Vec<serde_json::Value>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scripted stand-in for the storefront backend.
///
/// Serves `GET /api/products` and `POST /api/newsletter`. The server task is
/// aborted when the backend is dropped.
pub struct StubBackend {
    addr: SocketAddr,
    state: Arc<StubState>,
    task: JoinHandle<()>,
}

impl StubBackend {
    /// Start a backend that answers products with an empty array and accepts
    /// every subscription.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = Arc::new(StubState {
            products: Mutex::new(Reply::json(&serde_json::json!([]))),
            newsletter: Mutex::new(Reply::raw(200, "{}")),
            product_requests: Mutex::new(Vec::new()),
            subscriptions: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/api/products", get(products))
            .route("/api/newsletter", post(newsletter))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub backend address");

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state, task }
    }

    /// Base URL of the backend.
    ///
    /// # Panics
    ///
    /// Never in practice; the address always forms a valid URL.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).expect("stub backend url")
    }

    /// Storefront configuration pointing at this backend.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig::new(self.url())
    }

    /// Script the products response.
    pub fn set_products(&self, reply: Reply) {
        *lock(&self.state.products) = reply;
    }

    /// Script the newsletter response.
    pub fn set_newsletter(&self, reply: Reply) {
        *lock(&self.state.newsletter) = reply;
    }

    /// `Authorization` header of every products request so far.
    #[must_use]
    pub fn product_requests(&self) -> Vec<Option<String>> {
        lock(&self.state.product_requests).clone()
    }

    /// Bodies of every newsletter request so far.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<serde_json::Value> {
        lock(&self.state.subscriptions).clone()
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A base URL nothing is listening on.
///
/// # Panics
///
/// Panics if no local port can be bound.
pub async fn unreachable_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe port");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);

    Url::parse(&format!("http://{addr}/")).expect("probe url")
}

async fn products(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    lock(&state.product_requests).push(auth);

    let reply = lock(&state.products).clone();
    tokio::time::sleep(reply.delay).await;
    reply.into_http()
}

async fn newsletter(State(state): State<Arc<StubState>>, body: Bytes) -> Response {
    let value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    lock(&state.subscriptions).push(value);

    let reply = lock(&state.newsletter).clone();
    tokio::time::sleep(reply.delay).await;
    reply.into_http()
}
