//! Mock DigitalOcean domain records API
//!
//! Listens on an ephemeral local port, records every request and answers
//! like the real API does for TXT record create/delete:
//!
//! - `POST /v2/domains/{fqdn}/records` -> 201 with a fresh `domain_record.id`
//! - `DELETE /v2/domains/{fqdn}/records/{id}` -> 204
//! - anything else -> 404 with a DigitalOcean-style error body
//!
//! Individual paths can be scripted with [`MockDigitalOceanApi::respond_with`]
//! and slowed down with [`MockDigitalOceanApi::delay`].

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use parking_lot::RwLock;
use tokio::net::TcpListener;

use dns01_digitalocean::DigitalOceanProvider;

/// Token handed to providers built by [`MockDigitalOceanApi::provider`]
pub const TEST_TOKEN: &str = "dop_v1_test_token";

/// A recorded API request for test assertions
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    /// Request path without query string
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// First value of header `name` (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body parsed as JSON (`Null` when empty or invalid)
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or_default()
    }
}

/// A scripted response
#[derive(Clone, Debug)]
pub struct MockResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

#[derive(Default)]
struct MockState {
    requests: RwLock<Vec<RecordedRequest>>,
    /// (method, path) -> scripted response
    scripted: RwLock<HashMap<(String, String), MockResponse>>,
    /// path -> delay before answering
    delays: RwLock<HashMap<String, Duration>>,
    next_record_id: AtomicU64,
}

/// A mock of the DigitalOcean API for testing
pub struct MockDigitalOceanApi {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockDigitalOceanApi {
    /// Start the mock on an ephemeral port
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock API");
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(MockState {
            next_record_id: AtomicU64::new(1000),
            ..Default::default()
        });

        let state_clone = state.clone();
        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => break,
                };

                let state = state_clone.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let state = state.clone();
                        async move { Ok::<_, Infallible>(handle(&state, req).await) }
                    });

                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self { addr, state }
    }

    /// API base URL to hand to the provider (e.g. "http://127.0.0.1:12345/v2")
    pub fn base_url(&self) -> String {
        format!("http://{}/v2", self.addr)
    }

    /// A provider pointed at this mock, authenticated with [`TEST_TOKEN`]
    pub fn provider(&self) -> DigitalOceanProvider {
        DigitalOceanProvider::new(TEST_TOKEN).with_base_url(self.base_url())
    }

    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.read().clone()
    }

    /// Recorded requests with the given method
    pub fn requests_with_method(&self, method: &str) -> Vec<RecordedRequest> {
        self.state
            .requests
            .read()
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.read().len()
    }

    pub fn clear_requests(&self) {
        self.state.requests.write().clear();
    }

    /// Answer `method path` with a fixed status and body from now on
    pub fn respond_with(
        &self,
        method: &str,
        path: &str,
        status: StatusCode,
        body: impl Into<Vec<u8>>,
    ) {
        self.state.scripted.write().insert(
            (method.to_string(), path.to_string()),
            MockResponse {
                status,
                body: body.into(),
            },
        );
    }

    /// Drop a scripted response so `method path` gets the default behaviour again
    pub fn clear_response(&self, method: &str, path: &str) {
        self.state
            .scripted
            .write()
            .remove(&(method.to_string(), path.to_string()));
    }

    /// Hold every response for `path` back by `delay`
    pub fn delay(&self, path: &str, delay: Duration) {
        self.state.delays.write().insert(path.to_string(), delay);
    }

    /// ID the next default create response will carry
    pub fn set_next_record_id(&self, id: u64) {
        self.state.next_record_id.store(id, Ordering::SeqCst);
    }
}

async fn handle(state: &MockState, req: Request<Incoming>) -> Response<Full<Bytes>> {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let headers: Vec<(String, String)> = req
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
        .collect();

    let body = req
        .into_body()
        .collect()
        .await
        .map(|b| b.to_bytes().to_vec())
        .unwrap_or_default();

    tracing::debug!("Mock API: {} {}", method, path);

    state.requests.write().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        headers,
        body: body.clone(),
    });

    let delay = state.delays.read().get(&path).copied();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let scripted = state
        .scripted
        .read()
        .get(&(method.clone(), path.clone()))
        .cloned();
    let MockResponse { status, body } =
        scripted.unwrap_or_else(|| default_response(state, &method, &path, &body));

    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

fn default_response(state: &MockState, method: &str, path: &str, body: &[u8]) -> MockResponse {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    match (method, segments.as_slice()) {
        ("POST", ["v2", "domains", _, "records"]) => {
            let id = state.next_record_id.fetch_add(1, Ordering::SeqCst);
            let request: serde_json::Value = serde_json::from_slice(body).unwrap_or_default();
            let record = serde_json::json!({
                "domain_record": {
                    "id": id,
                    "type": request["type"],
                    "name": request["name"],
                    "data": request["data"],
                    "priority": null,
                    "port": null,
                    "ttl": 1800,
                    "weight": null,
                    "flags": null,
                    "tag": null
                }
            });
            MockResponse {
                status: StatusCode::CREATED,
                body: record.to_string().into_bytes(),
            }
        }
        ("DELETE", ["v2", "domains", _, "records", _]) => MockResponse {
            status: StatusCode::NO_CONTENT,
            body: Vec::new(),
        },
        _ => MockResponse {
            status: StatusCode::NOT_FOUND,
            body: br#"{"id":"not_found","message":"The resource you were accessing could not be found."}"#
                .to_vec(),
        },
    }
}
