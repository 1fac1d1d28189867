//! Scripted doubles for exercising the protocol without a network.

use crate::auth::{AccessToken, AuthProvider};
use crate::errors::{AuthenticationError, TransportError};
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration, Utc};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Auth provider that always yields the same unexpiring token.
pub struct StaticTokenProvider;

#[async_trait]
impl AuthProvider for StaticTokenProvider {
    async fn get_access_token(&self) -> Result<AccessToken, AuthenticationError> {
        Ok(AccessToken::new(
            "test-token",
            "Bearer",
            Utc::now() + Duration::seconds(3600),
            vec![],
        ))
    }

    async fn refresh_token(&self) -> Result<AccessToken, AuthenticationError> {
        self.get_access_token().await
    }

    fn is_expired(&self) -> bool {
        false
    }
}

/// One API call observed by the mock transport.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub path: String,
    pub query: Option<String>,
}

/// Transport returning scripted responses keyed by method and path.
///
/// Responses registered for the same key form a queue: each call pops the
/// front until one response remains, which then repeats. Unscripted paths
/// answer with a Drive-shaped 404.
#[derive(Default)]
pub struct MockTransport {
    scripted: Mutex<Vec<(HttpMethod, String, VecDeque<(u16, serde_json::Value)>)>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a response for a method and path.
    pub fn on(&self, method: HttpMethod, path: &str, status: u16, body: serde_json::Value) {
        let mut scripted = self.scripted.lock().unwrap();
        if let Some((_, _, queue)) = scripted
            .iter_mut()
            .find(|(m, p, _)| *m == method && p == path)
        {
            queue.push_back((status, body));
        } else {
            scripted.push((method, path.to_string(), VecDeque::from([(status, body)])));
        }
    }

    /// Every call observed so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of observed calls that mutate API state.
    pub fn write_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method.is_write())
            .count()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let path = request.url.path().to_string();
        self.calls.lock().unwrap().push(RecordedCall {
            method: request.method,
            path: path.clone(),
            query: request.url.query().map(str::to_string),
        });

        let mut scripted = self.scripted.lock().unwrap();
        if let Some((_, _, queue)) = scripted
            .iter_mut()
            .find(|(m, p, _)| *m == request.method && *p == path)
        {
            let (status, body) = if queue.len() > 1 {
                queue.pop_front().unwrap()
            } else {
                queue.front().cloned().unwrap()
            };
            return Ok(json_response(status, &body));
        }

        let body = serde_json::json!({
            "error": {
                "code": 404,
                "message": format!("File not found: {}", path),
                "errors": [{"reason": "notFound"}]
            }
        });
        Ok(json_response(404, &body))
    }
}

fn json_response(status: u16, body: &serde_json::Value) -> HttpResponse {
    HttpResponse::new(
        StatusCode::from_u16(status).expect("valid status"),
        HeaderMap::new(),
        Bytes::from(serde_json::to_vec(body).expect("serializable body")),
    )
}
