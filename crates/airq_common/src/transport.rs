//! Transport abstraction
//!
//! [`QueryClient`](crate::client::QueryClient) talks to the prediction service
//! through a [`Transport`] so the same client drives:
//! - `HttpTransport` - the live service over reqwest
//! - `FakeTransport` - scripted responses for tests
//! - `DemoTransport` (see `demo.rs`) - the canned Sheffield forecast
//!
//! A transport only moves bytes. Status and body interpretation belong to the
//! client.

use airq_shared::{AirqError, QueryRequest};
use async_trait::async_trait;
use reqwest::Url;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

use crate::config::ClientConfig;

/// Status and body of whatever the service answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// No response could be obtained
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Connection refused, reset, DNS failure, body cut short...
    #[error("{0}")]
    Request(String),

    /// The transport itself misbehaved (not a network condition)
    #[error("{0}")]
    Internal(String),
}

// ============================================================================
// Transport Trait
// ============================================================================

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request. Exactly one attempt, no retry.
    async fn post_query(&self, request: &QueryRequest) -> Result<RawResponse, TransportError>;

    /// Short description for logs ("POST http://...", "demo")
    fn describe(&self) -> String;
}

// ============================================================================
// HTTP Transport (Production)
// ============================================================================

pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
    timeout_secs: u64,
}

impl HttpTransport {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, AirqError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AirqError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            timeout_secs: timeout.as_secs(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, AirqError> {
        config.validate()?;
        Self::new(config.endpoint_url()?, config.timeout())
    }

    fn map_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(self.timeout_secs)
        } else if e.is_builder() {
            TransportError::Internal(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_query(&self, request: &QueryRequest) -> Result<RawResponse, TransportError> {
        debug!(endpoint = %self.endpoint, "POST query");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.map_error(e))?;

        debug!(status, bytes = body.len(), "Response received");
        Ok(RawResponse { status, body })
    }

    fn describe(&self) -> String {
        format!("POST {}", self.endpoint)
    }
}

// ============================================================================
// Fake Transport (Testing)
// ============================================================================

/// Scripted transport.
///
/// Responses are handed out in order; the last one repeats once the script
/// runs out. An empty script answers with `TransportError::Internal`.
pub struct FakeTransport {
    responses: Mutex<Vec<Result<RawResponse, TransportError>>>,
    requests: Mutex<Vec<QueryRequest>>,
    latency: Duration,
}

impl FakeTransport {
    pub fn new(responses: Vec<Result<RawResponse, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            latency: Duration::ZERO,
        }
    }

    /// Always answer `status` with `body`
    pub fn always(status: u16, body: impl Into<String>) -> Self {
        Self::new(vec![Ok(RawResponse::new(status, body))])
    }

    /// Always answer 200 with `json` as body
    pub fn always_json(json: serde_json::Value) -> Self {
        Self::always(200, json.to_string())
    }

    /// Always fail before any response
    pub fn always_error(error: TransportError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Delay every answer by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    /// Every request seen so far, oldest first
    pub fn requests(&self) -> Vec<QueryRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn next_response(&self) -> Result<RawResponse, TransportError> {
        let mut responses = self
            .responses
            .lock()
            .map_err(|_| TransportError::Internal("fake transport poisoned".to_string()))?;

        match responses.len() {
            0 => Err(TransportError::Internal("no scripted response".to_string())),
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn post_query(&self, request: &QueryRequest) -> Result<RawResponse, TransportError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        // Picked at send time so concurrent requests keep script order
        let response = self.next_response();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        response
    }

    fn describe(&self) -> String {
        "fake".to_string()
    }
}
