//! Query client
//!
//! One `execute` call = one outbound request. Every way that request can end
//! is folded into a [`QueryOutcome`]:
//!
//! | what happened                    | outcome                          |
//! |----------------------------------|----------------------------------|
//! | no response (refused, timeout)   | `Failed(Transport)`              |
//! | non-2xx status                   | `Failed(Http(status))`, body text|
//! | 2xx, body is not JSON            | `Failed(MalformedResponse)`      |
//! | 2xx, JSON without string summary | `Failed(MalformedResponse)`      |
//! | 2xx, JSON with string summary    | `Succeeded(report)`              |
//!
//! No retry, no backoff, no caching.

use airq_shared::{classify, AirqError, FailureInfo, Query, QueryOutcome, QueryRequest};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::demo::DemoTransport;
use crate::transport::{HttpTransport, RawResponse, Transport, TransportError};

#[derive(Clone)]
pub struct QueryClient {
    transport: Arc<dyn Transport>,
}

impl QueryClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Live HTTP transport, or the demo transport when `config.demo` is set
    pub fn from_config(config: &ClientConfig) -> Result<Self, AirqError> {
        let transport: Arc<dyn Transport> = if config.demo {
            Arc::new(DemoTransport::new(config.demo_latency()))
        } else {
            Arc::new(HttpTransport::from_config(config)?)
        };
        Ok(Self::new(transport))
    }

    /// Which transport answers queries, for logs
    pub fn describe(&self) -> String {
        self.transport.describe()
    }

    /// Send `query` and classify whatever comes back
    pub async fn execute(&self, query: &Query) -> QueryOutcome {
        let start = Instant::now();
        debug!(transport = %self.transport.describe(), query = %query, "Executing query");

        let outcome = match self.transport.post_query(&QueryRequest::from(query)).await {
            Ok(raw) => interpret_response(raw),
            Err(e) => Err(transport_failure(e)),
        };

        match &outcome {
            Ok(_) => debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Query succeeded"),
            Err(failure) => warn!(
                cause = %failure.cause,
                message = %failure.message,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Query failed"
            ),
        }
        outcome
    }
}

/// Status check, JSON decode, then shape classification
pub fn interpret_response(raw: RawResponse) -> QueryOutcome {
    if !raw.is_success() {
        let message = if raw.body.trim().is_empty() {
            status_description(raw.status)
        } else {
            raw.body
        };
        return Err(FailureInfo::http(raw.status, message));
    }

    match serde_json::from_str::<serde_json::Value>(&raw.body) {
        Ok(payload) => classify(&payload),
        Err(e) => {
            debug!(error = %e, "Success body is not JSON");
            Err(FailureInfo::malformed())
        }
    }
}

fn transport_failure(error: TransportError) -> FailureInfo {
    match error {
        TransportError::Timeout(_) | TransportError::Request(_) => {
            FailureInfo::transport(error.to_string())
        }
        TransportError::Internal(msg) => FailureInfo::unknown(msg),
    }
}

/// "HTTP 503 Service Unavailable", used when the error body is blank
fn status_description(status: u16) -> String {
    match StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
    {
        Some(reason) => format!("HTTP {} {}", status, reason),
        None => format!("HTTP {}", status),
    }
}
