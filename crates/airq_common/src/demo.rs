//! Demo transport: simulated service with a canned Sheffield forecast.
//!
//! Answers every query with the same report after a fixed delay, so the CLI
//! can be exercised without a running prediction service.

use airq_shared::QueryRequest;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::transport::{RawResponse, Transport, TransportError};

/// Canned forecast body served by [`DemoTransport`]
pub fn sheffield_forecast() -> Value {
    json!({
        "air_quality": "Moderate",
        "summary": "Based on current trends and weather patterns, air quality in Sheffield \
                    city center is expected to improve over the next 24 hours as wind speeds \
                    increase from the west.",
        "recommendations": [
            "Consider using public transport instead of driving",
            "Vulnerable individuals should limit outdoor activities during peak traffic hours",
            "Keep windows closed during morning rush hour (7-9am)"
        ],
        "pollutants": {
            "pm25": 12.3,
            "pm10": 24.7,
            "no2": 38.2,
            "o3": 42.1
        }
    })
}

pub struct DemoTransport {
    latency: Duration,
}

impl DemoTransport {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for DemoTransport {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500))
    }
}

#[async_trait]
impl Transport for DemoTransport {
    async fn post_query(&self, request: &QueryRequest) -> Result<RawResponse, TransportError> {
        debug!(query = %request.query, latency_ms = self.latency.as_millis() as u64, "Demo query");
        tokio::time::sleep(self.latency).await;
        Ok(RawResponse::new(200, sheffield_forecast().to_string()))
    }

    fn describe(&self) -> String {
        "demo".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_demo_waits_then_answers() {
        let transport = DemoTransport::default();
        let started = tokio::time::Instant::now();

        let response = transport
            .post_query(&QueryRequest {
                query: "anything".to_string(),
            })
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(1500));
        assert_eq!(response.status, 200);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["air_quality"], "Moderate");
        assert_eq!(body["pollutants"]["no2"], 38.2);
    }

    #[test]
    fn test_forecast_classifies() {
        let report = airq_shared::classify(&sheffield_forecast()).unwrap();
        assert!(report.summary.contains("Sheffield city center"));
        assert_eq!(report.recommendations.len(), 3);
        assert_eq!(report.pollutants.unwrap().pm10, Some(24.7));
    }
}
