//! Query orchestration for the Sheffield air-quality client.
//!
//! `QueryStateMachine` owns the lifecycle, `QueryClient` performs one request
//! per submission over a pluggable `Transport`, and the shared classifier
//! turns response bodies into reports or failures.

pub mod client;
pub mod config;
pub mod demo;
pub mod state_machine;
pub mod transport;

pub use client::{interpret_response, QueryClient};
pub use config::ClientConfig;
pub use demo::{sheffield_forecast, DemoTransport};
pub use state_machine::{Ignored, QueryStateMachine, SubmitOutcome, Ticket};
pub use transport::{FakeTransport, HttpTransport, RawResponse, Transport, TransportError};

pub use airq_shared::{
    AirQualityCategory, AirQualityReport, AirqError, FailureCause, FailureInfo, Pollutants, Query,
    QueryOutcome, RequestState,
};
