//! Shared types for the Sheffield air-quality query client.
//!
//! Data model, wire types and response classification used by both the
//! client library (`airq_common`) and the CLI (`airqctl`).

pub mod classify;
pub mod error;
pub mod query;
pub mod report;
pub mod state;

pub use classify::{classify, UNEXPECTED_RESPONSE_FORMAT};
pub use error::AirqError;
pub use query::{Query, QueryRequest};
pub use report::{AirQualityCategory, AirQualityReport, Pollutants};
pub use state::{FailureCause, FailureInfo, QueryOutcome, RequestState};

/// Example prompts shown next to the input field
pub const EXAMPLE_QUERIES: &[&str] = &[
    "How is the air quality in Sheffield city center today?",
    "What's the pollution forecast for tomorrow?",
];

/// Attribution line rendered under every report
pub const DATA_SOURCE_NOTE: &str = "Data sourced from Sheffield City Council's air quality monitoring \
     stations and the UK's Department for Environment, Food and Rural Affairs (DEFRA).";
