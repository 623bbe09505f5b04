//! Error types for airq.
//!
//! These cover infrastructure problems (config, endpoint, client setup).
//! Request outcomes are never errors: they are data, see [`crate::FailureInfo`].

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AirqError {
    #[error("Query is empty after trimming")]
    EmptyQuery,

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AirqError {
    pub fn config(msg: impl Into<String>) -> Self {
        AirqError::Config(msg.into())
    }

    pub fn invalid_endpoint(endpoint: &str, reason: impl Into<String>) -> Self {
        AirqError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }
}
