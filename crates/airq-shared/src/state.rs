//! Request lifecycle state and normalized failures.

use crate::query::Query;
use crate::report::AirQualityReport;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one request: a report or a normalized failure
pub type QueryOutcome = Result<AirQualityReport, FailureInfo>;

/// Coarse failure cause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureCause {
    /// No response obtainable (unreachable, reset, timeout)
    Transport,
    /// Service answered with a non-success status
    Http { status: u16 },
    /// Success status but the body failed shape validation
    MalformedResponse,
    Unknown,
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Transport => write!(f, "transport error"),
            FailureCause::Http { status } => write!(f, "HTTP {}", status),
            FailureCause::MalformedResponse => write!(f, "malformed response"),
            FailureCause::Unknown => write!(f, "unknown error"),
        }
    }
}

/// Normalized failure carried by [`RequestState::Failed`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct FailureInfo {
    pub cause: FailureCause,
    pub message: String,
}

impl FailureInfo {
    pub fn new(cause: FailureCause, message: impl Into<String>) -> Self {
        Self {
            cause,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FailureCause::Transport, message)
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::new(FailureCause::Http { status }, message)
    }

    pub fn malformed() -> Self {
        Self::new(
            FailureCause::MalformedResponse,
            crate::classify::UNEXPECTED_RESPONSE_FORMAT,
        )
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(FailureCause::Unknown, message)
    }
}

/// The single value presentation code renders from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RequestState {
    #[default]
    Idle,
    Submitting {
        query: Query,
    },
    Succeeded {
        query: Query,
        report: AirQualityReport,
    },
    Failed {
        query: Query,
        failure: FailureInfo,
    },
}

impl RequestState {
    /// Terminal state for `query` given its outcome
    pub fn resolved(query: Query, outcome: QueryOutcome) -> Self {
        match outcome {
            Ok(report) => RequestState::Succeeded { query, report },
            Err(failure) => RequestState::Failed { query, failure },
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, RequestState::Submitting { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestState::Succeeded { .. } | RequestState::Failed { .. }
        )
    }

    /// Query owned by the current state, if any
    pub fn query(&self) -> Option<&Query> {
        match self {
            RequestState::Idle => None,
            RequestState::Submitting { query }
            | RequestState::Succeeded { query, .. }
            | RequestState::Failed { query, .. } => Some(query),
        }
    }

    pub fn report(&self) -> Option<&AirQualityReport> {
        match self {
            RequestState::Succeeded { report, .. } => Some(report),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureInfo> {
        match self {
            RequestState::Failed { failure, .. } => Some(failure),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::Submitting { .. } => "submitting",
            RequestState::Succeeded { .. } => "succeeded",
            RequestState::Failed { .. } => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(text: &str) -> Query {
        Query::parse(text).unwrap()
    }

    #[test]
    fn test_resolved_maps_outcome() {
        let ok = RequestState::resolved(q("a"), Ok(AirQualityReport::new("fine")));
        assert_eq!(ok.label(), "succeeded");
        assert_eq!(ok.report().unwrap().summary, "fine");

        let err = RequestState::resolved(q("a"), Err(FailureInfo::http(503, "down")));
        assert_eq!(err.failure().unwrap().cause, FailureCause::Http { status: 503 });
        assert!(err.is_terminal());
        assert!(!err.is_submitting());
    }

    #[test]
    fn test_query_accessor() {
        assert!(RequestState::Idle.query().is_none());
        let s = RequestState::Submitting { query: q("test") };
        assert_eq!(s.query().unwrap().as_str(), "test");
        assert!(!s.is_terminal());
    }

    #[test]
    fn test_state_json_is_tagged() {
        let state = RequestState::Failed {
            query: q("test"),
            failure: FailureInfo::http(503, "service unavailable"),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["query"], "test");
        assert_eq!(json["failure"]["cause"]["kind"], "http");
        assert_eq!(json["failure"]["cause"]["status"], 503);
        assert_eq!(json["failure"]["message"], "service unavailable");
    }

    #[test]
    fn test_failure_display_is_message() {
        let failure = FailureInfo::transport("connection refused");
        assert_eq!(failure.to_string(), "connection refused");
        assert_eq!(FailureInfo::malformed().message, "unexpected response format");
        assert_eq!(FailureCause::Http { status: 404 }.to_string(), "HTTP 404");
    }
}
