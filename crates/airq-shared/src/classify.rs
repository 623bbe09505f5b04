//! Response classification
//!
//! Turns a decoded (but untyped) success body into either an
//! [`AirQualityReport`] or a `MalformedResponse` failure.
//!
//! The mandatory envelope is a typed parse: the payload must be a JSON object
//! with a string `summary`. The category is also accepted under its older
//! spelling `airQuality`.
//!
//! Optional fields are parsed one by one. A field that is present but has the
//! wrong shape is dropped with a warning; it never fails the classification.

use crate::report::{AirQualityReport, Pollutants};
use crate::state::{FailureInfo, QueryOutcome};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

/// Fixed diagnostic for any body that does not carry a usable summary
pub const UNEXPECTED_RESPONSE_FORMAT: &str = "unexpected response format";

/// Mandatory part of a success body
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    summary: Option<String>,
}

/// Classify a decoded success body.
pub fn classify(payload: &Value) -> QueryOutcome {
    let Value::Object(fields) = payload else {
        return Err(FailureInfo::malformed());
    };

    let summary = Envelope::deserialize(payload)
        .ok()
        .and_then(|envelope| envelope.summary);

    let Some(summary) = summary else {
        return Err(FailureInfo::malformed());
    };

    Ok(AirQualityReport {
        summary,
        air_quality: optional_field(fields, &["air_quality", "airQuality"]),
        pollutants: optional_field::<Pollutants>(fields, &["pollutants"])
            .filter(|p| !p.is_empty()),
        recommendations: optional_field(fields, &["recommendations"]).unwrap_or_default(),
    })
}

/// First key present (and non-null) wins; a shape mismatch drops the field.
fn optional_field<T: DeserializeOwned>(fields: &Map<String, Value>, keys: &[&str]) -> Option<T> {
    let (key, value) = keys
        .iter()
        .find_map(|k| fields.get(*k).filter(|v| !v.is_null()).map(|v| (*k, v)))?;

    match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(field = key, error = %e, "Dropping optional response field with unexpected shape");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FailureCause;
    use serde_json::json;

    #[test]
    fn test_summary_only_is_valid() {
        let report = classify(&json!({"summary": "Moderate, improving over 24h"})).unwrap();
        assert_eq!(report.summary, "Moderate, improving over 24h");
        assert!(report.air_quality.is_none());
        assert!(report.pollutants.is_none());
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let report = classify(&json!({
            "summary": "ok",
            "model": "v2",
            "confidence": 0.8,
            "extra": {"nested": [1, 2, 3]}
        }))
        .unwrap();
        assert_eq!(report.summary, "ok");
    }

    #[test]
    fn test_missing_summary_is_malformed() {
        let failure = classify(&json!({"air_quality": "Good"})).unwrap_err();
        assert_eq!(failure.cause, FailureCause::MalformedResponse);
        assert_eq!(failure.message, UNEXPECTED_RESPONSE_FORMAT);
    }

    #[test]
    fn test_wrong_type_summary_is_malformed() {
        for payload in [
            json!({"summary": 42}),
            json!({"summary": null}),
            json!({"summary": ["a"]}),
            json!({"summary": {"text": "a"}}),
        ] {
            let failure = classify(&payload).unwrap_err();
            assert_eq!(failure.cause, FailureCause::MalformedResponse, "{payload}");
        }
    }

    #[test]
    fn test_non_object_payloads_are_malformed() {
        for payload in [
            Value::Null,
            json!("summary"),
            json!(["a summary"]),
            json!(17),
            json!(true),
        ] {
            assert!(classify(&payload).is_err(), "{payload}");
        }
    }

    #[test]
    fn test_full_payload() {
        let report = classify(&json!({
            "summary": "Improving as wind picks up",
            "air_quality": "Moderate",
            "pollutants": {"pm25": 12.3, "pm10": 24.7, "no2": 38.2, "o3": 42.1},
            "recommendations": ["Take the bus", "Keep windows closed 7-9am"]
        }))
        .unwrap();

        assert_eq!(report.air_quality.as_deref(), Some("Moderate"));
        let p = report.pollutants.unwrap();
        assert_eq!(p.pm25, Some(12.3));
        assert_eq!(p.o3, Some(42.1));
        assert_eq!(report.recommendations.len(), 2);
    }

    #[test]
    fn test_camel_case_air_quality_accepted() {
        let report = classify(&json!({
            "summary": "Expected to improve",
            "airQuality": "Good"
        }))
        .unwrap();
        assert_eq!(report.air_quality.as_deref(), Some("Good"));
    }

    #[test]
    fn test_prediction_is_not_a_summary() {
        for payload in [
            json!({"prediction": "Expected to improve", "airQuality": "Good"}),
            json!({"summary": null, "prediction": "y"}),
            json!({"prediction": 5}),
        ] {
            let failure = classify(&payload).unwrap_err();
            assert_eq!(failure.cause, FailureCause::MalformedResponse, "{payload}");
            assert_eq!(failure.message, UNEXPECTED_RESPONSE_FORMAT);
        }
    }

    #[test]
    fn test_stray_prediction_field_ignored() {
        let report = classify(&json!({"summary": "new", "prediction": "old"})).unwrap();
        assert_eq!(report.summary, "new");
    }

    #[test]
    fn test_bad_optional_fields_dropped() {
        let report = classify(&json!({
            "summary": "ok",
            "air_quality": 3,
            "pollutants": "high",
            "recommendations": [1, 2]
        }))
        .unwrap();
        assert_eq!(report.summary, "ok");
        assert!(report.air_quality.is_none());
        assert!(report.pollutants.is_none());
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_empty_pollutant_object_dropped() {
        let report = classify(&json!({"summary": "ok", "pollutants": {}})).unwrap();
        assert!(report.pollutants.is_none());
    }
}
