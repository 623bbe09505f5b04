//! Normalized successful prediction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Successful service response after classification.
///
/// Only `summary` is guaranteed; the richer fields are present when the
/// service supplied them in a usable shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReport {
    /// Human-readable analysis / forecast
    pub summary: String,

    /// Category label as sent by the service ("Good", "Moderate", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_quality: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pollutants: Option<Pollutants>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
}

impl AirQualityReport {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            air_quality: None,
            pollutants: None,
            recommendations: Vec::new(),
        }
    }

    pub fn category(&self) -> Option<AirQualityCategory> {
        self.air_quality.as_deref().map(AirQualityCategory::from_label)
    }
}

/// Pollutant concentrations in µg/m³
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pollutants {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm25: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm10: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub o3: Option<f64>,
}

impl Pollutants {
    pub const UNIT: &'static str = "µg/m³";

    /// (display label, value) in display order
    pub fn readings(&self) -> [(&'static str, Option<f64>); 4] {
        [
            ("PM2.5", self.pm25),
            ("PM10", self.pm10),
            ("NO₂", self.no2),
            ("O₃", self.o3),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.readings().iter().all(|(_, v)| v.is_none())
    }
}

/// Coarse bucket used to pick a presentation colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirQualityCategory {
    Good,
    Moderate,
    /// Anything that is neither Good nor Moderate
    Poor,
}

impl AirQualityCategory {
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.eq_ignore_ascii_case("good") {
            AirQualityCategory::Good
        } else if label.eq_ignore_ascii_case("moderate") {
            AirQualityCategory::Moderate
        } else {
            AirQualityCategory::Poor
        }
    }
}

impl fmt::Display for AirQualityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AirQualityCategory::Good => write!(f, "good"),
            AirQualityCategory::Moderate => write!(f, "moderate"),
            AirQualityCategory::Poor => write!(f, "poor"),
        }
    }
}
