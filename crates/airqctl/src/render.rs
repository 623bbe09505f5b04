//! Text rendering of the request state.
//!
//! Pure: takes a `RequestState`, returns a string. Colour is optional so the
//! output can be asserted on in tests and piped without escape codes.

use airq_common::{AirQualityCategory, AirQualityReport, FailureInfo, Pollutants, Query, RequestState};
use airq_shared::{DATA_SOURCE_NOTE, EXAMPLE_QUERIES};
use owo_colors::OwoColorize;
use std::fmt::Write;

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn render(&self, state: &RequestState) -> String {
        match state {
            RequestState::Idle => String::new(),
            RequestState::Submitting { .. } => format!("{}\n", self.dim("Processing...")),
            RequestState::Succeeded { query, report } => self.report(query, report),
            RequestState::Failed { failure, .. } => self.failure(failure),
        }
    }

    /// Title block shown when the prompt opens
    pub fn banner(&self) -> String {
        format!(
            "{}\n{}\n",
            self.heading(&format!("Sheffield Air{}AI", self.accent("Quality"))),
            self.dim("Ask about pollution in Sheffield and get AI-powered insights and predictions")
        )
    }

    pub fn examples(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.dim("Try:"));
        for example in EXAMPLE_QUERIES {
            let _ = writeln!(out, "  \"{}\"", example);
        }
        out
    }

    fn report(&self, query: &Query, report: &AirQualityReport) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "{}", self.accent("AI Response"));
        let _ = writeln!(out, "Based on your query: \"{}\"", self.highlight(query.as_str()));
        let _ = writeln!(out);

        let _ = writeln!(out, "{}", self.heading("Analysis"));
        let _ = writeln!(out, "  {}", report.summary);

        if report.air_quality.is_some() || report.pollutants.is_some() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", self.heading("Current Status"));
            if let (Some(label), Some(category)) = (&report.air_quality, report.category()) {
                let _ = writeln!(out, "  Air Quality Index: {}", self.category(label, category));
            }
            if let Some(pollutants) = &report.pollutants {
                self.pollutants(&mut out, pollutants);
            }
        }

        if !report.recommendations.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", self.heading("Recommendations"));
            for rec in &report.recommendations {
                let _ = writeln!(out, "  {} {}", self.accent("✓"), rec);
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.dim(DATA_SOURCE_NOTE));
        out
    }

    fn pollutants(&self, out: &mut String, pollutants: &Pollutants) {
        for (label, value) in pollutants.readings() {
            let value = match value {
                Some(v) => format!("{}", v),
                None => "-".to_string(),
            };
            let _ = writeln!(
                out,
                "  {:<6} {:>6} {}",
                label,
                value,
                self.dim(Pollutants::UNIT)
            );
        }
    }

    fn failure(&self, failure: &FailureInfo) -> String {
        format!("{} {}\n", self.error("Error:"), failure.message)
    }

    // ------------------------------------------------------------------------
    // Styling
    // ------------------------------------------------------------------------

    fn category(&self, label: &str, category: AirQualityCategory) -> String {
        if !self.color {
            return label.to_string();
        }
        match category {
            AirQualityCategory::Good => label.bright_green().bold().to_string(),
            AirQualityCategory::Moderate => label.bright_yellow().bold().to_string(),
            AirQualityCategory::Poor => label.bright_red().bold().to_string(),
        }
    }

    fn heading(&self, text: &str) -> String {
        self.style(text, |t| t.bold().to_string())
    }

    fn accent(&self, text: &str) -> String {
        self.style(text, |t| t.bright_green().to_string())
    }

    fn highlight(&self, text: &str) -> String {
        self.style(text, |t| t.green().to_string())
    }

    fn dim(&self, text: &str) -> String {
        self.style(text, |t| t.dimmed().to_string())
    }

    fn error(&self, text: &str) -> String {
        self.style(text, |t| t.bright_red().bold().to_string())
    }

    fn style(&self, text: &str, paint: impl Fn(&str) -> String) -> String {
        if self.color {
            paint(text)
        } else {
            text.to_string()
        }
    }
}
