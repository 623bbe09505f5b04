//! Client configuration
//!
//! Lives in `<config_dir>/airq/config.toml` unless `--config` or `$AIRQ_CONFIG`
//! point elsewhere. Resolution order:
//! 1. built-in defaults
//! 2. config file (a missing default file is fine, a missing explicit file is not)
//! 3. `$AIRQ_ENDPOINT`, `$AIRQ_TIMEOUT_SECS`
//! 4. CLI flags (applied by the caller)

use airq_shared::AirqError;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const CONFIG_DIR_NAME: &str = "airq";
const CONFIG_FILE: &str = "config.toml";

pub const ENV_CONFIG: &str = "AIRQ_CONFIG";
pub const ENV_ENDPOINT: &str = "AIRQ_ENDPOINT";
pub const ENV_TIMEOUT_SECS: &str = "AIRQ_TIMEOUT_SECS";

/// Prediction service client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Full URL the query is POSTed to
    pub endpoint: String,

    /// Request timeout; a timed-out request is a transport failure
    pub timeout_secs: u64,

    /// Serve the canned Sheffield forecast instead of calling the service
    pub demo: bool,

    /// Simulated latency of the demo transport
    pub demo_latency_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/predict".to_string(),
            timeout_secs: 30,
            demo: false,
            demo_latency_ms: 1500,
        }
    }
}

impl ClientConfig {
    /// Default config file path, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE))
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, AirqError> {
        toml::from_str(content).map_err(|e| AirqError::config(format!("invalid TOML: {}", e)))
    }

    /// Read a config file
    pub fn from_file(path: &Path) -> Result<Self, AirqError> {
        let content = fs::read_to_string(path).map_err(|source| AirqError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Defaults → file → environment
    pub fn load(explicit: Option<&Path>) -> Result<Self, AirqError> {
        let env_path = std::env::var_os(ENV_CONFIG).map(PathBuf::from);

        let mut config = match explicit.map(Path::to_path_buf).or(env_path) {
            Some(path) => {
                debug!(path = %path.display(), "Loading config");
                Self::from_file(&path)?
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => {
                    debug!(path = %path.display(), "Loading config");
                    Self::from_file(&path)?
                }
                _ => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (injectable for tests)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), AirqError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            self.endpoint = endpoint.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = raw.trim().parse().map_err(|_| {
                AirqError::config(format!("{} must be a whole number of seconds, got '{}'", ENV_TIMEOUT_SECS, raw))
            })?;
        }
        Ok(())
    }

    /// Check the endpoint is an http(s) URL and the timeout is usable
    pub fn validate(&self) -> Result<(), AirqError> {
        self.endpoint_url()?;
        if self.timeout_secs == 0 {
            return Err(AirqError::config("timeout_secs must be greater than 0"));
        }
        Ok(())
    }

    pub fn endpoint_url(&self) -> Result<Url, AirqError> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| AirqError::invalid_endpoint(&self.endpoint, e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(AirqError::invalid_endpoint(
                &self.endpoint,
                format!("unsupported scheme '{}'", other),
            )),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn demo_latency(&self) -> Duration {
        Duration::from_millis(self.demo_latency_ms)
    }
}
