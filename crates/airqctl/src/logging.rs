//! Tracing setup for airqctl
//!
//! Logs go to stderr so stdout stays clean for answers and `--json`.
//! `$AIRQ_LOG` takes an `EnvFilter` directive; `--verbose` forces debug.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "AIRQ_LOG";

const DEFAULT_LEVEL: &str = "warn";
const VERBOSE_LEVEL: &str = "debug";

pub fn filter(verbose: bool) -> EnvFilter {
    select_filter(verbose, std::env::var(LOG_ENV).ok())
}

/// `--verbose` wins, then a parseable `$AIRQ_LOG`, then the default
fn select_filter(verbose: bool, directive: Option<String>) -> EnvFilter {
    if verbose {
        return EnvFilter::new(VERBOSE_LEVEL);
    }
    directive
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LEVEL))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
