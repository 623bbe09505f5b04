//! Command line surface

use airq_common::{AirqError, ClientConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "airqctl")]
#[command(about = "Sheffield AirQuality AI - ask about pollution in Sheffield and get predictions", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Prediction service URL (overrides config and $AIRQ_ENDPOINT)
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Use the built-in demo forecast instead of the live service
    #[arg(long, global = true)]
    pub demo: bool,

    /// Print the final request state as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: <config dir>/airq/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable colours
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Ask one question and print the answer
    Ask {
        /// The question, e.g. "How is the air quality in Sheffield city center today?"
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Interactive prompt; `quit` or Ctrl-D to leave
    Repl,

    /// Show example questions
    Examples,
}

impl Cli {
    /// Config file + environment, then command line flags on top
    pub fn client_config(&self) -> Result<ClientConfig, AirqError> {
        let mut config = ClientConfig::load(self.config.as_deref())?;
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut ClientConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }
        if self.demo {
            config.demo = true;
        }
    }
}
