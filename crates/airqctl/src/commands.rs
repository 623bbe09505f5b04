//! Command handlers
//!
//! airqctl is the presentation side: it owns the raw input text, hands it to
//! the state machine and renders whatever state comes back. While a query is
//! in flight the spinner follows the state channel, and Ctrl-C abandons the
//! submission.

use airq_common::{Ignored, QueryClient, QueryStateMachine, RequestState, SubmitOutcome};
use anyhow::{Context, Result};
use std::future::Future;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::render::Renderer;
use crate::spinner::Spinner;

/// Process exit status: 0 answered, 1 failed or cancelled, 2 blank query
pub fn exit_status(outcome: &SubmitOutcome) -> u8 {
    match outcome {
        SubmitOutcome::Applied(RequestState::Succeeded { .. }) => 0,
        SubmitOutcome::Ignored(Ignored::Empty) => 2,
        _ => 1,
    }
}

pub async fn run(cli: &Cli) -> Result<ExitCode> {
    let renderer = Renderer::new(!cli.no_color && io::stdout().is_terminal());

    if cli.command == Commands::Examples {
        print!("{}", renderer.examples());
        return Ok(ExitCode::SUCCESS);
    }

    let config = cli.client_config().context("Invalid client configuration")?;
    debug!(?config, "Client configuration");
    let client = QueryClient::from_config(&config).context("Cannot set up prediction client")?;
    debug!(transport = %client.describe(), "Prediction client ready");

    let session = Session {
        machine: Arc::new(QueryStateMachine::new(client)),
        renderer,
        json: cli.json,
        interactive: io::stdout().is_terminal() && !cli.json,
    };

    match &cli.command {
        Commands::Ask { query } => {
            let outcome = session.ask(&query.join(" ")).await?;
            Ok(ExitCode::from(exit_status(&outcome)))
        }
        Commands::Repl => {
            session.repl().await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Examples => Ok(ExitCode::SUCCESS),
    }
}

pub struct Session {
    pub machine: Arc<QueryStateMachine>,
    pub renderer: Renderer,
    pub json: bool,
    /// Animate the spinner and honour Ctrl-C
    pub interactive: bool,
}

impl Session {
    /// Submit one query, wait for it, print the result
    pub async fn ask(&self, text: &str) -> Result<SubmitOutcome> {
        let outcome = self.submit_and_watch(text).await;
        self.print(&outcome)?;
        Ok(outcome)
    }

    /// Read queries from stdin until `quit`, `exit`, EOF or Ctrl-C
    pub async fn repl(&self) -> Result<()> {
        // Once a query has listened for Ctrl-C the default handler is gone,
        // so the prompt has to watch for it too.
        self.repl_from(BufReader::new(tokio::io::stdin()), tokio::signal::ctrl_c)
            .await
    }

    /// Prompt loop over any line source; `interrupt` ends it between queries
    pub async fn repl_from<R, I, F>(&self, input: R, mut interrupt: I) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        I: FnMut() -> F,
        F: Future<Output = io::Result<()>>,
    {
        print!("{}", self.renderer.banner());
        print!("{}", self.renderer.examples());

        let mut lines = input.lines();
        loop {
            print!("\n> ");
            io::stdout().flush()?;

            let line = tokio::select! {
                biased;
                _ = interrupt() => {
                    println!();
                    None
                }
                line = lines.next_line() => line?,
            };
            let Some(line) = line else {
                break;
            };
            if matches!(line.trim(), "quit" | "exit") {
                break;
            }
            self.ask(&line).await?;
        }
        Ok(())
    }

    /// `submit`, with a spinner while `Submitting`; Ctrl-C abandons the query
    pub async fn submit_and_watch(&self, text: &str) -> SubmitOutcome {
        let spinner = (!self.json)
            .then(|| Spinner::follow(self.machine.subscribe(), "Processing...", self.interactive));

        let submit = self.machine.submit(text);
        let outcome = if self.interactive {
            tokio::select! {
                outcome = submit => outcome,
                // Dropping `submit` abandons the submission
                _ = tokio::signal::ctrl_c() => SubmitOutcome::Discarded,
            }
        } else {
            submit.await
        };

        if let Some(spinner) = spinner {
            if let Some(elapsed) = spinner.stop().await {
                debug!(elapsed_ms = elapsed.as_millis() as u64, "Query finished");
            }
        }
        outcome
    }

    fn print(&self, outcome: &SubmitOutcome) -> Result<()> {
        if self.json {
            let value = match outcome {
                SubmitOutcome::Applied(state) => serde_json::to_value(state)?,
                SubmitOutcome::Ignored(reason) => {
                    serde_json::json!({ "state": "ignored", "reason": reason.to_string() })
                }
                SubmitOutcome::Discarded => serde_json::to_value(self.machine.state())?,
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
            return Ok(());
        }

        match outcome {
            SubmitOutcome::Applied(state) => print!("{}", self.renderer.render(state)),
            SubmitOutcome::Ignored(Ignored::Busy) => println!("A query is already in progress."),
            // Blank input behaves like a disabled submit button: nothing to show
            SubmitOutcome::Ignored(Ignored::Empty) => {}
            SubmitOutcome::Discarded => println!("Cancelled."),
        }
        Ok(())
    }
}
