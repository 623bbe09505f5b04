//! airqctl - ask the Sheffield air-quality service from the terminal.

use airqctl::cli::Cli;
use airqctl::{commands, logging};
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    commands::run(&cli).await
}
