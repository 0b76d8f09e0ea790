//! Command-line entry point for the exporter.

pub mod cli;
pub mod logging;
pub mod start;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

/// Parse arguments, install logging and run the selected command.
pub async fn run() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init(&cli.log_level)?;

    match cli.command {
        Command::Start(args) => start::start(cli.config.as_deref(), &args).await,
    }
}
