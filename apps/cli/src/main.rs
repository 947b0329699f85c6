//! ContentPilot CLI entry point.
//!
//! Generates articles via Gemini, commits them to the site repository, and
//! keeps the remote content plan in sync.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
