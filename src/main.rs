//! Testbed - keeps a browser-runnable HTML unit test suite in sync with a
//! JavaScript source tree.

mod cli;
mod compose;
mod config;
mod embed;
mod logger;
mod pipeline;
mod rebuild;
mod state;
mod store;
mod suite;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::ProjectConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    state::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = ProjectConfig::load(&cli)?;

    match &cli.command {
        Commands::Serve { .. } => cli::serve::serve(config),
        Commands::Build => cli::build::build(&config),
        Commands::Clean => cli::build::clean(&config),
        Commands::List => cli::list::list(&config),
    }
}
