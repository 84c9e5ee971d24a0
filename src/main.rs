//! graphgen CLI
//!
//! Command-line entry point for the graph generator.

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use graphgen::cli::{commands, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    info!("graphgen v{}", env!("CARGO_PKG_VERSION"));

    match commands::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("[{}] {}", e.error_code(), e);
            for suggestion in e.recovery_suggestions() {
                eprintln!("  hint: {}", suggestion);
            }
            ExitCode::FAILURE
        }
    }
}
