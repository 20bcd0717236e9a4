//! Binary crate for the `weather` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Human-friendly output formatting and the prompt loop

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod render;
mod session;

fn main() -> ExitCode {
    // Diagnostics go to stderr so they never mix with the forecast on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cmd = cli::Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            println!("Error: failed to start async runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(cmd.run());

    // An interrupted prompt leaves a stdin read on the blocking pool; do not wait for it.
    runtime.shutdown_background();
    code
}
