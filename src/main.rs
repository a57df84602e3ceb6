//! jsoncache - Inspect and edit a directory of cached JSON objects
//!
//! CLI entry point: sets up logging and dispatches to the selected subcommand.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use jsoncache::cli::{self, Cli};

/// Initializes logging to stderr: 0 = warn, 1 = info, 2+ = debug.
/// `RUST_LOG` takes precedence when set.
fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("jsoncache=warn"),
        1 => EnvFilter::new("jsoncache=info"),
        _ => EnvFilter::new("jsoncache=debug"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli::run(&cli, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
