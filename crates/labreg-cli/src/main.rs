//! # labreg CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use labreg_cli::check::{run_check, CheckArgs};
use labreg_cli::examples::{run_examples, ExamplesArgs};
use labreg_cli::openapi::{run_openapi, OpenapiArgs};

/// Laboratory registry tooling.
///
/// Exports the API's OpenAPI document and inspects the validation schemas
/// that drive it.
#[derive(Parser, Debug)]
#[command(name = "labreg", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the OpenAPI document.
    Openapi(OpenapiArgs),

    /// Print synthesized invalid data and validation-error examples for a schema.
    Examples(ExamplesArgs),

    /// Validate a document against a schema.
    Check(CheckArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Openapi(args) => run_openapi(&args),
        Commands::Examples(args) => run_examples(&args),
        Commands::Check(args) => run_check(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
