//! # modelcheck CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::io;
use std::process::ExitCode;

use clap::Parser;

/// modelcheck: schema validation and serialization for JSON documents.
#[derive(Parser, Debug)]
#[command(name = "modelcheck", version, about)]
struct Cli {
    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Validate an input document against a model and print its dump.
    Validate(modelcheck_cli::validate::ValidateArgs),
    /// Run the patient model walkthrough.
    Demo(modelcheck_cli::demo::DemoArgs),
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::from_default_env();
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }

    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();

    match cli.command {
        Commands::Validate(args) => {
            let outcome = modelcheck_cli::validate::run(&args, &mut stdout, &mut stderr)?;
            Ok(outcome.into())
        }
        Commands::Demo(args) => {
            modelcheck_cli::demo::run(&args, &mut stdout)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
