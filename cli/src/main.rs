#![deny(missing_docs)]

//! # CDD IR CLI
//!
//! Command Line Interface for the OpenAPI IR compiler.
//!
//! Supported Commands:
//! - `compile`: OpenAPI document -> IR (JSON).
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `cdd_ir_core=info,cdd_ir=info`).

use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;

mod compile;
mod error;

const DEFAULT_LOG_FILTER: &str = "cdd_ir_core=info,cdd_ir=info";

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI to IR compiler")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile an OpenAPI document into the IR.
    Compile(compile::CompileArgs),
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    if tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn main() -> CliResult<()> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Compile(args) => compile::execute(args)?,
    }

    Ok(())
}
