#![deny(missing_docs)]

//! # Compile Command
//!
//! Reads an OpenAPI document, compiles it, and writes the IR as pretty-printed JSON.

use std::fs;
use std::path::{Path, PathBuf};

use cdd_ir_core::{compile_json, compile_yaml, CompiledApi, CompilerOptions};
use tracing::{debug, info};

use crate::error::{CliError, CliResult};

/// Arguments for the compile command.
#[derive(clap::Args, Debug, Clone)]
pub struct CompileArgs {
    /// Path to the OpenAPI document (`.json` is read as JSON, anything else as YAML).
    pub document: PathBuf,

    /// Compiler options file (YAML, kebab-case keys).
    #[clap(long, env = "CDD_IR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output path for the IR. Defaults to stdout.
    #[clap(short, long)]
    pub output: Option<PathBuf>,
}

/// Executes the compilation.
pub fn execute(args: &CompileArgs) -> CliResult<()> {
    if !args.document.exists() {
        return Err(CliError::General(format!(
            "OpenAPI file not found: {:?}",
            args.document
        )));
    }

    let options = match &args.config {
        Some(path) => CompilerOptions::from_file(path)?,
        None => CompilerOptions::default(),
    };
    debug!(?options, "loaded compiler options");

    let api = compile_file(&args.document, &options)?;
    let json = serde_json::to_string_pretty(&api)?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, json)?;
            info!(output = %path.display(), "wrote IR");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn compile_file(document: &Path, options: &CompilerOptions) -> CliResult<CompiledApi> {
    let text = fs::read_to_string(document)?;
    let is_json = document
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let api = if is_json {
        compile_json(&text, options)?
    } else {
        compile_yaml(&text, options)?
    };
    Ok(api)
}
