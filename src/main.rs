//! # tracefox - Main Entry Point
//!
//! Thin caller boundary around the conversion engine: parse arguments,
//! start the async runtime, run the conversion, map errors to exit codes.

use anyhow::{Context, Result};
use clap::Parser;

use tracefox::cli::Args;
use tracefox::convert::convert_trace;
use tracefox::domain::ConvertError;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ConvertError>() {
        Some(ConvertError::ContainerNotFound { .. }) => EXIT_USAGE,
        _ => EXIT_ERROR,
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(convert_trace(&args.input, args.run, args.app.as_deref(), &args.output))?;

    println!("wrote {}", args.output.display());
    Ok(())
}
