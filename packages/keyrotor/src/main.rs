//! `keyrotor` binary

use clap::Parser;
use keyrotor::cli::{Cli, run};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "keyrotor failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
