//! `keyrotor` command-line interface

use crate::config::ServiceConfig;
use crate::context::KeyService;
use crate::error::{Result, ServiceError};
use crate::logging;
use crate::signing::TokenRequest;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "keyrotor")]
#[command(about = "Short-lived ES256 tokens with rotating signing keys")]
pub struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Key directory (overrides config and KEYROTOR_KEYS_DIR)
    #[arg(long, global = true)]
    pub keys_dir: Option<PathBuf>,

    /// What to do
    #[command(subcommand)]
    pub command: Commands,
}

/// `keyrotor` subcommands. `serve` and `rotate` take the key directory's
/// writer lock; the rest only read it.
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Load or create the key pair and rotate on schedule until Ctrl-C
    Serve,

    /// Rotate the key pair once
    Rotate,

    /// Show rotation status
    Status,

    /// Print the public JWK set
    Jwks,

    /// Issue a token signed by the current primary key
    Token {
        /// Subject (calling service)
        #[arg(long)]
        sub: String,
        /// Audience
        #[arg(long)]
        aud: String,
        /// Scope identifiers, comma separated
        #[arg(long, value_delimiter = ',')]
        scp: Vec<i64>,
    },

    /// Validate a token against the active keys
    Verify {
        /// Compact JWS
        token: String,
    },
}

impl Cli {
    /// Effective configuration: file and environment, then flags.
    pub fn load_config(&self) -> Result<ServiceConfig> {
        let mut config = ServiceConfig::load(self.config.as_deref())?;
        if let Some(dir) = &self.keys_dir {
            config.storage.directory = dir.clone();
        }
        Ok(config)
    }
}

/// Parse-free entry point; returns the process exit code.
pub async fn run(cli: Cli) -> Result<ExitCode> {
    let config = cli.load_config()?;
    logging::init(&config.logging.level);

    match cli.command {
        Commands::Serve => serve(KeyService::bootstrap(config)?).await,
        Commands::Rotate => {
            let response = KeyService::bootstrap(config)?.rotate_now()?;
            print_json(&response)?;
            Ok(if response.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        command => inspect(KeyService::open_read_only(config)?, command),
    }
}

/// Commands that only read the key directory.
fn inspect(service: KeyService, command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Status => {
            print_json(&service.status())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Jwks => {
            println!("{}", service.publisher().to_json()?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Token { sub, aud, scp } => {
            let issued = service.issuer().issue(&TokenRequest { sub, aud, scp })?;
            print_json(&issued)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Verify { token } => {
            let verification = service.issuer().validate(&token);
            print_json(&verification)?;
            Ok(if verification.is_valid() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Serve | Commands::Rotate => Err(ServiceError::ReadOnly {
            path: service.config().storage.directory.clone(),
        }),
    }
}

async fn serve(service: KeyService) -> Result<ExitCode> {
    let pair = service.manager().all_verification_keys();
    info!(
        primary = pair.primary().key_id(),
        secondary = pair.secondary().key_id(),
        "Key service ready"
    );

    let rotation = service.start_rotation()?;
    let shutdown = tokio::signal::ctrl_c().await;
    rotation.stop();

    match shutdown {
        Ok(()) => {
            info!("Shutting down");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(error = %e, "Cannot listen for shutdown signal");
            Err(ServiceError::Io(e))
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
