//! `allotment` command line: loads `allotment.toml`, then runs `allocate` or
//! `verify`. Exits with status 1 on any failure, after logging the error chain.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::PathBuf;
use std::process::ExitCode;

use allotment::commands;
use allotment::{AllotmentConfig, DEFAULT_CONFIG_FILE};
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "allotment")]
#[command(about = "Deterministic NFT allocation to eligible wallets from a public seed")]
#[command(version)]
struct Cli {
    /// Run configuration (TOML)
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log filter, e.g. `info` or `allotment_core=debug`
    #[arg(long, default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Allocate the asset pool and write the allocation file
    Allocate,
    /// Check that a published allocation reproduces from the seed
    Verify {
        /// Allocation file to check (defaults to the configured output file)
        #[arg(long)]
        allocation: Option<PathBuf>,
    },
}

fn execute(cli: &Cli) -> anyhow::Result<()> {
    let config = AllotmentConfig::load(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;

    match &cli.command {
        Command::Allocate => {
            commands::allocate(&config)?;
        }
        Command::Verify { allocation } => {
            commands::verify(&config, allocation.as_deref())?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log))
        .init();

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
