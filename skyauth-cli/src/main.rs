//! skyauth CLI tool

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod commands;

use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{ConnectorsCommand, ResolveCommand, TeamCommand};
use skyauth::connectors::ConnectorRegistry;
use skyauth::observability::{self, LogFormat};
use skyauth_cli_lib::flags::{self, FlagSet};

#[derive(Parser)]
#[command(name = "skyauth")]
#[command(version)]
#[command(about = "Resolve identity connector configuration", long_about = None)]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered connectors and their flags
    Connectors(ConnectorsCommand),
    /// Resolve enabled connectors into connector payloads
    Resolve(ResolveCommand),
    /// Build a team's whitelist across connectors
    Team(TeamCommand),
}

fn main() -> Result<()> {
    let registry = ConnectorRegistry::builtin();

    let matches = Cli::command()
        .mut_subcommand("resolve", |cmd| flags::augment(cmd, &registry, FlagSet::Provider))
        .mut_subcommand("team", |cmd| flags::augment(cmd, &registry, FlagSet::Team))
        .get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    observability::init_with(if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    })?;

    let sub = matches
        .subcommand()
        .map(|(_, sub)| sub)
        .context("No command given")?;

    match &cli.command {
        Commands::Connectors(cmd) => cmd.execute(&registry)?,
        Commands::Resolve(cmd) => {
            cmd.execute(&registry, &flags::collect(sub, &registry, FlagSet::Provider))?;
        }
        Commands::Team(cmd) => {
            cmd.execute(&registry, &flags::collect(sub, &registry, FlagSet::Team))?;
        }
    }

    Ok(())
}
