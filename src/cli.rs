//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;

use crate::commands;

/// Depot Sync - Publish template depots built from GitHub releases
#[derive(Parser, Debug)]
#[command(name = "depot-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the depots from release assets and publish them
    Sync(commands::sync::SyncArgs),

    /// Build the depots without publishing them
    Build(commands::build::BuildArgs),

    /// Parse a local template archive and print its manifest
    Inspect(commands::inspect::InspectArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Sync(args) => commands::sync::execute(args, &self.color),
            Commands::Build(args) => commands::build::execute(args, &self.color),
            Commands::Inspect(args) => commands::inspect::execute(args, &self.color),
        }
    }
}

/// `RUST_LOG` takes precedence over `--log-level`.
fn init_logging(level: &str) {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}
