//! # Sync Command Implementation
//!
//! This module implements the `sync` subcommand, which runs the whole
//! pipeline: it extracts every template from the source repository's
//! releases, assembles the stable and beta depots and publishes each one to
//! its route in the destination repository.
//!
//! A route whose published content already matches is left alone, so running
//! the command repeatedly without new releases makes no commits. The command
//! exits non-zero if the configuration is invalid, the credential is missing,
//! the destination repository does not exist or any route fails.

use anyhow::Result;
use clap::Args;

use depot_sync::github::GitHubClient;
use depot_sync::output::{emoji, route_line, warning_line, OutputConfig};
use depot_sync::pipeline;

use super::ConfigArgs;

/// Publish the depots
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Execute the `sync` command.
pub fn execute(args: SyncArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let config = args.config.load()?;
    let token = config.require_token()?.to_string();
    let client = GitHubClient::new(&config.api_url, Some(token))?;

    println!(
        "{} Syncing depots from {} to {}",
        emoji(&out, "🔄", "[SYNC]"),
        config.source_repo,
        config.dest_repo
    );
    let report = pipeline::run(&config, &client)?;

    for outcome in &report.outcomes {
        println!("{}", route_line(&out, outcome));
    }
    let skipped = report.extraction_warnings.len();
    if skipped > 0 {
        println!(
            "{}",
            warning_line(&out, &format!("{} asset(s) skipped", skipped))
        );
    }

    report.check()?;
    Ok(())
}
