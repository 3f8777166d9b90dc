//! # Build Command Implementation
//!
//! This module implements the `build` subcommand. It performs the extraction
//! and assembly half of a sync and writes the depot JSON locally instead of
//! publishing it, which is useful for previewing a change or for hosting the
//! depot somewhere other than a repository branch.
//!
//! Without `--out-dir` the selected track is printed to stdout. With it,
//! every produced track whose route is configured is written to
//! `<out-dir>/<track>.json`.
//!
//! A token is optional; without one the GitHub API applies its lower
//! anonymous rate limit.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use depot_sync::config::SyncConfig;
use depot_sync::depot::{AssembledDepots, Track};
use depot_sync::github::GitHubClient;
use depot_sync::output::{emoji, OutputConfig};
use depot_sync::pipeline;

use super::ConfigArgs;

/// Build the depots locally
#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Write `<track>.json` files into this directory instead of printing.
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Track printed to stdout when no output directory is given.
    #[arg(long, value_name = "TRACK", default_value = "stable", value_parser = ["stable", "beta"])]
    pub track: String,
}

/// Execute the `build` command.
pub fn execute(args: BuildArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    // Building only reads releases, so the source repository is enough.
    let mut raw = args.config.load_raw()?;
    if raw.repo.is_none() {
        raw.repo = raw.source_repo.clone();
    }
    let config = raw.resolve()?;
    let client = GitHubClient::new(&config.api_url, config.token.clone())?;

    let report = pipeline::build(&config, &client)?;

    match args.out_dir {
        Some(dir) => {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            for (track, path, json) in depot_files(&dir, &config, &report.depots) {
                fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!(
                    "{} Wrote {} depot to {}",
                    emoji(&out, "✅", "[OK]"),
                    track,
                    path.display()
                );
            }
        }
        None => {
            let track = if args.track == "beta" {
                Track::Beta
            } else {
                Track::Stable
            };
            if config.routes.get(track).is_none() {
                bail!("The {} route is not configured", track);
            }
            let json = report.depots.get(track).with_context(|| {
                format!(
                    "No {} depot was built: both tracks share the route {}",
                    track, config.routes.stable
                )
            })?;
            println!("{}", json);
        }
    }

    Ok(())
}

/// The `<track>.json` files to write: one per track a sync would publish.
fn depot_files(
    dir: &Path,
    config: &SyncConfig,
    depots: &AssembledDepots,
) -> Vec<(Track, PathBuf, String)> {
    pipeline::plans(config, depots)
        .into_iter()
        .map(|plan| {
            let path = dir.join(format!("{}.json", plan.track));
            (plan.track, path, plan.desired)
        })
        .collect()
}
