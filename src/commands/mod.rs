//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `depot-sync` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `depot_sync` library.
//!
//! The options shared by `sync` and `build` live in [`ConfigArgs`] here.

pub mod build;
pub mod inspect;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use depot_sync::config::{RawConfig, SyncConfig};

/// Options that select the source, the destination and the output format.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// YAML file providing defaults for the options below.
    #[arg(long, value_name = "FILE", env = "DEPOT_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Repository whose releases are scanned (defaults to --repo).
    #[arg(long, value_name = "OWNER/REPO", env = "DEPOT_SYNC_SOURCE_REPO")]
    pub source_repo: Option<String>,

    /// Repository the depots are published to.
    #[arg(long, value_name = "OWNER/REPO", env = "DEPOT_SYNC_REPO")]
    pub repo: Option<String>,

    /// Branch of the stable depot.
    #[arg(long, value_name = "BRANCH", env = "DEPOT_SYNC_BRANCH")]
    pub branch: Option<String>,

    /// Path of the stable depot.
    #[arg(long, value_name = "PATH", env = "DEPOT_SYNC_PATH")]
    pub path: Option<String>,

    /// Branch of the beta depot. Empty disables the beta depot.
    #[arg(long, value_name = "BRANCH", env = "DEPOT_SYNC_PRE_RELEASE_BRANCH")]
    pub pre_release_branch: Option<String>,

    /// Path of the beta depot. Set it to --path to publish a single depot.
    #[arg(long, value_name = "PATH", env = "DEPOT_SYNC_PRE_RELEASE_PATH")]
    pub pre_release_path: Option<String>,

    /// Write indented JSON (the default).
    #[arg(
        long,
        value_name = "BOOL",
        env = "DEPOT_SYNC_READABLE",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub readable: Option<bool>,

    /// Write single-line JSON.
    #[arg(long)]
    pub compact: bool,

    /// GitHub token.
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Commit message to use instead of the generated summary.
    #[arg(long, value_name = "MESSAGE", env = "DEPOT_SYNC_MESSAGE")]
    pub message: Option<String>,

    /// Do not log skipped assets.
    #[arg(long)]
    pub quiet_warnings: bool,

    /// Do not report assets that are not templates at all.
    #[arg(long)]
    pub silent_non_templates: bool,

    /// Maximum number of assets downloaded at once.
    #[arg(long, value_name = "N", env = "DEPOT_SYNC_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// GitHub API base URL.
    #[arg(long, value_name = "URL", env = "GITHUB_API_URL")]
    pub api_url: Option<String>,
}

impl ConfigArgs {
    /// The command-line layer. Unset switches stay `None` so the file can set them.
    pub fn into_raw(self) -> RawConfig {
        RawConfig {
            source_repo: self.source_repo,
            repo: self.repo,
            branch: self.branch,
            path: self.path,
            pre_release_branch: self.pre_release_branch,
            pre_release_path: self.pre_release_path,
            readable: if self.compact { Some(false) } else { self.readable },
            message: self.message,
            quiet_warnings: self.quiet_warnings.then_some(true),
            silent_non_templates: self.silent_non_templates.then_some(true),
            concurrency: self.concurrency,
            api_url: self.api_url,
            token: self.token,
        }
    }

    /// Merges the command line over the configuration file.
    pub fn load_raw(mut self) -> Result<RawConfig> {
        let file = match self.config.take() {
            Some(path) => RawConfig::from_file(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => RawConfig::default(),
        };
        Ok(file.overlay(self.into_raw()))
    }

    /// Loads and validates the configuration.
    pub fn load(self) -> Result<SyncConfig> {
        Ok(self.load_raw()?.resolve()?)
    }
}
