//! # Inspect Command Implementation
//!
//! This module implements the `inspect` subcommand, which runs the manifest
//! parser on a local archive and prints the template it describes as JSON.
//! It is a quick way to check a release asset before uploading it. An
//! archive that is not a valid template makes the command fail with the
//! parser's diagnostic.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use depot_sync::manifest;
use depot_sync::output::{emoji, OutputConfig};

/// Inspect a template archive
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// The zip archive to inspect.
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Location recorded for the template (defaults to the archive path).
    #[arg(long, value_name = "URL")]
    pub source_url: Option<String>,
}

/// Execute the `inspect` command.
pub fn execute(args: InspectArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let bytes = fs::read(&args.archive)
        .with_context(|| format!("Failed to read {}", args.archive.display()))?;
    let source_url = args
        .source_url
        .unwrap_or_else(|| args.archive.display().to_string());

    match manifest::parse(&bytes, &source_url) {
        Ok(descriptor) => {
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {:?}", emoji(&out, "❌", "[ERR]"), e.kind());
            Err(anyhow::anyhow!(
                "{} is not a valid template archive: {}",
                args.archive.display(),
                e
            ))
        }
    }
}
