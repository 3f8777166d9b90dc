//! # Template Extraction
//!
//! Turns the assets of a source repository's releases into
//! [`TemplateDescriptor`]s.
//!
//! ## Process
//!
//! 1.  **Asset Collection (`AssetRef::from_releases`)**: every asset of every
//!     release is a candidate. Releases routinely carry more than templates
//!     (project archives, checksums), so nothing is filtered up front.
//!
//! 2.  **Extraction (`extract`)**: one asset is downloaded through the
//!     [`HostingClient`] and handed to the manifest parser. A failed download
//!     is reported as [`ExtractionError::DownloadFailed`]; retrying is the
//!     client's job, not this module's.
//!
//! 3.  **Parallel Fan-out (`extract_all`)**: extractions are independent and
//!     share no mutable state, so they run on a dedicated rayon pool capped at
//!     the configured concurrency. Results are re-associated with their assets
//!     by position, which keeps the descriptor order identical to the release
//!     listing no matter which download finishes first.
//!
//! Failures never abort the batch. They are collected into
//! [`ExtractionReport::warnings`] for the caller to log.

use std::fmt;

use log::debug;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::hosting::{HostingClient, Release};
use crate::manifest::{self, ExtractionError, TemplateDescriptor};
use crate::repo_id::RepositoryIdentifier;

/// One downloadable release asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub asset_id: u64,
    /// File name of the asset, for diagnostics.
    pub name: String,
    /// URL recorded as the template's location.
    pub source_url: String,
}

impl AssetRef {
    /// Flattens the assets of `releases`, preserving listing order.
    pub fn from_releases(releases: &[Release]) -> Vec<AssetRef> {
        releases
            .iter()
            .flat_map(|release| release.assets.iter())
            .map(|asset| AssetRef {
                asset_id: asset.id,
                name: asset.name.clone(),
                source_url: asset.download_url.clone(),
            })
            .collect()
    }
}

/// An asset that did not produce a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionWarning {
    pub asset: AssetRef,
    pub error: ExtractionError,
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "skipping asset {} (id {}, {}): {}",
            self.asset.name, self.asset.asset_id, self.asset.source_url, self.error
        )
    }
}

/// Outcome of extracting a batch of assets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Valid descriptors, in asset order.
    pub descriptors: Vec<TemplateDescriptor>,
    /// Assets that were skipped, in asset order.
    pub warnings: Vec<ExtractionWarning>,
}

/// Knobs for [`extract_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Maximum number of assets downloaded at once.
    pub concurrency: usize,
    /// Drop warnings for assets that are simply not templates.
    pub silent_non_templates: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            concurrency: crate::defaults::DEFAULT_CONCURRENCY,
            silent_non_templates: false,
        }
    }
}

/// Downloads one asset and parses its manifest.
pub fn extract(
    client: &dyn HostingClient,
    repo: &RepositoryIdentifier,
    asset: &AssetRef,
) -> std::result::Result<TemplateDescriptor, ExtractionError> {
    debug!("Extracting asset {} ({})", asset.asset_id, asset.name);
    let bytes = client
        .download_asset(repo, asset.asset_id)
        .map_err(|e| ExtractionError::DownloadFailed {
            status: e.status(),
            message: e.to_string(),
        })?;
    manifest::parse(&bytes, &asset.source_url)
}

/// Extracts every asset with bounded parallelism.
///
/// The only error is failing to build the worker pool; per-asset failures
/// land in the report.
pub fn extract_all(
    client: &dyn HostingClient,
    repo: &RepositoryIdentifier,
    assets: &[AssetRef],
    options: ExtractOptions,
) -> Result<ExtractionReport> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.concurrency.max(1))
        .thread_name(|i| format!("depot-extract-{}", i))
        .build()
        .map_err(|e| Error::ThreadPool {
            message: e.to_string(),
        })?;

    // Indexed collect keeps results aligned with `assets`.
    let results: Vec<_> = pool.install(|| {
        assets
            .par_iter()
            .map(|asset| extract(client, repo, asset))
            .collect()
    });

    let mut report = ExtractionReport::default();
    for (asset, result) in assets.iter().zip(results) {
        match result {
            Ok(descriptor) => report.descriptors.push(descriptor),
            Err(error) if options.silent_non_templates && error.is_non_template() => {
                debug!("Ignoring non-template asset {}: {}", asset.name, error);
            }
            Err(error) => report.warnings.push(ExtractionWarning {
                asset: asset.clone(),
                error,
            }),
        }
    }
    Ok(report)
}
