//! # Sync Pipeline
//!
//! Orchestrates a full run:
//!
//! 1.  **Discovery**: list the source repository's releases and flatten their
//!     assets.
//! 2.  **Extraction**: download and parse every asset on a bounded worker
//!     pool ([`crate::extract`]).
//! 3.  **Assembly**: build the per-track depot JSON ([`crate::depot`]),
//!     collapsing the tracks when both routes point at one file.
//! 4.  **Reconciliation**: bring each configured route up to date
//!     ([`crate::reconcile`]).
//!
//! [`build`] stops after step 3 and touches no destination.
//!
//! Skipped assets and unparsable versions are collected rather than thrown.
//! They are logged here, once, from the calling thread.

use log::{info, warn};

use crate::config::SyncConfig;
use crate::depot::{assemble, AssembledDepots, AssemblyWarning};
use crate::error::{Error, Result};
use crate::extract::{extract_all, AssetRef, ExtractOptions, ExtractionWarning};
use crate::hosting::HostingClient;
use crate::reconcile::{reconcile, RouteFailure, RouteOutcome, RoutePlan, RouteReport};

/// Depots assembled from the source releases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub depots: AssembledDepots,
    pub extraction_warnings: Vec<ExtractionWarning>,
}

/// Everything a sync run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub extraction_warnings: Vec<ExtractionWarning>,
    pub assembly_warnings: Vec<AssemblyWarning>,
    /// One report per reconciled route, stable first.
    pub outcomes: Vec<RouteReport>,
}

impl SyncReport {
    pub fn failed_routes(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|r| r.outcome.is_failed())
            .count()
    }

    /// `Err(RoutesFailed)` when any route failed.
    pub fn check(&self) -> Result<()> {
        match self.failed_routes() {
            0 => Ok(()),
            failed => Err(Error::RoutesFailed { failed }),
        }
    }
}

/// Extracts and assembles the depots without publishing them.
pub fn build(config: &SyncConfig, client: &dyn HostingClient) -> Result<BuildReport> {
    info!("Listing releases of {}", config.source_repo);
    let releases = client.list_releases(&config.source_repo)?;
    let assets = AssetRef::from_releases(&releases);
    info!(
        "Found {} asset(s) in {} release(s)",
        assets.len(),
        releases.len()
    );

    let options = ExtractOptions {
        concurrency: config.concurrency,
        silent_non_templates: config.silent_non_templates,
    };
    let extraction = extract_all(client, &config.source_repo, &assets, options)?;
    info!(
        "Extracted {} template(s), skipped {} asset(s)",
        extraction.descriptors.len(),
        extraction.warnings.len()
    );

    let depots = assemble(&extraction.descriptors, config.unified(), config.format)?;

    if !config.quiet_warnings {
        for warning in &extraction.warnings {
            warn!("{}", warning);
        }
        for warning in &depots.warnings {
            warn!("{}", warning);
        }
    }

    Ok(BuildReport {
        depots,
        extraction_warnings: extraction.warnings,
    })
}

/// One plan per produced track whose route is configured.
pub fn plans(config: &SyncConfig, depots: &AssembledDepots) -> Vec<RoutePlan> {
    depots
        .tracks()
        .filter_map(|(track, json)| {
            config.routes.get(track).map(|route| RoutePlan {
                track,
                route: route.clone(),
                desired: json.to_string(),
            })
        })
        .collect()
}

/// Runs a full sync.
///
/// A missing credential fails before any request is made. A missing
/// destination repository aborts the run. Other route failures are returned
/// in the report; see [`SyncReport::check`].
pub fn run(config: &SyncConfig, client: &dyn HostingClient) -> Result<SyncReport> {
    config.require_token()?;

    let built = build(config, client)?;
    let plans = plans(config, &built.depots);
    let outcomes = reconcile(client, &config.dest_repo, &plans, config.message.as_deref());

    if outcomes
        .iter()
        .any(|r| r.outcome == RouteOutcome::Failed(RouteFailure::RepositoryNotFound))
    {
        return Err(Error::RepositoryNotFound {
            repo: config.dest_repo.to_string(),
        });
    }

    Ok(SyncReport {
        extraction_warnings: built.extraction_warnings,
        assembly_warnings: built.depots.warnings,
        outcomes,
    })
}
