//! # Depot Sync Library
//!
//! This library builds and publishes *depots*: JSON indexes of the template
//! packages attached to a repository's releases. It is designed to be used by
//! the `depot-sync` command-line tool but can also be embedded in other
//! automation that needs to keep a template index in sync with releases.
//!
//! ## Quick Example
//!
//! ```
//! use depot_sync::depot::{assemble, OutputFormat};
//! use depot_sync::manifest::parse_manifest;
//!
//! let manifest = r#"{"py/state": {
//!     "name": "kernel",
//!     "supported_kernels": "^3.8.0",
//!     "target": "v5",
//!     "version": "4.0.0-rc.1"
//! }}"#;
//! let template = parse_manifest(manifest, "https://example.com/kernel@4.0.0-rc.1.zip").unwrap();
//!
//! let depots = assemble(&[template], false, OutputFormat::Compact).unwrap();
//! assert_eq!(depots.stable, "[]");
//! assert!(depots.beta.unwrap().contains("\"version\":\"4.0.0-rc.1\""));
//! ```
//!
//! ## Core Concepts
//!
//! - **Manifests (`manifest`)**: each release asset is a zip archive; template
//!   archives carry a `template.pros` manifest describing the template.
//! - **Depots (`depot`)**: the published index, partitioned into a `stable`
//!   and a `beta` track by whether a version has a pre-release component.
//! - **Routes (`config`)**: the `(branch, path)` each track is published to.
//!   When both tracks share one route, a single combined depot is built.
//! - **Hosting (`hosting`, `github`)**: every remote operation goes through
//!   the [`hosting::HostingClient`] trait; [`github::GitHubClient`] is the
//!   REST implementation.
//!
//! ## Execution Flow
//!
//! The main entry point is [`pipeline::run`], which executes these steps:
//!
//! 1.  **Discovery**: list the source repository's releases and their assets.
//! 2.  **Extraction**: download and parse every asset in parallel, collecting
//!     skipped assets as warnings.
//! 3.  **Assembly**: build the depot JSON for each track.
//! 4.  **Reconciliation**: for each route, compare with what is published and
//!     commit the new depot when it differs, creating the branch if needed.

pub mod branch;
pub mod config;
pub mod defaults;
pub mod depot;
pub mod error;
pub mod extract;
pub mod github;
pub mod hosting;
pub mod manifest;
pub mod message;
pub mod output;
pub mod pipeline;
pub mod reconcile;
pub mod remote;
pub mod repo_id;

mod manifest_proptest;
#[cfg(test)]
mod test_support;
