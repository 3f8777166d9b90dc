//! # Error Handling
//!
//! This module defines the top-level error type for `depot-sync`. It uses the
//! `thiserror` library to describe every condition that can abort a whole
//! run, with enough context to tell the operator what to fix.
//!
//! ## Layering
//!
//! Failures that only affect one release asset or one destination route are
//! *not* represented here. They have their own sum types next to the
//! component that produces them:
//!
//! - [`crate::manifest::ExtractionError`] for per-asset extraction failures.
//! - [`crate::hosting::HostingError`] for failed calls to the hosting platform.
//! - [`crate::reconcile::RouteFailure`] for routes that could not be published.
//!
//! Those are aggregated and reported by the pipeline. An `Error` is only
//! produced when the run as a whole cannot continue (bad input, missing
//! credential, a destination repository that does not exist) or when at
//! least one route failed and the process must exit non-zero.

use thiserror::Error;

use crate::hosting::HostingError;

/// Main error type for depot-sync operations
#[derive(Error, Debug)]
pub enum Error {
    /// A repository identifier was not of the form `owner/repo`.
    #[error("Invalid repository input: '{input}' (expected 'owner/repo')")]
    InvalidRepository { input: String },

    /// No credential was supplied for an operation that writes to the
    /// destination repository.
    #[error("Missing credential: set --token or the GITHUB_TOKEN environment variable")]
    MissingCredential,

    /// An error occurred while reading or validating configuration.
    ///
    /// This error includes the specific issue and optionally a hint about
    /// how to fix it.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The destination repository does not exist (or is not visible with the
    /// supplied credential).
    #[error("Destination repository not found: {repo}")]
    RepositoryNotFound { repo: String },

    /// A hosting-platform call failed outside of any per-route context, for
    /// example while listing the source repository's releases.
    #[error("Hosting API error: {0}")]
    Hosting(#[from] HostingError),

    /// One or more destination routes could not be published.
    #[error("{failed} depot route(s) failed to publish")]
    RoutesFailed { failed: usize },

    /// The extraction worker pool could not be created.
    #[error("Thread pool error: {message}")]
    ThreadPool { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
