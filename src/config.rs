//! # Configuration
//!
//! This module defines how a depot-sync run is configured: which repository
//! releases are read from, which repository and routes depots are published
//! to, and how the output looks.
//!
//! ## Layers
//!
//! Settings come from up to three places, highest precedence first:
//!
//! 1.  Command-line flags (and their environment variables, handled by the
//!     CLI layer).
//! 2.  An optional YAML file passed with `--config`.
//! 3.  The defaults in [`crate::defaults`].
//!
//! Each layer is a [`RawConfig`] where every field is optional. Layers are
//! combined with [`RawConfig::overlay`] and turned into a validated
//! [`SyncConfig`] with [`RawConfig::resolve`], which performs every check
//! that must fail before any network work starts.
//!
//! ## File Format
//!
//! ```yaml
//! source-repo: purduesigbots/pros-mainline
//! repo: purduesigbots/pros-depot
//! branch: depot
//! path: stable.json
//! pre-release-branch: depot
//! pre-release-path: beta.json
//! readable: true
//! concurrency: 8
//! ```
//!
//! The credential is deliberately not part of the file format; it is only
//! accepted from the command line or the environment.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::defaults;
use crate::depot::{OutputFormat, Track};
use crate::error::{Error, Result};
use crate::repo_id::RepositoryIdentifier;

/// A `(branch, path)` destination for one track's depot file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DestinationRoute {
    pub branch: String,
    pub path: String,
}

impl DestinationRoute {
    pub fn new(branch: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            path: path.into(),
        }
    }

    /// Both parts are set.
    pub fn is_configured(&self) -> bool {
        !self.branch.trim().is_empty() && !self.path.trim().is_empty()
    }
}

impl fmt::Display for DestinationRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.branch, self.path)
    }
}

/// Destinations of the stable and (optionally) beta depots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMap {
    pub stable: DestinationRoute,
    /// `None` when the beta depot is not published.
    pub beta: Option<DestinationRoute>,
}

impl RouteMap {
    /// True when both tracks resolve to the same `(branch, path)`.
    ///
    /// The beta partition is then not computed at all; every template goes to
    /// the single shared depot.
    pub fn is_unified(&self) -> bool {
        self.beta.as_ref() == Some(&self.stable)
    }

    pub fn get(&self, track: Track) -> Option<&DestinationRoute> {
        match track {
            Track::Stable => Some(&self.stable),
            Track::Beta => self.beta.as_ref(),
        }
    }
}

/// One configuration layer. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct RawConfig {
    /// Repository whose releases are scanned (defaults to `repo`).
    pub source_repo: Option<String>,
    /// Repository the depots are published to.
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub path: Option<String>,
    pub pre_release_branch: Option<String>,
    pub pre_release_path: Option<String>,
    /// `true` for indented JSON, `false` for single-line JSON.
    pub readable: Option<bool>,
    /// Fixed commit message replacing the composed one.
    pub message: Option<String>,
    pub quiet_warnings: Option<bool>,
    pub silent_non_templates: Option<bool>,
    pub concurrency: Option<usize>,
    pub api_url: Option<String>,
    #[serde(skip)]
    pub token: Option<String>,
}

/// A validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub source_repo: RepositoryIdentifier,
    pub dest_repo: RepositoryIdentifier,
    pub routes: RouteMap,
    pub format: OutputFormat,
    pub token: Option<String>,
    pub message: Option<String>,
    pub quiet_warnings: bool,
    pub silent_non_templates: bool,
    pub concurrency: usize,
    pub api_url: String,
}

impl RawConfig {
    /// Parses a YAML configuration file's contents.
    pub fn parse(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
            hint: Some(
                "Valid keys are: source-repo, repo, branch, path, pre-release-branch, \
                 pre-release-path, readable, message, quiet-warnings, silent-non-templates, \
                 concurrency, api-url"
                    .to_string(),
            ),
        })
    }

    /// Reads and parses a YAML configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Combines two layers; fields set in `upper` win.
    pub fn overlay(self, upper: RawConfig) -> RawConfig {
        RawConfig {
            source_repo: upper.source_repo.or(self.source_repo),
            repo: upper.repo.or(self.repo),
            branch: upper.branch.or(self.branch),
            path: upper.path.or(self.path),
            pre_release_branch: upper.pre_release_branch.or(self.pre_release_branch),
            pre_release_path: upper.pre_release_path.or(self.pre_release_path),
            readable: upper.readable.or(self.readable),
            message: upper.message.or(self.message),
            quiet_warnings: upper.quiet_warnings.or(self.quiet_warnings),
            silent_non_templates: upper.silent_non_templates.or(self.silent_non_templates),
            concurrency: upper.concurrency.or(self.concurrency),
            api_url: upper.api_url.or(self.api_url),
            token: upper.token.or(self.token),
        }
    }

    /// Applies defaults and validates.
    ///
    /// Fails on a missing or malformed repository identifier, an
    /// unconfigured stable route, a zero concurrency, or an unparsable API
    /// URL. The credential is checked separately by
    /// [`SyncConfig::require_token`], because building depots locally does
    /// not need one.
    pub fn resolve(self) -> Result<SyncConfig> {
        let dest_input = self.repo.ok_or_else(|| Error::ConfigParse {
            message: "destination repository is not set".to_string(),
            hint: Some("Pass --repo owner/name or set DEPOT_SYNC_REPO".to_string()),
        })?;
        let dest_repo = RepositoryIdentifier::parse(&dest_input)?;
        let source_repo = match self.source_repo.filter(|s| !s.trim().is_empty()) {
            Some(input) => RepositoryIdentifier::parse(&input)?,
            None => dest_repo.clone(),
        };

        let stable = DestinationRoute::new(
            self.branch
                .unwrap_or_else(|| defaults::DEFAULT_BRANCH.to_string()),
            self.path
                .unwrap_or_else(|| defaults::DEFAULT_STABLE_PATH.to_string()),
        );
        if !stable.is_configured() {
            return Err(Error::ConfigParse {
                message: "stable route is not configured".to_string(),
                hint: Some("Set both 'branch' and 'path'".to_string()),
            });
        }
        let beta = DestinationRoute::new(
            self.pre_release_branch
                .unwrap_or_else(|| defaults::DEFAULT_BRANCH.to_string()),
            self.pre_release_path
                .unwrap_or_else(|| defaults::DEFAULT_BETA_PATH.to_string()),
        );

        let concurrency = self.concurrency.unwrap_or(defaults::DEFAULT_CONCURRENCY);
        if concurrency == 0 {
            return Err(Error::ConfigParse {
                message: "concurrency must be at least 1".to_string(),
                hint: None,
            });
        }

        let api_url = self
            .api_url
            .unwrap_or_else(|| defaults::DEFAULT_API_URL.to_string());
        Url::parse(&api_url)?;

        Ok(SyncConfig {
            source_repo,
            dest_repo,
            routes: RouteMap {
                stable,
                beta: beta.is_configured().then_some(beta),
            },
            format: match self.readable {
                Some(false) => OutputFormat::Compact,
                _ => OutputFormat::Readable,
            },
            token: self.token.filter(|t| !t.trim().is_empty()),
            message: self.message.filter(|m| !m.trim().is_empty()),
            quiet_warnings: self.quiet_warnings.unwrap_or(false),
            silent_non_templates: self.silent_non_templates.unwrap_or(false),
            concurrency,
            api_url,
        })
    }
}

impl SyncConfig {
    /// Whether both tracks publish to one file.
    pub fn unified(&self) -> bool {
        self.routes.is_unified()
    }

    /// The credential, or [`Error::MissingCredential`].
    pub fn require_token(&self) -> Result<&str> {
        self.token.as_deref().ok_or(Error::MissingCredential)
    }
}
