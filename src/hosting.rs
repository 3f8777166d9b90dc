//! # Hosting Platform Interface
//!
//! This module defines `HostingClient`, the seam between depot-sync and the
//! code-hosting platform it reads releases from and publishes depots to.
//!
//! ## Design
//!
//! Every component that talks to the platform (the extractor, the remote
//! state reader, the branch provisioner, the reconciler) takes a
//! `&dyn HostingClient` instead of a concrete HTTP client. The production
//! implementation is [`crate::github::GitHubClient`]; tests substitute an
//! in-memory client that records the calls it receives. Retries, timeouts
//! and rate-limit handling are the implementation's business, never the
//! callers'.
//!
//! Failures are reported as [`HostingError`], which keeps "the thing does not
//! exist" (`NotFound`) and "someone else already created it" (`Conflict`)
//! apart from every other failure. Callers depend on that distinction to
//! decide between creating content and giving up.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repo_id::RepositoryIdentifier;

/// A failed call to the hosting platform.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostingError {
    /// The platform answered "not found" (HTTP 404).
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The resource already exists or the write conflicts with its current
    /// state (HTTP 409, or 422 "already exists").
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// A response arrived but its body could not be understood.
    #[error("unexpected response: {message}")]
    Decode { message: String },
}

/// Field-less discriminant of [`HostingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostingErrorKind {
    NotFound,
    Conflict,
    Http,
    Transport,
    Decode,
}

impl HostingError {
    pub fn kind(&self) -> HostingErrorKind {
        match self {
            Self::NotFound { .. } => HostingErrorKind::NotFound,
            Self::Conflict { .. } => HostingErrorKind::Conflict,
            Self::Http { .. } => HostingErrorKind::Http,
            Self::Transport { .. } => HostingErrorKind::Transport,
            Self::Decode { .. } => HostingErrorKind::Decode,
        }
    }

    /// The HTTP status behind this error, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Marker carried by the `NotFound` message of a content read whose branch
/// does not exist, as opposed to a missing path on an existing branch.
///
/// This is the text GitHub returns with its 404; other implementations must
/// reuse it.
pub const MISSING_REF_MESSAGE: &str = "No commit found for the ref";

/// Result alias for hosting calls.
pub type HostingResult<T> = std::result::Result<T, HostingError>;

/// A published release of the source repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// Public download URL, recorded as the template's location.
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

/// A file as stored on a branch, still in its transport encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    /// Base64-encoded content, possibly wrapped across lines.
    pub base64_content: String,
    /// Blob revision token required to overwrite this file.
    pub revision: String,
}

/// The commit produced by a file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub sha: String,
}

/// A git reference created on the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRef {
    pub name: String,
    pub sha: String,
}

/// Repository metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub full_name: String,
    pub default_branch: String,
}

/// Everything needed to create or update one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest<'a> {
    pub repo: &'a RepositoryIdentifier,
    pub branch: &'a str,
    pub path: &'a str,
    /// Plain file content; the client applies the transport encoding.
    pub content: &'a str,
    pub message: &'a str,
    /// Revision of the blob being replaced. `None` creates the file.
    pub revision: Option<&'a str>,
}

/// Operations depot-sync needs from the hosting platform.
pub trait HostingClient: Send + Sync {
    /// Lists every release of a repository, newest first.
    fn list_releases(&self, repo: &RepositoryIdentifier) -> HostingResult<Vec<Release>>;

    /// Downloads the raw bytes of a release asset.
    fn download_asset(&self, repo: &RepositoryIdentifier, asset_id: u64) -> HostingResult<Vec<u8>>;

    /// Reads a file at the tip of `branch`.
    ///
    /// A missing branch is `NotFound` with a message containing
    /// [`MISSING_REF_MESSAGE`]; a missing path is any other `NotFound`.
    fn get_file_content(
        &self,
        repo: &RepositoryIdentifier,
        branch: &str,
        path: &str,
    ) -> HostingResult<FileContent>;

    /// Creates (no revision) or updates (with revision) a file in one commit.
    fn create_or_update_file(&self, request: &PublishRequest<'_>) -> HostingResult<Commit>;

    /// Creates `refs/heads/<name>` pointing at `from_object`.
    fn create_branch_ref(
        &self,
        repo: &RepositoryIdentifier,
        name: &str,
        from_object: &str,
    ) -> HostingResult<GitRef>;

    /// Fetches repository metadata; `NotFound` if it does not exist.
    fn get_repository(&self, repo: &RepositoryIdentifier) -> HostingResult<Repository>;
}
