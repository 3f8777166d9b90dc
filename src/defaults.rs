//! Default values for depot-sync configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

/// Branch both depot files are published to unless configured otherwise.
pub const DEFAULT_BRANCH: &str = "depot";

/// Path of the stable depot file.
pub const DEFAULT_STABLE_PATH: &str = "stable.json";

/// Path of the beta (pre-release) depot file.
pub const DEFAULT_BETA_PATH: &str = "beta.json";

/// Base URL of the GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Number of release assets downloaded at once.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// The hash of git's empty tree object.
///
/// Pointing a new ref at it creates a branch with no files and no history.
pub const EMPTY_TREE_HASH: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";
