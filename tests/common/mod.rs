//! Shared test utilities for the CLI end-to-end tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_template("kernel.zip", "kernel", "3.8.0");
//!     fixture.command().arg("inspect").arg("kernel.zip").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::io::{Cursor, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// Configuration files and manifests used across tests.
#[allow(dead_code)]
pub mod configs {
    /// Minimal valid configuration.
    pub const MINIMAL: &str = "repo: owner/depot\n";

    /// Configuration with a misspelled key.
    pub const UNKNOWN_KEY: &str = "repo: owner/depot\nbrnach: depot\n";

    /// Configuration with a malformed repository identifier.
    pub const INVALID_REPO: &str = "repo: not-a-repository\n";

    /// An address nothing listens on, so API calls fail without leaving the host.
    pub const UNREACHABLE_API: &str = "http://127.0.0.1:9";
}

/// Environment variables the CLI reads; cleared so the host cannot leak in.
const CLI_ENV: &[&str] = &[
    "GITHUB_TOKEN",
    "GITHUB_API_URL",
    "DEPOT_SYNC_CONFIG",
    "DEPOT_SYNC_SOURCE_REPO",
    "DEPOT_SYNC_REPO",
    "DEPOT_SYNC_BRANCH",
    "DEPOT_SYNC_PATH",
    "DEPOT_SYNC_PRE_RELEASE_BRANCH",
    "DEPOT_SYNC_PRE_RELEASE_PATH",
    "DEPOT_SYNC_READABLE",
    "DEPOT_SYNC_MESSAGE",
    "DEPOT_SYNC_CONCURRENCY",
    "RUST_LOG",
];

/// Builds a zip archive from `(name, contents)` pairs.
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("Failed to start zip entry");
        writer
            .write_all(contents.as_bytes())
            .expect("Failed to write zip entry");
    }
    writer
        .finish()
        .expect("Failed to finish zip archive")
        .into_inner()
}

/// A `template.pros` manifest for `name@version`.
pub fn manifest(name: &str, version: &str) -> String {
    format!(
        r#"{{"py/object": "pros.conductor.templates.external_template.ExternalTemplate", "py/state": {{"name": "{}", "supported_kernels": "^3.8.0", "target": "v5", "version": "{}"}}}}"#,
        name, version
    )
}

/// A temporary directory to run the CLI in.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `depot-sync.yaml` configuration file with the given content.
    #[allow(dead_code)]
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("depot-sync.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Add a template archive for `name@version`.
    #[allow(dead_code)]
    pub fn with_template(self, path: &str, name: &str, version: &str) -> Self {
        let manifest = manifest(name, version);
        self.with_archive(path, &[("template.pros", manifest.as_str())])
    }

    /// Add a zip archive with the given entries.
    #[allow(dead_code)]
    pub fn with_archive(self, path: &str, entries: &[(&str, &str)]) -> Self {
        self.temp_dir
            .child(path)
            .write_binary(&zip_bytes(entries))
            .expect("Failed to write archive");
        self
    }

    /// Add a file with the given path and content.
    #[allow(dead_code)]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the config file.
    #[allow(dead_code)]
    pub fn config_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("depot-sync.yaml")
    }

    /// Create a command running in this fixture's directory with a clean environment.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("depot-sync");
        cmd.current_dir(self.path());
        for var in CLI_ENV {
            cmd.env_remove(var);
        }
        cmd.env("NO_COLOR", "1");
        cmd
    }

    /// Create a command with the config file path argument after the subcommand.
    #[allow(dead_code)]
    pub fn command_with_config(&self, subcommand: &str) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg(subcommand).arg("--config").arg(self.config_path());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_config() {
        let fixture = TestFixture::new().with_config(configs::MINIMAL);
        assert!(fixture.config_path().exists());
    }

    #[test]
    fn test_fixture_with_template() {
        let fixture = TestFixture::new().with_template("kernel.zip", "kernel", "3.8.0");
        let bytes = std::fs::read(fixture.path().join("kernel.zip")).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_manifest_is_valid_json() {
        let value: serde_json::Value = serde_json::from_str(&manifest("kernel", "3.8.0")).unwrap();
        assert_eq!(value["py/state"]["version"], "3.8.0");
    }
}
