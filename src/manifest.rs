//! # Manifest Parser
//!
//! Turns the raw bytes of a release asset into a validated
//! [`TemplateDescriptor`]. A template archive is a zip file carrying a
//! `template.pros` manifest at its root. The manifest is JSON whose template
//! fields live beneath a `"py/state"` object, a leftover of the pickling
//! format the manifest was originally written with:
//!
//! ```json
//! {
//!   "py/object": "pros.conductor.templates.external_template.ExternalTemplate",
//!   "py/state": {
//!     "name": "okapilib",
//!     "supported_kernels": "^3.3.1",
//!     "target": "v5",
//!     "version": "4.8.0"
//!   }
//! }
//! ```
//!
//! The manifest does not know where the archive was downloaded from, so the
//! caller supplies the `source_url` recorded in the descriptor.
//!
//! Every failure is reported as an [`ExtractionError`] so one bad asset never
//! aborts a run. Nothing here touches the network.

use std::io::{Cursor, Read};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

/// Name of the manifest entry inside a template archive.
pub const MANIFEST_ENTRY: &str = "template.pros";

/// Name of the entry that marks a project archive (not a template).
pub const PROJECT_MARKER_ENTRY: &str = "project.pros";

/// Key of the object holding the template fields inside the manifest.
pub const MANIFEST_STATE_KEY: &str = "py/state";

/// Fields every manifest must carry under [`MANIFEST_STATE_KEY`], as strings.
pub const REQUIRED_FIELDS: [&str; 4] = ["name", "supported_kernels", "target", "version"];

/// One installable template, as described by its manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    /// Template name, e.g. `kernel` or `okapilib`.
    pub name: String,
    /// Opaque version-range expression of the kernels this template supports.
    pub supported_kernels: String,
    /// Platform identifier, e.g. `v5` or `cortex`.
    pub target: String,
    /// Semantic-version-shaped version string.
    pub version: String,
    /// Where the asset was fetched from.
    pub source_url: String,
}

impl TemplateDescriptor {
    /// `name@version`, used in logs and commit messages.
    pub fn identity(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

/// Why a release asset did not yield a [`TemplateDescriptor`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The archive has no manifest but carries a project marker.
    #[error("asset is a project, not a template (project.pros present, template.pros absent)")]
    NotATemplate { entries: Vec<String> },

    /// The archive carries neither a manifest nor a project marker.
    #[error("template.pros not present in archive (entries: {})", entries.join(", "))]
    ManifestMissing { entries: Vec<String> },

    /// The asset bytes could not be opened as an archive.
    #[error("asset is not a readable archive: {message}")]
    ArchiveUnreadable { message: String },

    /// The manifest is not JSON, or lacks a keyed `py/state` object.
    #[error("malformed template.pros: {message}")]
    ManifestMalformed { message: String },

    /// The manifest lacks one or more required fields.
    #[error("template.pros is missing required keys: {}", missing.join(", "))]
    ManifestIncomplete { missing: Vec<String> },

    /// A required field is present but is not a (non-empty, for `name`) string.
    #[error("template.pros field '{field}' is not a valid string")]
    ManifestInvalid { field: String },

    /// The asset could not be downloaded.
    #[error("failed to download the asset{}: {message}", status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    DownloadFailed {
        status: Option<u16>,
        message: String,
    },
}

/// Field-less discriminant of [`ExtractionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionErrorKind {
    NotATemplate,
    ManifestMissing,
    ArchiveUnreadable,
    ManifestMalformed,
    ManifestIncomplete,
    ManifestInvalid,
    DownloadFailed,
}

impl ExtractionError {
    pub fn kind(&self) -> ExtractionErrorKind {
        match self {
            Self::NotATemplate { .. } => ExtractionErrorKind::NotATemplate,
            Self::ManifestMissing { .. } => ExtractionErrorKind::ManifestMissing,
            Self::ArchiveUnreadable { .. } => ExtractionErrorKind::ArchiveUnreadable,
            Self::ManifestMalformed { .. } => ExtractionErrorKind::ManifestMalformed,
            Self::ManifestIncomplete { .. } => ExtractionErrorKind::ManifestIncomplete,
            Self::ManifestInvalid { .. } => ExtractionErrorKind::ManifestInvalid,
            Self::DownloadFailed { .. } => ExtractionErrorKind::DownloadFailed,
        }
    }

    /// True for assets that simply are not templates, as opposed to broken
    /// templates or transport failures.
    pub fn is_non_template(&self) -> bool {
        matches!(
            self.kind(),
            ExtractionErrorKind::NotATemplate | ExtractionErrorKind::ManifestMissing
        )
    }
}

/// Parses a template archive into a descriptor.
pub fn parse(
    archive_bytes: &[u8],
    source_url: &str,
) -> Result<TemplateDescriptor, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(archive_bytes)).map_err(unreadable)?;

    let entries: Vec<String> = archive.file_names().map(str::to_string).collect();

    let text = match archive.by_name(MANIFEST_ENTRY) {
        Ok(mut entry) => {
            let mut text = String::new();
            entry
                .read_to_string(&mut text)
                .map_err(|e| ExtractionError::ManifestMalformed {
                    message: format!("could not read entry: {}", e),
                })?;
            text
        }
        Err(ZipError::FileNotFound) => {
            return Err(if entries.iter().any(|e| e == PROJECT_MARKER_ENTRY) {
                ExtractionError::NotATemplate { entries }
            } else {
                ExtractionError::ManifestMissing { entries }
            });
        }
        Err(e) => return Err(unreadable(e)),
    };

    parse_manifest(&text, source_url)
}

fn unreadable(error: ZipError) -> ExtractionError {
    ExtractionError::ArchiveUnreadable {
        message: error.to_string(),
    }
}

/// Parses manifest text (the contents of [`MANIFEST_ENTRY`]).
pub fn parse_manifest(json: &str, source_url: &str) -> Result<TemplateDescriptor, ExtractionError> {
    let parsed: Value = serde_json::from_str(json).map_err(|e| ExtractionError::ManifestMalformed {
        message: e.to_string(),
    })?;

    let state = parsed
        .get(MANIFEST_STATE_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| ExtractionError::ManifestMalformed {
            message: format!("missing or non-object \"{}\"", MANIFEST_STATE_KEY),
        })?;

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|key| !state.contains_key(**key))
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ExtractionError::ManifestIncomplete { missing });
    }

    let name = string_field(state, "name")?;
    if name.is_empty() {
        return Err(ExtractionError::ManifestInvalid {
            field: "name".to_string(),
        });
    }

    Ok(TemplateDescriptor {
        name,
        supported_kernels: string_field(state, "supported_kernels")?,
        target: string_field(state, "target")?,
        version: string_field(state, "version")?,
        source_url: source_url.to_string(),
    })
}

fn string_field(state: &Map<String, Value>, field: &str) -> Result<String, ExtractionError> {
    state
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ExtractionError::ManifestInvalid {
            field: field.to_string(),
        })
}
