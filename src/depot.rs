//! # Depot Assembly
//!
//! Converts extracted [`TemplateDescriptor`]s into the published depot
//! format and splits them into tracks.
//!
//! ## Wire Format
//!
//! A depot file is a JSON array of [`DepotEntry`] objects, keyed in a fixed
//! order so consecutive runs produce byte-identical output for identical
//! input:
//!
//! ```json
//! [
//!   {
//!     "metadata": { "location": "https://github.com/.../kernel@3.8.0.zip" },
//!     "name": "kernel",
//!     "py/object": "pros.conductor.templates.base_template.BaseTemplate",
//!     "supported_kernels": "^3.8.0",
//!     "target": "v5",
//!     "version": "3.8.0"
//!   }
//! ]
//! ```
//!
//! ## Tracks
//!
//! A template belongs to the [`Track::Beta`] depot when its version carries a
//! semver pre-release component (`2.0.0-rc.1`), otherwise to
//! [`Track::Stable`]. Versions that are not valid semver go to stable and are
//! reported as [`AssemblyWarning::UnparsableVersion`]. In unified mode both
//! tracks share one destination, so every entry lands in the stable depot and
//! no beta depot is produced.

use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::manifest::TemplateDescriptor;

/// Discriminator identifying depot entries to downstream consumers.
pub const TEMPLATE_OBJECT_TAG: &str = "pros.conductor.templates.base_template.BaseTemplate";

/// Location metadata of a depot entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub location: String,
}

/// One template as published in a depot file.
///
/// Field order here is the serialized key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepotEntry {
    pub metadata: EntryMetadata,
    pub name: String,
    #[serde(rename = "py/object")]
    pub object_tag: String,
    pub supported_kernels: String,
    pub target: String,
    pub version: String,
}

impl From<&TemplateDescriptor> for DepotEntry {
    fn from(descriptor: &TemplateDescriptor) -> Self {
        Self {
            metadata: EntryMetadata {
                location: descriptor.source_url.clone(),
            },
            name: descriptor.name.clone(),
            object_tag: TEMPLATE_OBJECT_TAG.to_string(),
            supported_kernels: descriptor.supported_kernels.clone(),
            target: descriptor.target.clone(),
            version: descriptor.version.clone(),
        }
    }
}

/// An ordered sequence of entries; the content of one depot file.
pub type Depot = Vec<DepotEntry>;

/// A named partition of the depot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Track {
    Stable,
    Beta,
}

impl Track {
    pub const ALL: [Track; 2] = [Track::Stable, Track::Beta];

    pub fn as_str(&self) -> &'static str {
        match self {
            Track::Stable => "stable",
            Track::Beta => "beta",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How depot JSON is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Multi-line, two-space indented.
    #[default]
    Readable,
    /// Single line.
    Compact,
}

/// Something odd noticed while assembling, that did not stop assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyWarning {
    /// The version is not semver; the entry was placed in the stable track.
    UnparsableVersion { identity: String, reason: String },
}

impl fmt::Display for AssemblyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyWarning::UnparsableVersion { identity, reason } => write!(
                f,
                "{} does not have a semantic version ({}); publishing it as stable",
                identity, reason
            ),
        }
    }
}

/// Serialized depots, one per track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDepots {
    pub stable: String,
    /// `None` in unified mode.
    pub beta: Option<String>,
    pub warnings: Vec<AssemblyWarning>,
}

impl AssembledDepots {
    pub fn get(&self, track: Track) -> Option<&str> {
        match track {
            Track::Stable => Some(&self.stable),
            Track::Beta => self.beta.as_deref(),
        }
    }

    /// The produced `(track, json)` pairs, stable first.
    pub fn tracks(&self) -> impl Iterator<Item = (Track, &str)> + '_ {
        Track::ALL
            .into_iter()
            .filter_map(move |track| self.get(track).map(|json| (track, json)))
    }
}

/// Decides which track a version belongs to.
///
/// A single leading `v` is tolerated (`v1.2.3`).
pub fn classify_version(version: &str) -> Result<Track, semver::Error> {
    let trimmed = version.trim();
    let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
    let parsed = Version::parse(bare)?;
    Ok(if parsed.pre.is_empty() {
        Track::Stable
    } else {
        Track::Beta
    })
}

/// Serializes a depot in the requested layout.
pub fn serialize(depot: &[DepotEntry], format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Readable => serde_json::to_string_pretty(depot),
        OutputFormat::Compact => serde_json::to_string(depot),
    }
}

/// Parses depot JSON back into entries.
pub fn parse_depot(json: &str) -> serde_json::Result<Depot> {
    serde_json::from_str(json)
}

/// Builds the per-track depot JSON for a set of descriptors.
pub fn assemble(
    descriptors: &[TemplateDescriptor],
    unified: bool,
    format: OutputFormat,
) -> serde_json::Result<AssembledDepots> {
    let entries: Depot = descriptors.iter().map(DepotEntry::from).collect();

    if unified {
        return Ok(AssembledDepots {
            stable: serialize(&entries, format)?,
            beta: None,
            warnings: Vec::new(),
        });
    }

    let mut stable = Vec::new();
    let mut beta = Vec::new();
    let mut warnings = Vec::new();
    for entry in entries {
        let track = classify_version(&entry.version).unwrap_or_else(|e| {
            warnings.push(AssemblyWarning::UnparsableVersion {
                identity: format!("{}@{}", entry.name, entry.version),
                reason: e.to_string(),
            });
            Track::Stable
        });
        match track {
            Track::Stable => stable.push(entry),
            Track::Beta => beta.push(entry),
        }
    }

    Ok(AssembledDepots {
        stable: serialize(&stable, format)?,
        beta: Some(serialize(&beta, format)?),
        warnings,
    })
}
