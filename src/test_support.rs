//! Fixtures shared by the unit tests: in-memory archives and a recording
//! [`HostingClient`].

use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Write};
use std::sync::Mutex;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::hosting::{
    Commit, FileContent, GitRef, HostingClient, HostingError, HostingResult, PublishRequest,
    Release, ReleaseAsset, Repository, MISSING_REF_MESSAGE,
};
use crate::manifest::{TemplateDescriptor, MANIFEST_ENTRY, PROJECT_MARKER_ENTRY};
use crate::repo_id::RepositoryIdentifier;

/// Builds a zip archive holding the given `(name, contents)` entries.
pub fn zip_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// A complete `template.pros` for a v5 template.
pub fn manifest_json(name: &str, version: &str) -> String {
    serde_json::json!({
        "py/object": "pros.conductor.templates.external_template.ExternalTemplate",
        "py/state": {
            "name": name,
            "supported_kernels": "^3.8.0",
            "target": "v5",
            "version": version,
        }
    })
    .to_string()
}

/// A template archive for `name@version`.
pub fn template_archive(name: &str, version: &str) -> Vec<u8> {
    zip_archive(&[(MANIFEST_ENTRY, manifest_json(name, version).as_str())])
}

/// A project archive (project marker, no manifest).
pub fn project_archive() -> Vec<u8> {
    zip_archive(&[
        (PROJECT_MARKER_ENTRY, "{}"),
        ("src/main.cpp", "int main() {}"),
    ])
}

/// The descriptor [`template_archive`] parses into.
pub fn descriptor(name: &str, version: &str) -> TemplateDescriptor {
    TemplateDescriptor {
        name: name.to_string(),
        supported_kernels: "^3.8.0".to_string(),
        target: "v5".to_string(),
        version: version.to_string(),
        source_url: download_url(name, version),
    }
}

pub fn download_url(name: &str, version: &str) -> String {
    format!(
        "https://github.com/owner/templates/releases/download/{}/{}@{}.zip",
        version, name, version
    )
}

pub fn repo() -> RepositoryIdentifier {
    RepositoryIdentifier::new("owner", "templates")
}

/// A call received by [`MockHosting`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListReleases,
    Download(u64),
    GetFile {
        branch: String,
        path: String,
    },
    Publish {
        branch: String,
        path: String,
        revision: Option<String>,
        message: String,
    },
    CreateBranch {
        name: String,
        from_object: String,
    },
    GetRepository,
}

#[derive(Default)]
struct State {
    files: HashMap<(String, String), (String, String)>,
    branches: HashSet<String>,
    calls: Vec<Call>,
    next_revision: u32,
}

/// In-memory hosting platform.
///
/// Files written through `create_or_update_file` become visible to later
/// reads, so a second reconciliation observes the first one's publish.
#[derive(Default)]
pub struct MockHosting {
    releases: Vec<Release>,
    assets: HashMap<u64, HostingResult<Vec<u8>>>,
    read_errors: HashMap<(String, String), HostingError>,
    branch_error: Option<HostingError>,
    publish_error: Option<HostingError>,
    repository_missing: bool,
    state: Mutex<State>,
}

impl MockHosting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a release whose assets are the given `(id, bytes)` pairs.
    pub fn with_release(mut self, tag: &str, assets: Vec<(u64, HostingResult<Vec<u8>>)>) -> Self {
        let release_assets = assets
            .iter()
            .map(|(id, _)| ReleaseAsset {
                id: *id,
                name: format!("asset-{}.zip", id),
                download_url: format!(
                    "https://github.com/owner/templates/releases/download/{}/asset-{}.zip",
                    tag, id
                ),
            })
            .collect();
        self.releases.push(Release {
            id: self.releases.len() as u64 + 1,
            tag_name: tag.to_string(),
            prerelease: false,
            assets: release_assets,
        });
        self.assets.extend(assets);
        self
    }

    pub fn with_branch(self, branch: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .branches
            .insert(branch.to_string());
        self
    }

    pub fn with_file(self, branch: &str, path: &str, content: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.branches.insert(branch.to_string());
            state.next_revision += 1;
            let revision = format!("rev-{}", state.next_revision);
            let key = (branch.to_string(), path.to_string());
            state.files.insert(key, (content.to_string(), revision));
        }
        self
    }

    pub fn with_read_error(mut self, branch: &str, path: &str, error: HostingError) -> Self {
        self.read_errors
            .insert((branch.to_string(), path.to_string()), error);
        self
    }

    pub fn with_branch_error(mut self, error: HostingError) -> Self {
        self.branch_error = Some(error);
        self
    }

    pub fn with_publish_error(mut self, error: HostingError) -> Self {
        self.publish_error = Some(error);
        self
    }

    pub fn without_repository(mut self) -> Self {
        self.repository_missing = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    pub fn publishes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Publish { .. }))
            .collect()
    }

    pub fn branch_creations(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::CreateBranch { .. }))
            .count()
    }

    /// Current content and revision of a stored file.
    pub fn file(&self, branch: &str, path: &str) -> Option<(String, String)> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(&(branch.to_string(), path.to_string()))
            .cloned()
    }
}

impl HostingClient for MockHosting {
    fn list_releases(&self, _repo: &RepositoryIdentifier) -> HostingResult<Vec<Release>> {
        self.record(Call::ListReleases);
        Ok(self.releases.clone())
    }

    fn download_asset(
        &self,
        _repo: &RepositoryIdentifier,
        asset_id: u64,
    ) -> HostingResult<Vec<u8>> {
        self.record(Call::Download(asset_id));
        self.assets.get(&asset_id).cloned().unwrap_or_else(|| {
            Err(HostingError::NotFound {
                message: "Not Found".to_string(),
            })
        })
    }

    fn get_file_content(
        &self,
        _repo: &RepositoryIdentifier,
        branch: &str,
        path: &str,
    ) -> HostingResult<FileContent> {
        let key = (branch.to_string(), path.to_string());
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::GetFile {
            branch: branch.to_string(),
            path: path.to_string(),
        });
        if let Some(error) = self.read_errors.get(&key) {
            return Err(error.clone());
        }
        if !state.branches.contains(branch) {
            return Err(HostingError::NotFound {
                message: format!("{} {}", MISSING_REF_MESSAGE, branch),
            });
        }
        match state.files.get(&key) {
            Some((content, revision)) => Ok(FileContent {
                base64_content: STANDARD.encode(content),
                revision: revision.clone(),
            }),
            None => Err(HostingError::NotFound {
                message: "Not Found".to_string(),
            }),
        }
    }

    fn create_or_update_file(&self, request: &PublishRequest<'_>) -> HostingResult<Commit> {
        let key = (request.branch.to_string(), request.path.to_string());
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Publish {
            branch: request.branch.to_string(),
            path: request.path.to_string(),
            revision: request.revision.map(str::to_string),
            message: request.message.to_string(),
        });
        if let Some(error) = &self.publish_error {
            return Err(error.clone());
        }
        if !state.branches.contains(request.branch) {
            return Err(HostingError::NotFound {
                message: "Branch not found".to_string(),
            });
        }
        let current = state.files.get(&key).map(|(_, rev)| rev.clone());
        if current.as_deref() != request.revision {
            return Err(HostingError::Conflict {
                message: "revision does not match".to_string(),
            });
        }
        state.next_revision += 1;
        let revision = format!("rev-{}", state.next_revision);
        state
            .files
            .insert(key, (request.content.to_string(), revision.clone()));
        Ok(Commit { sha: revision })
    }

    fn create_branch_ref(
        &self,
        _repo: &RepositoryIdentifier,
        name: &str,
        from_object: &str,
    ) -> HostingResult<GitRef> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateBranch {
            name: name.to_string(),
            from_object: from_object.to_string(),
        });
        if let Some(error) = &self.branch_error {
            return Err(error.clone());
        }
        if !state.branches.insert(name.to_string()) {
            return Err(HostingError::Conflict {
                message: "Reference already exists".to_string(),
            });
        }
        Ok(GitRef {
            name: format!("refs/heads/{}", name),
            sha: from_object.to_string(),
        })
    }

    fn get_repository(&self, repo: &RepositoryIdentifier) -> HostingResult<Repository> {
        self.record(Call::GetRepository);
        if self.repository_missing {
            return Err(HostingError::NotFound {
                message: "Not Found".to_string(),
            });
        }
        Ok(Repository {
            full_name: repo.to_string(),
            default_branch: "main".to_string(),
        })
    }
}
