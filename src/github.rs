//! GitHub REST implementation of [`HostingClient`].
//!
//! Uses a blocking `reqwest` client so calls can be issued directly from the
//! rayon worker threads that fan out extraction and reconciliation.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::error::Result;
use crate::hosting::{
    Commit, FileContent, GitRef, HostingClient, HostingError, HostingResult, PublishRequest,
    Release, Repository,
};
use crate::repo_id::RepositoryIdentifier;

const API_VERSION: &str = "2022-11-28";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const BINARY_MEDIA_TYPE: &str = "application/octet-stream";
const RELEASES_PER_PAGE: usize = 100;

/// Client for the GitHub (or GitHub Enterprise) REST API.
pub struct GitHubClient {
    api_url: Url,
    token: Option<String>,
    http: Client,
}

#[derive(Deserialize)]
struct ContentsResponse {
    content: Option<String>,
    sha: String,
}

#[derive(Deserialize)]
struct CommitResponse {
    commit: CommitSha,
}

#[derive(Deserialize)]
struct CommitSha {
    sha: String,
}

#[derive(Deserialize)]
struct RefResponse {
    #[serde(rename = "ref")]
    name: String,
    object: CommitSha,
}

#[derive(Deserialize)]
struct RepositoryResponse {
    full_name: String,
    #[serde(default)]
    default_branch: String,
}

impl GitHubClient {
    /// Creates a client for the API rooted at `api_url`.
    pub fn new(api_url: &str, token: Option<String>) -> Result<Self> {
        let api_url = Url::parse(api_url)?;
        let http = Client::builder()
            .user_agent(concat!("depot-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HostingError::Transport {
                message: e.to_string(),
            })?;
        Ok(Self {
            api_url,
            token: token.filter(|t| !t.is_empty()),
            http,
        })
    }

    /// Builds `<api_url>/repos/<owner>/<repo>/<rest...>`.
    fn repo_endpoint(&self, repo: &RepositoryIdentifier, rest: &[&str]) -> HostingResult<Url> {
        let rest = rest
            .iter()
            .flat_map(|part| part.split('/'))
            .filter(|s| !s.is_empty());
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| HostingError::Transport {
                message: format!("API URL cannot be a base: {}", self.api_url),
            })?
            .pop_if_empty()
            .extend(["repos", repo.owner.as_str(), repo.repo.as_str()])
            .extend(rest);
        Ok(url)
    }

    fn send(&self, request: RequestBuilder, accept: &str) -> HostingResult<Response> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request
            .header(ACCEPT, accept)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .map_err(|e| HostingError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(classify_failure(status.as_u16(), &body))
    }

    fn send_json<T: for<'de> Deserialize<'de>>(&self, request: RequestBuilder) -> HostingResult<T> {
        self.send(request, JSON_MEDIA_TYPE)?
            .json()
            .map_err(|e| HostingError::Decode {
                message: e.to_string(),
            })
    }
}

/// Maps a non-success response onto a [`HostingError`].
///
/// GitHub error bodies are `{"message": "...", ...}`; the message is kept so
/// callers can tell a missing branch from a missing file.
pub fn classify_failure(status: u16, body: &str) -> HostingError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        404 => HostingError::NotFound { message },
        409 => HostingError::Conflict { message },
        422 if message.to_lowercase().contains("already exists") => {
            HostingError::Conflict { message }
        }
        _ => HostingError::Http { status, message },
    }
}

impl HostingClient for GitHubClient {
    fn list_releases(&self, repo: &RepositoryIdentifier) -> HostingResult<Vec<Release>> {
        let mut releases = Vec::new();
        let mut page = 1;
        loop {
            let mut url = self.repo_endpoint(repo, &["releases"])?;
            url.query_pairs_mut()
                .append_pair("per_page", &RELEASES_PER_PAGE.to_string())
                .append_pair("page", &page.to_string());
            debug!("GET {}", url);

            let batch: Vec<Release> = self.send_json(self.http.get(url))?;
            let done = batch.len() < RELEASES_PER_PAGE;
            releases.extend(batch);
            if done {
                return Ok(releases);
            }
            page += 1;
        }
    }

    fn download_asset(&self, repo: &RepositoryIdentifier, asset_id: u64) -> HostingResult<Vec<u8>> {
        let url = self.repo_endpoint(repo, &["releases", "assets", &asset_id.to_string()])?;
        debug!("GET {}", url);
        let response = self.send(self.http.get(url), BINARY_MEDIA_TYPE)?;
        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| HostingError::Transport {
                message: e.to_string(),
            })
    }

    fn get_file_content(
        &self,
        repo: &RepositoryIdentifier,
        branch: &str,
        path: &str,
    ) -> HostingResult<FileContent> {
        let mut url = self.repo_endpoint(repo, &["contents", path])?;
        url.query_pairs_mut().append_pair("ref", branch);
        debug!("GET {}", url);

        let contents: ContentsResponse = self.send_json(self.http.get(url))?;
        let base64_content = contents.content.ok_or_else(|| HostingError::Decode {
            message: format!("{} has no inline content", path),
        })?;
        Ok(FileContent {
            base64_content,
            revision: contents.sha,
        })
    }

    fn create_or_update_file(&self, request: &PublishRequest<'_>) -> HostingResult<Commit> {
        let url = self.repo_endpoint(request.repo, &["contents", request.path])?;
        let mut body = json!({
            "message": request.message,
            "content": STANDARD.encode(request.content),
            "branch": request.branch,
        });
        if let Some(revision) = request.revision {
            body["sha"] = Value::String(revision.to_string());
        }
        debug!("PUT {}", url);

        let response: CommitResponse = self.send_json(self.http.put(url).json(&body))?;
        Ok(Commit {
            sha: response.commit.sha,
        })
    }

    fn create_branch_ref(
        &self,
        repo: &RepositoryIdentifier,
        name: &str,
        from_object: &str,
    ) -> HostingResult<GitRef> {
        let url = self.repo_endpoint(repo, &["git", "refs"])?;
        let body = json!({
            "ref": format!("refs/heads/{}", name),
            "sha": from_object,
        });
        debug!("POST {}", url);

        let response: RefResponse = self.send_json(self.http.post(url).json(&body))?;
        Ok(GitRef {
            name: response.name,
            sha: response.object.sha,
        })
    }

    fn get_repository(&self, repo: &RepositoryIdentifier) -> HostingResult<Repository> {
        let url = self.repo_endpoint(repo, &[])?;
        debug!("GET {}", url);
        let response: RepositoryResponse = self.send_json(self.http.get(url))?;
        Ok(Repository {
            full_name: response.full_name,
            default_branch: response.default_branch,
        })
    }
}
