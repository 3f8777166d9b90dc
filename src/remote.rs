//! # Remote State Reader
//!
//! Fetches what a destination route currently holds, and classifies why it
//! holds nothing.
//!
//! The platform answers "not found" both when the file is missing and when
//! the branch it was asked to read from does not exist. Those cases need
//! different repairs (create the file vs. create the branch first), so
//! [`read`] tells them apart from the response message. Every other failure
//! (permissions, rate limits, transport) is returned as an error: treating
//! it as "absent" would make the reconciler overwrite a file it could simply
//! not see.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;

use crate::config::DestinationRoute;
use crate::hosting::{HostingClient, HostingError, HostingResult, MISSING_REF_MESSAGE};
use crate::repo_id::RepositoryIdentifier;

/// Content currently stored at a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Decoded file content.
    pub content: String,
    /// Revision token to pass when overwriting.
    pub revision: String,
}

/// Why a route holds no content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsenceReason {
    FileNotFound,
    BranchNotFound,
}

/// What probing a route found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteState {
    Present(RemoteFile),
    Absent(AbsenceReason),
}

/// Decides whether a not-found message refers to the ref or to the path.
pub fn classify_not_found(message: &str) -> AbsenceReason {
    if message.contains(MISSING_REF_MESSAGE) {
        AbsenceReason::BranchNotFound
    } else {
        AbsenceReason::FileNotFound
    }
}

/// Decodes base64 file content, tolerating the line wrapping GitHub applies.
pub fn decode_content(encoded: &str) -> HostingResult<String> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD.decode(compact).map_err(|e| HostingError::Decode {
        message: format!("invalid base64 content: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| HostingError::Decode {
        message: format!("content is not UTF-8: {}", e),
    })
}

/// Reads one route with a single content request.
///
/// `Err` is the "unexpected" outcome and is fatal for the route.
pub fn read(
    client: &dyn HostingClient,
    repo: &RepositoryIdentifier,
    route: &DestinationRoute,
) -> HostingResult<RemoteState> {
    match client.get_file_content(repo, &route.branch, &route.path) {
        Ok(file) => Ok(RemoteState::Present(RemoteFile {
            content: decode_content(&file.base64_content)?,
            revision: file.revision,
        })),
        Err(HostingError::NotFound { message }) => {
            let reason = classify_not_found(&message);
            debug!("{} is absent ({:?}): {}", route, reason, message);
            Ok(RemoteState::Absent(reason))
        }
        Err(error) => Err(error),
    }
}
