//! Branch Provisioner: creates destination branches that do not exist yet.
//!
//! A new branch is a ref pointing at git's empty tree, which gives an
//! orphan branch with no files and no history for the first depot commit to
//! land on.

use log::info;

use crate::defaults::EMPTY_TREE_HASH;
use crate::hosting::{HostingClient, HostingError};
use crate::repo_id::RepositoryIdentifier;

/// Result of [`ensure_branch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchProvision {
    Created,
    /// Another writer created it first, or the branch-absent read was stale.
    AlreadyExists,
}

/// Creates `branch` as an empty orphan branch.
///
/// A conflict means the branch exists, which is what the caller wanted.
pub fn ensure_branch(
    client: &dyn HostingClient,
    repo: &RepositoryIdentifier,
    branch: &str,
) -> Result<BranchProvision, HostingError> {
    match client.create_branch_ref(repo, branch, EMPTY_TREE_HASH) {
        Ok(git_ref) => {
            info!("Created branch {} in {} ({})", branch, repo, git_ref.name);
            Ok(BranchProvision::Created)
        }
        Err(HostingError::Conflict { .. }) => Ok(BranchProvision::AlreadyExists),
        Err(error) => Err(error),
    }
}
