//! # Reconciler
//!
//! Brings each destination route in line with the depot JSON assembled for
//! its track. Per route the steps are strictly sequential:
//!
//! 1.  Read the route with [`remote::read`].
//! 2.  If the branch is missing, provision it; if only the file is missing,
//!     make sure the repository itself exists. Either way the baseline is
//!     empty content with no revision.
//! 3.  Compare the desired content with the baseline byte for byte.
//! 4.  Publish when they differ, passing the revision when there is one.
//!
//! Routes touch disjoint `(branch, path)` pairs, so [`reconcile`] runs them in
//! parallel. A route that fails never stops its siblings.

use std::fmt;

use log::{error, info};
use rayon::prelude::*;
use thiserror::Error;

use crate::branch::ensure_branch;
use crate::config::DestinationRoute;
use crate::depot::Track;
use crate::hosting::{HostingClient, HostingError, PublishRequest};
use crate::message;
use crate::remote::{self, AbsenceReason, RemoteState};
use crate::repo_id::RepositoryIdentifier;

/// Why a route could not be brought up to date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteFailure {
    #[error("reading the current depot failed: {0}")]
    ReadFailed(HostingError),

    /// Aborts the whole run.
    #[error("destination repository does not exist")]
    RepositoryNotFound,

    #[error("creating the branch failed: {0}")]
    BranchCreationFailed(HostingError),

    #[error("publishing failed: {0}")]
    PublishFailed(HostingError),
}

/// Terminal state of one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Remote content already matched; nothing was written.
    UpToDate,
    /// A commit was made. `created` is true when no file existed before.
    Published { created: bool },
    Failed(RouteFailure),
}

impl RouteOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, RouteOutcome::Failed(_))
    }
}

impl fmt::Display for RouteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteOutcome::UpToDate => write!(f, "up to date"),
            RouteOutcome::Published { created: true } => write!(f, "created"),
            RouteOutcome::Published { created: false } => write!(f, "updated"),
            RouteOutcome::Failed(failure) => write!(f, "failed: {}", failure),
        }
    }
}

/// Desired content for one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePlan {
    pub track: Track,
    pub route: DestinationRoute,
    pub desired: String,
}

/// A plan together with how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteReport {
    pub track: Track,
    pub route: DestinationRoute,
    pub outcome: RouteOutcome,
}

/// Reads, provisions, compares and publishes one route.
pub fn reconcile_route(
    client: &dyn HostingClient,
    repo: &RepositoryIdentifier,
    plan: &RoutePlan,
    message_override: Option<&str>,
) -> RouteOutcome {
    let route = &plan.route;

    let (baseline, revision) = match remote::read(client, repo, route) {
        Ok(RemoteState::Present(file)) => (file.content, Some(file.revision)),
        Ok(RemoteState::Absent(AbsenceReason::BranchNotFound)) => {
            if let Err(e) = ensure_branch(client, repo, &route.branch) {
                return RouteOutcome::Failed(RouteFailure::BranchCreationFailed(e));
            }
            (String::new(), None)
        }
        Ok(RemoteState::Absent(AbsenceReason::FileNotFound)) => {
            match client.get_repository(repo) {
                Ok(_) => (String::new(), None),
                Err(HostingError::NotFound { .. }) => {
                    return RouteOutcome::Failed(RouteFailure::RepositoryNotFound)
                }
                Err(e) => return RouteOutcome::Failed(RouteFailure::ReadFailed(e)),
            }
        }
        Err(e) => return RouteOutcome::Failed(RouteFailure::ReadFailed(e)),
    };

    if plan.desired == baseline {
        return RouteOutcome::UpToDate;
    }

    let message = match message_override {
        Some(text) => text.to_string(),
        None => message::compose(plan.track, &baseline, &plan.desired),
    };
    let request = PublishRequest {
        repo,
        branch: &route.branch,
        path: &route.path,
        content: &plan.desired,
        message: &message,
        revision: revision.as_deref(),
    };
    match client.create_or_update_file(&request) {
        Ok(_) => RouteOutcome::Published {
            created: revision.is_none(),
        },
        Err(e) => RouteOutcome::Failed(RouteFailure::PublishFailed(e)),
    }
}

/// Reconciles every plan, in parallel. Reports come back in plan order.
pub fn reconcile(
    client: &dyn HostingClient,
    repo: &RepositoryIdentifier,
    plans: &[RoutePlan],
    message_override: Option<&str>,
) -> Vec<RouteReport> {
    plans
        .par_iter()
        .map(|plan| {
            let outcome = reconcile_route(client, repo, plan, message_override);
            let target = format!("{} depot at {}/{}", plan.track, repo, plan.route);
            match &outcome {
                RouteOutcome::Failed(failure) => error!("{}: {}", target, failure),
                _ => info!("{}: {}", target, outcome),
            }
            RouteReport {
                track: plan.track,
                route: plan.route.clone(),
                outcome,
            }
        })
        .collect()
}
