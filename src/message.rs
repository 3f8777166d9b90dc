//! Commit message composer.
//!
//! Summarises what changed between the depot JSON currently published and
//! the JSON about to replace it. Entries are keyed by identity
//! (`name@version`); an entry whose identity survives but whose fields
//! differ counts as changed.

use std::collections::BTreeMap;

use crate::depot::{parse_depot, DepotEntry, Track};

fn entries(json: &str) -> Option<BTreeMap<String, DepotEntry>> {
    if json.trim().is_empty() {
        return None;
    }
    parse_depot(json).ok().map(|depot| {
        depot
            .into_iter()
            .map(|entry| (format!("{}@{}", entry.name, entry.version), entry))
            .collect()
    })
}

/// Composes the commit message for replacing `old_json` with `new_json`.
///
/// Empty or unreadable old content is treated as a fresh depot.
pub fn compose(track: Track, old_json: &str, new_json: &str) -> String {
    let new = entries(new_json).unwrap_or_default();
    let old = match entries(old_json) {
        Some(old) => old,
        None => {
            return format!("Create {} depot with {} template(s)", track, new.len());
        }
    };

    let added: Vec<&String> = new.keys().filter(|id| !old.contains_key(*id)).collect();
    let removed: Vec<&String> = old.keys().filter(|id| !new.contains_key(*id)).collect();
    let changed: Vec<&String> = new
        .iter()
        .filter(|(id, entry)| old.get(*id).is_some_and(|previous| previous != *entry))
        .map(|(id, _)| id)
        .collect();
    if added.is_empty() && removed.is_empty() && changed.is_empty() {
        return format!("Reformat {} depot", track);
    }

    let mut message = format!(
        "Update {} depot: add {}, change {}, remove {} template(s)\n",
        track,
        added.len(),
        changed.len(),
        removed.len()
    );
    for identity in added {
        message.push_str(&format!("\n+ {}", identity));
    }
    for identity in changed {
        message.push_str(&format!("\n~ {}", identity));
    }
    for identity in removed {
        message.push_str(&format!("\n- {}", identity));
    }
    message
}
