#![forbid(unsafe_code)]
#![deny(warnings, clippy::all, clippy::pedantic)]

pub mod json;
pub mod tab;

pub use json::to_json;
pub use tab::{TabStyle, format_tab};

use crate::types::RepositoryStatus;

/// True when a repository has something worth looking at: local work not yet
/// shared, upstream work not yet pulled, unreleased commits or open change
/// requests.
#[must_use]
pub fn is_actionable(status: &RepositoryStatus) -> bool {
    let dirty = status
        .working_tree_status
        .as_ref()
        .is_some_and(|tree| !tree.is_clean());
    let pending_remote = status
        .unreleased_commits
        .as_ref()
        .is_some_and(|commits| !commits.is_empty())
        || status
            .open_change_requests
            .as_ref()
            .is_some_and(|requests| !requests.is_empty());

    dirty
        || pending_remote
        || status.ahead > 0
        || status.behind > 0
        || status.local_branch_only
        || status.stash_count.is_some_and(|n| n > 0)
        || !status.unmerged_branches.is_empty()
}
