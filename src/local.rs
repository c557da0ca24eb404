use std::path::{Path, PathBuf};
use std::thread;

use tracing::debug;

use crate::classify::owner_repo_from_url;
use crate::error::ScanError;
use crate::git::{
    BranchListing, FetchOutcome, GitRunner, fetch_origin, list_branches, remote_url, stash_count,
    unmerged_branches, working_tree_status,
};
use crate::scan::{filter_submodules, find_repos};
use crate::schedule::Scheduler;
use crate::system::FsOps;
use crate::types::{LocalOptions, RepositoryStatus, StatusMap};

pub const DEFAULT_ROOT: &str = "~/src";

/// Discover repositories under the configured roots, drop submodules, and
/// inspect the rest with at most `opts.concurrency` inspections in flight.
///
/// # Errors
/// Fails with the first fatal inspection error; see [`inspect_local`].
pub fn scan_local(
    opts: &LocalOptions,
    fs: &dyn FsOps,
    git: &dyn GitRunner,
) -> Result<StatusMap, ScanError> {
    let roots = if opts.roots.is_empty() {
        vec![PathBuf::from(DEFAULT_ROOT)]
    } else {
        opts.roots.clone()
    };
    let repos = find_repos(fs, &roots, opts.depth);
    debug!(roots = roots.len(), repos_found = repos.len(), "discovery complete");

    let scheduler = Scheduler::new(opts.concurrency)?.with_progress(opts.progress);
    let repos = filter_submodules(repos, git, &scheduler);
    scheduler.reconcile(repos, |repo| inspect_local(&repo, opts, git))
}

/// Inspect one working copy.
///
/// Fetching from `origin` is best effort. A missing upstream, an empty
/// stash list, or an unborn HEAD are ordinary states, not errors.
///
/// # Errors
/// Returns a [`ScanError`] naming the git step and repository when git
/// cannot be launched or a mandatory step exits unsuccessfully.
pub fn inspect_local(
    repo: &Path,
    opts: &LocalOptions,
    git: &dyn GitRunner,
) -> Result<RepositoryStatus, ScanError> {
    let remote_url = remote_url(repo, git)?;
    let stale_tracking = match (&remote_url, opts.refresh_remotes) {
        (Some(_), true) => fetch_origin(repo, git, opts.fetch_timeout) != FetchOutcome::Refreshed,
        (None, _) => {
            debug!(repo = %repo.display(), "no origin remote");
            false
        }
        (Some(_), false) => false,
    };

    let BranchListing { current, branches } = list_branches(repo, git)?;

    let name = remote_url
        .as_deref()
        .and_then(owner_repo_from_url)
        .unwrap_or_else(|| repo.display().to_string());

    let tracking = current
        .as_ref()
        .and_then(|b| branches.get(b))
        .filter(|b| b.has_upstream)
        .copied();
    let (ahead, behind) = tracking.map_or((0, 0), |b| (b.ahead, b.behind));

    let (working_tree, stash, unmerged) = thread::scope(|s| {
        let stash = s.spawn(|| stash_count(repo, git));
        let unmerged = s.spawn(|| unmerged_branches(repo, git));
        let working_tree = working_tree_status(repo, git);
        (working_tree, join(stash), join(unmerged))
    });

    let unmerged_branches = unmerged?
        .into_iter()
        .filter(|b| branches.contains_key(b))
        .collect();

    Ok(RepositoryStatus {
        name,
        remote_url,
        path: Some(repo.to_path_buf()),
        current_branch: current,
        branches,
        ahead,
        behind,
        local_branch_only: tracking.is_none(),
        stale_tracking,
        working_tree_status: Some(working_tree?),
        stash_count: Some(stash?),
        unmerged_branches,
        ..RepositoryStatus::default()
    })
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
}
