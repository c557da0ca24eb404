use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ScanError;
use crate::types::BranchStatus;

use super::GitRunner;
use super::step::run_required;

const BRANCH_FORMAT: &str =
    "--format=%(HEAD)%09%(refname:short)%09%(upstream:short)%09%(upstream:track)";

/// Local branches and which of them is checked out.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct BranchListing {
    pub(crate) current: Option<String>,
    pub(crate) branches: BTreeMap<String, BranchStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FetchOutcome {
    Refreshed,
    Failed,
    TimedOut,
}

/// Best-effort `git fetch origin`. Never fails the inspection.
pub(crate) fn fetch_origin(repo: &Path, git: &dyn GitRunner, timeout: Duration) -> FetchOutcome {
    match git.run_git_with_timeout(repo, &["fetch", "--quiet", "origin"], timeout) {
        Ok(out) if out.status.success() => FetchOutcome::Refreshed,
        Ok(out) => {
            debug!(
                repo = %repo.display(),
                stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                "fetch from origin failed"
            );
            FetchOutcome::Failed
        }
        Err(err) if err.kind() == io::ErrorKind::TimedOut => {
            warn!(repo = %repo.display(), "timeout: fetch from origin");
            FetchOutcome::TimedOut
        }
        Err(err) => {
            debug!(repo = %repo.display(), error = %err, "fetch from origin failed");
            FetchOutcome::Failed
        }
    }
}

pub(crate) fn remote_url(repo: &Path, git: &dyn GitRunner) -> Result<Option<String>, ScanError> {
    let text = run_required(repo, git, "git.remote", &["remote", "-v"])?;
    Ok(parse_origin_fetch_url(&text))
}

pub(crate) fn list_branches(repo: &Path, git: &dyn GitRunner) -> Result<BranchListing, ScanError> {
    let text = run_required(
        repo,
        git,
        "git.branch",
        &["for-each-ref", BRANCH_FORMAT, "refs/heads"],
    )?;
    Ok(parse_branch_listing(&text))
}

pub(crate) fn is_inside_work_tree(dir: &Path, git: &dyn GitRunner) -> bool {
    git.run_git(dir, &["rev-parse", "--is-inside-work-tree"])
        .map(|o| o.status.success() && String::from_utf8_lossy(&o.stdout).trim() == "true")
        .unwrap_or(false)
}

fn parse_origin_fetch_url(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some("origin"), Some(url), Some("(fetch)")) => Some(url.to_string()),
            _ => None,
        }
    })
}

fn parse_branch_listing(text: &str) -> BranchListing {
    let mut listing = BranchListing::default();
    for line in text.lines() {
        let mut fields = line.split('\t');
        let head = fields.next().unwrap_or_default();
        let Some(name) = fields.next().map(str::trim).filter(|n| !n.is_empty()) else {
            continue;
        };
        // `(HEAD detached at ...)` and `(no branch, ...)` are states, not branches.
        if name.starts_with('(') {
            continue;
        }
        let upstream = fields.next().unwrap_or_default().trim();
        let track = fields.next().unwrap_or_default().trim();

        let status = if upstream.is_empty() || track == "[gone]" {
            BranchStatus::default()
        } else {
            let (ahead, behind) = parse_track(track);
            BranchStatus {
                has_upstream: true,
                ahead,
                behind,
            }
        };
        if head.trim() == "*" {
            listing.current = Some(name.to_string());
        }
        listing.branches.insert(name.to_string(), status);
    }
    listing
}

/// Parse `%(upstream:track)` output such as `[ahead 2, behind 1]`.
fn parse_track(track: &str) -> (u64, u64) {
    let inner = track.trim_start_matches('[').trim_end_matches(']');
    let mut ahead = 0;
    let mut behind = 0;
    for part in inner.split(',') {
        let mut words = part.split_whitespace();
        let count = |w: Option<&str>| w.and_then(|v| v.parse::<u64>().ok()).unwrap_or(0);
        match words.next() {
            Some("ahead") => ahead = count(words.next()),
            Some("behind") => behind = count(words.next()),
            _ => {}
        }
    }
    (ahead, behind)
}
