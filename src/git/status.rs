use std::path::Path;

use crate::classify::count_working_tree;
use crate::error::ScanError;
use crate::types::WorkingTreeStatus;

use super::GitRunner;
use super::step::{run_required, run_step};

// stderr fragments git prints when HEAD has no commits yet.
const NO_COMMIT_PATTERNS: [&str; 3] = [
    "malformed object name",
    "not a valid object name",
    "no such commit",
];

pub(crate) fn working_tree_status(
    repo: &Path,
    git: &dyn GitRunner,
) -> Result<WorkingTreeStatus, ScanError> {
    let text = run_required(repo, git, "git.status", &["status", "--porcelain"])?;
    Ok(count_working_tree(&text))
}

pub(crate) fn stash_count(repo: &Path, git: &dyn GitRunner) -> Result<u64, ScanError> {
    let out = run_step(repo, git, "git.stash", &["stash", "list"])?;
    if !out.success {
        if out.stderr_contains("no stash") {
            return Ok(0);
        }
        return Err(out.into_failure("git.stash", repo));
    }
    Ok(count_lines(&out.stdout))
}

/// Branches whose tip is not reachable from HEAD.
pub(crate) fn unmerged_branches(repo: &Path, git: &dyn GitRunner) -> Result<Vec<String>, ScanError> {
    let out = run_step(
        repo,
        git,
        "git.unmerged",
        &["branch", "--no-merged", "HEAD", "--format=%(refname:short)"],
    )?;
    if !out.success {
        if NO_COMMIT_PATTERNS.iter().any(|p| out.stderr_contains(p)) {
            return Ok(Vec::new());
        }
        return Err(out.into_failure("git.unmerged", repo));
    }
    let mut names: Vec<String> = out
        .stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('('))
        .map(ToString::to_string)
        .collect();
    names.sort_unstable();
    Ok(names)
}

fn count_lines(s: &str) -> u64 {
    s.lines().filter(|l| !l.trim().is_empty()).count() as u64
}
