use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// Aggregate scan result keyed by canonical `owner/repo` name.
pub type StatusMap = BTreeMap<String, RepositoryStatus>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchStatus {
    pub has_upstream: bool,
    pub ahead: u64,
    pub behind: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkingTreeStatus {
    pub added: u64,
    pub modified: u64,
    pub deleted: u64,
    pub untracked: u64,
}

impl WorkingTreeStatus {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.added == 0 && self.modified == 0 && self.deleted == 0 && self.untracked == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSummary {
    pub id: String,
    pub author: String,
    pub first_line_of_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRequest {
    pub id: u64,
    pub author: String,
    pub title: String,
}

/// One repository's reconciled state. Local scans fill the working-copy
/// fields; remote scans fill the release and change-request fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryStatus {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_branch: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub branches: BTreeMap<String, BranchStatus>,
    pub ahead: u64,
    pub behind: u64,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub local_branch_only: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stale_tracking: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_tree_status: Option<WorkingTreeStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stash_count: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unmerged_branches: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unreleased_commits: Option<Vec<CommitSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_change_requests: Option<Vec<ChangeRequest>>,
}

pub const DEFAULT_LOCAL_CONCURRENCY: NonZeroUsize = NonZeroUsize::new(10).unwrap();
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct LocalOptions {
    pub roots: Vec<PathBuf>,
    /// Maximum directory depth below each root; `None` walks the whole tree.
    pub depth: Option<usize>,
    pub concurrency: NonZeroUsize,
    pub refresh_remotes: bool,
    pub fetch_timeout: Duration,
    pub progress: bool,
}

impl Default for LocalOptions {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            depth: None,
            concurrency: DEFAULT_LOCAL_CONCURRENCY,
            refresh_remotes: true,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            progress: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RemoteOptions {
    pub concurrency: NonZeroUsize,
    pub progress: bool,
}

impl Default for RemoteOptions {
    fn default() -> Self {
        Self {
            concurrency: default_remote_concurrency(),
            progress: false,
        }
    }
}

#[must_use]
pub fn default_remote_concurrency() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get().max(4)).unwrap_or(NonZeroUsize::MIN)
}
