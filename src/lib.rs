#![forbid(unsafe_code)]
#![deny(warnings, clippy::all, clippy::pedantic)]

pub mod classify;
pub mod config;
mod error;
mod git;
pub mod github;
mod local;
pub mod output;
mod scan;
mod schedule;
mod system;
#[cfg(all(test, unix))]
mod testing;
mod types;

pub use error::{ConfigError, RemoteError, ScanError};
pub use git::{DefaultGitRunner, GitRunner};
pub use local::{DEFAULT_ROOT, inspect_local, scan_local};
pub use scan::{filter_submodules, find_repos, is_submodule};
pub use schedule::Scheduler;
pub use system::{DefaultFsOps, FsOps};
pub use types::{
    BranchStatus, ChangeRequest, CommitSummary, DEFAULT_FETCH_TIMEOUT, DEFAULT_LOCAL_CONCURRENCY,
    LocalOptions, RemoteOptions, RepositoryStatus, StatusMap, WorkingTreeStatus,
    default_remote_concurrency,
};
