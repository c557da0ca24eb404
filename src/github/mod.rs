mod client;
mod inspect;
mod model;
mod source;

pub use client::{DEFAULT_API_URL, GithubClient};
pub use inspect::{enumerate_repos, inspect_remote, scan_remote};
pub use model::{
    Account, ApiCommit, CommitDetail, Comparison, GitActor, Organization, PullRequest, RemoteRepo,
    Tag,
};
pub use source::{FilterRules, RemoteSource, RepoFilter};
