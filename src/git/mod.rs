mod refs;
mod runner;
mod status;
mod step;

pub use runner::{DefaultGitRunner, GitRunner};

pub(crate) use refs::{
    BranchListing, FetchOutcome, fetch_origin, is_inside_work_tree, list_branches, remote_url,
};
pub(crate) use status::{stash_count, unmerged_branches, working_tree_status};
