//! Pure classifiers for raw git and API output. Nothing here performs I/O.

mod name;
mod version;
mod worktree;

pub use name::owner_repo_from_url;
pub use version::{
    Identifier, VERSION_TAG_PREFIX, Version, compare_version_tags, latest_version, parse_version,
};
pub use worktree::{ChangeCategory, classify_status_line, count_working_tree};
