use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::git::{GitRunner, is_inside_work_tree};
use crate::schedule::Scheduler;
use crate::system::FsOps;

/// Every directory under `roots` holding a `.git` entry, sorted by path.
/// `depth` bounds how far below each root to look; `None` walks everything.
pub fn find_repos(fs: &dyn FsOps, roots: &[PathBuf], depth: Option<usize>) -> Vec<PathBuf> {
    let mut repos = HashSet::<PathBuf>::new();

    for root in roots {
        let root = fs.expand_tilde(root);
        if !root.exists() {
            debug!(root = %root.display(), "root missing");
            continue;
        }

        if fs.is_repo(&root) {
            debug!(repo = %root.display(), "repo");
            repos.insert(root.clone());
            continue;
        }

        let mut walker = WalkDir::new(&root).follow_links(false);
        if let Some(depth) = depth {
            walker = walker.max_depth(depth.saturating_add(1));
        }
        let mut entries = walker.into_iter();
        while let Some(entry) = entries.next() {
            let Ok(entry) = entry else { continue };
            if entry.file_name() != ".git" {
                continue;
            }
            if entry.file_type().is_dir() {
                entries.skip_current_dir();
            }
            if let Some(parent) = entry.path().parent() {
                debug!(repo = %parent.display(), "repo");
                repos.insert(parent.to_path_buf());
            }
        }
    }

    let mut v: Vec<_> = repos.into_iter().collect();
    v.sort_unstable();
    v
}

/// A repository root is a submodule (or a nested checkout) when its parent
/// directory already sits inside some work tree.
pub fn is_submodule(repo: &Path, git: &dyn GitRunner) -> bool {
    repo.parent()
        .is_some_and(|parent| is_inside_work_tree(parent, git))
}

/// Drop submodules from `repos`, probing on the scheduler's pool so the
/// `git` processes stay within its limit. Order is preserved.
pub fn filter_submodules(
    repos: Vec<PathBuf>,
    git: &dyn GitRunner,
    scheduler: &Scheduler,
) -> Vec<PathBuf> {
    scheduler.filter(repos, |repo| {
        let submodule = is_submodule(repo, git);
        if submodule {
            debug!(repo = %repo.display(), "skipping submodule");
        }
        !submodule
    })
}
