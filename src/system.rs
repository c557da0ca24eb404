use std::path::{Path, PathBuf};

pub trait FsOps: Sync {
    fn is_repo(&self, dir: &Path) -> bool;
    fn expand_tilde(&self, p: &Path) -> PathBuf;
}

pub struct DefaultFsOps;
impl FsOps for DefaultFsOps {
    // `.git` is a directory for ordinary clones and a gitfile for submodules
    // and linked worktrees.
    fn is_repo(&self, dir: &Path) -> bool {
        dir.join(".git").exists()
    }
    fn expand_tilde(&self, p: &Path) -> PathBuf {
        if let Some(home) = std::env::var_os("HOME") {
            let home = PathBuf::from(home);
            if p.starts_with("~")
                && let Ok(rest) = p.strip_prefix("~")
            {
                return home.join(rest);
            }
        }
        p.to_path_buf()
    }
}
