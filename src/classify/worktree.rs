use crate::types::WorkingTreeStatus;

/// Declaration order is alphabetical by category name; the derived `Ord`
/// is what picks the winning category for a porcelain line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChangeCategory {
    Added,
    Deleted,
    Modified,
    Untracked,
}

impl ChangeCategory {
    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'A' => Some(Self::Added),
            'M' | 'R' | 'C' | 'U' => Some(Self::Modified),
            'D' => Some(Self::Deleted),
            '?' => Some(Self::Untracked),
            _ => None,
        }
    }
}

/// Classify one `git status --porcelain` line from its index and work-tree
/// codes. When both codes map to a category the lexicographically first
/// one wins, so `AM` counts as added and `MD` as deleted.
#[must_use]
pub fn classify_status_line(line: &str) -> Option<ChangeCategory> {
    let mut codes = line.chars();
    let index = codes.next().and_then(ChangeCategory::from_code);
    let work_tree = codes.next().and_then(ChangeCategory::from_code);
    index.into_iter().chain(work_tree).min()
}

#[must_use]
pub fn count_working_tree(porcelain: &str) -> WorkingTreeStatus {
    let mut counts = WorkingTreeStatus::default();
    for line in porcelain.lines().filter(|l| !l.trim().is_empty()) {
        match classify_status_line(line) {
            Some(ChangeCategory::Added) => counts.added += 1,
            Some(ChangeCategory::Deleted) => counts.deleted += 1,
            Some(ChangeCategory::Modified) => counts.modified += 1,
            Some(ChangeCategory::Untracked) => counts.untracked += 1,
            None => {}
        }
    }
    counts
}
