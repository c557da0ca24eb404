use tabled::builder::Builder;

use crate::types::RepositoryStatus;

use super::{
    TabStyle,
    style::{align_counts, apply_style, apply_title_line, render_empty},
};

const TITLE: &str = "Local Repositories";

fn count(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn branch_cell(status: &RepositoryStatus) -> String {
    let mut branch = status
        .current_branch
        .clone()
        .unwrap_or_else(|| "(detached)".to_string());
    if status.local_branch_only {
        branch.push_str(" (local)");
    }
    if status.stale_tracking {
        branch.push_str(" (stale)");
    }
    branch
}

pub(crate) fn render(rows: &[&RepositoryStatus], style: TabStyle) -> String {
    if rows.is_empty() {
        return render_empty(TITLE, style);
    }

    let mut builder = Builder::default();
    builder.push_record([
        "Repo", "Branch", "Ahead", "Behind", "Added", "Modified", "Deleted", "Untracked", "Stash",
        "Unmerged",
    ]);

    for status in rows {
        let tree = status.working_tree_status.as_ref();
        builder.push_record([
            status.name.clone(),
            branch_cell(status),
            status.ahead.to_string(),
            status.behind.to_string(),
            count(tree.map(|t| t.added)),
            count(tree.map(|t| t.modified)),
            count(tree.map(|t| t.deleted)),
            count(tree.map(|t| t.untracked)),
            count(status.stash_count),
            status.unmerged_branches.join(", "),
        ]);
    }

    let mut table = builder.build();
    apply_style(&mut table, style);
    // Columns: 0 Repo, 1 Branch, 2..9 counts, 9 Unmerged
    align_counts(&mut table, 2, 9);
    apply_title_line(&mut table, TITLE, style);
    table.to_string()
}
