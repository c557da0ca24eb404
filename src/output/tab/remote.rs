use tabled::builder::Builder;

use crate::types::RepositoryStatus;

use super::{
    TabStyle,
    style::{align_counts, apply_style, apply_title_line, render_empty},
};

const TITLE: &str = "Remote Repositories";

pub(crate) fn render(rows: &[&RepositoryStatus], style: TabStyle) -> String {
    if rows.is_empty() {
        return render_empty(TITLE, style);
    }

    let mut builder = Builder::default();
    builder.push_record(["Repo", "Latest", "Unreleased", "Open PRs"]);

    for status in rows {
        builder.push_record([
            status.name.clone(),
            status.latest_version.clone().unwrap_or_else(|| "-".to_string()),
            status
                .unreleased_commits
                .as_ref()
                .map_or(0, Vec::len)
                .to_string(),
            status
                .open_change_requests
                .as_ref()
                .map_or(0, Vec::len)
                .to_string(),
        ]);
    }

    let mut table = builder.build();
    apply_style(&mut table, style);
    // Columns: 0 Repo, 1 Latest, 2 Unreleased, 3 Open PRs
    align_counts(&mut table, 2, 4);
    apply_title_line(&mut table, TITLE, style);
    table.to_string()
}
