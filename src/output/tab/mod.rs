use clap::ValueEnum;

use crate::types::{RepositoryStatus, StatusMap};

mod local;
mod remote;
mod style;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum TabStyle {
    Rounded,
    Modern,
    ModernRounded,
    Ascii,
    AsciiRounded,
    Psql,
    Markdown,
    Extended,
    Sharp,
    Dots,
    ReStructuredText,
    Blank,
    Empty,
}

/// Render local working copies and hosted repositories as separate tables.
/// With `actionable_only`, rows with nothing to act on are left out.
#[must_use]
pub fn format_tab(data: &StatusMap, style: TabStyle, actionable_only: bool) -> String {
    let keep = |s: &&RepositoryStatus| !actionable_only || super::is_actionable(s);
    let (local, remote): (Vec<&RepositoryStatus>, Vec<&RepositoryStatus>) =
        data.values().filter(keep).partition(|s| s.path.is_some());

    let mut sections = Vec::with_capacity(2);
    if !local.is_empty() || remote.is_empty() {
        sections.push(local::render(&local, style));
    }
    if !remote.is_empty() {
        sections.push(remote::render(&remote, style));
    }
    sections.join("\n")
}
