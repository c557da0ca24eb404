use std::sync::LazyLock;

use regex::Regex;

// A scheme URL (`https://host/...`, `ssh://git@host:22/...`) or an scp-style
// address (`git@host:...`, `host:...`), followed by at least `owner/repo`.
// An scp path may not start with `/`, which keeps `file:///...` out.
static REMOTE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[A-Za-z][A-Za-z0-9+.-]*://[^/]+/(?:.*/)?|(?:[^@/\s]+@)?[^:/\s]+:(?:[^/]\S*/)?)([^/:]+)/([^/]+?)(?:\.git)?/?$",
    )
    .expect("remote url pattern")
});

/// Extract the canonical `owner/repo` name from a remote URL, taking exactly
/// the last two path segments with any `.git` suffix removed.
#[must_use]
pub fn owner_repo_from_url(url: &str) -> Option<String> {
    let captures = REMOTE_URL.captures(url.trim())?;
    let owner = captures.get(1)?.as_str();
    let repo = captures.get(2)?.as_str();
    if repo.is_empty() {
        return None;
    }
    Some(format!("{owner}/{repo}"))
}
