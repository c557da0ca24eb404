use serde::Deserialize;

/// Raw repository record as listed by `/user/repos` and `/orgs/{org}/repos`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteRepo {
    pub name: String,
    pub full_name: String,
    pub owner: Account,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub clone_url: Option<String>,
    #[serde(default)]
    pub git_url: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Account {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Comparison {
    #[serde(default)]
    pub commits: Vec<ApiCommit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCommit {
    pub sha: String,
    pub commit: CommitDetail,
    /// Linked account; absent when the author email maps to no user.
    #[serde(default)]
    pub author: Option<Account>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: Option<GitActor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitActor {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub user: Option<Account>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_repository_listing() {
        let json = r#"[{
            "id": 1,
            "name": "tool",
            "full_name": "acme/tool",
            "owner": {"login": "acme", "id": 9},
            "fork": false,
            "open_issues_count": 3,
            "clone_url": "https://github.com/acme/tool.git",
            "git_url": "git://github.com/acme/tool.git",
            "default_branch": "main"
        }]"#;
        let repos: Vec<RemoteRepo> = serde_json::from_str(json).expect("decode");
        assert_eq!(repos[0].owner.login, "acme");
        assert_eq!(repos[0].open_issues_count, 3);
        assert_eq!(repos[0].default_branch.as_deref(), Some("main"));
        assert!(!repos[0].archived);
    }

    #[test]
    fn decodes_commit_without_linked_account() {
        let json = r#"{"commits": [{
            "sha": "abc123",
            "commit": {"message": "Fix it\n\nLong body", "author": {"name": "Jo Dev", "email": "jo@example.com"}},
            "author": null
        }]}"#;
        let comparison: Comparison = serde_json::from_str(json).expect("decode");
        let commit = &comparison.commits[0];
        assert!(commit.author.is_none());
        assert_eq!(
            commit.commit.author.as_ref().map(|a| a.name.as_str()),
            Some("Jo Dev")
        );
    }
}
