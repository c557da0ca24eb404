use crate::error::RemoteError;

use super::model::{Comparison, Organization, PullRequest, RemoteRepo, Tag};

/// Read-only view of a code-hosting service. Implementations own
/// pagination, authentication and rate-limit handling.
pub trait RemoteSource: Send + Sync {
    /// # Errors
    /// Returns an error when the listing cannot be fetched or decoded.
    fn list_own_repos(&self) -> Result<Vec<RemoteRepo>, RemoteError>;

    /// # Errors
    /// Returns an error when the listing cannot be fetched or decoded.
    fn list_orgs(&self) -> Result<Vec<Organization>, RemoteError>;

    /// # Errors
    /// Returns an error when the listing cannot be fetched or decoded.
    fn list_org_repos(&self, org: &str) -> Result<Vec<RemoteRepo>, RemoteError>;

    /// # Errors
    /// Returns an error when the listing cannot be fetched or decoded.
    fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<Tag>, RemoteError>;

    /// Commits reachable from `head` but not from `base`.
    ///
    /// # Errors
    /// Returns an error when the comparison cannot be fetched or decoded.
    fn diff_commits(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Comparison, RemoteError>;

    /// # Errors
    /// Returns an error when the listing cannot be fetched or decoded.
    fn list_open_pull_requests(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<PullRequest>, RemoteError>;
}

type Predicate = Box<dyn Fn(&RemoteRepo) -> bool + Send + Sync>;

/// Caller-supplied predicate over raw repository records.
#[derive(Default)]
pub struct RepoFilter {
    predicate: Option<Predicate>,
}

/// Declarative form of [`RepoFilter`], as read from configuration.
#[derive(Debug, Clone)]
pub struct FilterRules {
    pub include_forks: bool,
    pub include_archived: bool,
    /// Owners to keep; empty keeps every owner.
    pub owners: Vec<String>,
    /// Full `owner/name` entries to drop.
    pub exclude: Vec<String>,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            include_forks: true,
            include_archived: true,
            owners: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl RepoFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&RemoteRepo) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Some(Box::new(predicate)),
        }
    }

    #[must_use]
    pub fn from_rules(rules: FilterRules) -> Self {
        Self::new(move |repo| {
            (rules.include_forks || !repo.fork)
                && (rules.include_archived || !repo.archived)
                && (rules.owners.is_empty()
                    || rules
                        .owners
                        .iter()
                        .any(|o| o.eq_ignore_ascii_case(&repo.owner.login)))
                && !rules
                    .exclude
                    .iter()
                    .any(|e| e.eq_ignore_ascii_case(&repo.full_name))
        })
    }

    #[must_use]
    pub fn matches(&self, repo: &RemoteRepo) -> bool {
        self.predicate.as_ref().is_none_or(|p| p(repo))
    }
}

impl std::fmt::Debug for RepoFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoFilter")
            .field("custom", &self.predicate.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::model::Account;

    fn repo(full_name: &str, fork: bool, archived: bool) -> RemoteRepo {
        let (owner, name) = full_name.split_once('/').expect("owner/name");
        RemoteRepo {
            name: name.to_string(),
            full_name: full_name.to_string(),
            owner: Account {
                login: owner.to_string(),
            },
            fork,
            archived,
            ..RemoteRepo::default()
        }
    }

    #[test]
    fn default_filter_keeps_everything() {
        let filter = RepoFilter::all();
        assert!(filter.matches(&repo("acme/tool", true, true)));
    }

    #[test]
    fn rules_combine() {
        let filter = RepoFilter::from_rules(FilterRules {
            include_forks: false,
            include_archived: false,
            owners: vec!["Acme".to_string()],
            exclude: vec!["acme/legacy".to_string()],
        });
        assert!(filter.matches(&repo("acme/tool", false, false)));
        assert!(!filter.matches(&repo("acme/fork", true, false)));
        assert!(!filter.matches(&repo("acme/old", false, true)));
        assert!(!filter.matches(&repo("other/tool", false, false)));
        assert!(!filter.matches(&repo("acme/legacy", false, false)));
    }

    #[test]
    fn closures_filter_raw_records() {
        let filter = RepoFilter::new(|r| r.name.starts_with("svc-"));
        assert!(filter.matches(&repo("acme/svc-auth", false, false)));
        assert!(!filter.matches(&repo("acme/docs", false, false)));
    }
}
