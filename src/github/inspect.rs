use std::thread;

use tracing::debug;

use crate::classify::{latest_version, owner_repo_from_url};
use crate::error::ScanError;
use crate::schedule::Scheduler;
use crate::types::{ChangeRequest, CommitSummary, RemoteOptions, RepositoryStatus, StatusMap};

use super::model::{ApiCommit, RemoteRepo};
use super::source::{RemoteSource, RepoFilter};

/// Used when the API does not report a default branch.
const FALLBACK_BRANCH: &str = "master";

/// Enumerate the user's repositories and those of every organization they
/// belong to, then inspect each one that passes `filter`.
///
/// # Errors
/// Fails with the first listing or inspection error.
pub fn scan_remote(
    source: &dyn RemoteSource,
    filter: &RepoFilter,
    opts: &RemoteOptions,
) -> Result<StatusMap, ScanError> {
    let scheduler = Scheduler::new(opts.concurrency)?.with_progress(opts.progress);
    let repos = enumerate_repos(source, filter, &scheduler)?;
    debug!(repos = repos.len(), "enumeration complete");
    scheduler.reconcile(repos, |repo| inspect_remote(source, &repo))
}

/// # Errors
/// Returns an error when any listing call fails.
pub fn enumerate_repos(
    source: &dyn RemoteSource,
    filter: &RepoFilter,
    scheduler: &Scheduler,
) -> Result<Vec<RemoteRepo>, ScanError> {
    let mut repos = source
        .list_own_repos()
        .map_err(|err| ScanError::remote("github.repos", "user", err))?;
    let orgs = source
        .list_orgs()
        .map_err(|err| ScanError::remote("github.orgs", "user", err))?;
    let org_repos = scheduler.try_map(orgs, |org| {
        source
            .list_org_repos(&org.login)
            .map_err(|err| ScanError::remote("github.org_repos", org.login.as_str(), err))
    })?;

    repos.extend(org_repos.into_iter().flatten());
    repos.retain(|repo| filter.matches(repo));
    Ok(repos)
}

/// Inspect one hosted repository: its latest release tag, the commits on
/// the default branch since that tag, and its open pull requests.
///
/// # Errors
/// Returns an error naming the API step and repository when a call fails.
pub fn inspect_remote(
    source: &dyn RemoteSource,
    repo: &RemoteRepo,
) -> Result<RepositoryStatus, ScanError> {
    let remote_url = repo.clone_url.clone().or_else(|| repo.git_url.clone());
    let name = remote_url
        .as_deref()
        .and_then(owner_repo_from_url)
        .unwrap_or_else(|| repo.full_name.clone());

    let (release, pulls) = thread::scope(|s| {
        let pulls = s.spawn(|| open_change_requests(source, repo));
        let release = release_status(source, repo);
        let pulls = pulls
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        (release, pulls)
    });
    let (latest_version, unreleased_commits) = release?;

    Ok(RepositoryStatus {
        name,
        remote_url,
        latest_version,
        unreleased_commits,
        open_change_requests: pulls?,
        ..RepositoryStatus::default()
    })
}

type ReleaseStatus = (Option<String>, Option<Vec<CommitSummary>>);

fn release_status(source: &dyn RemoteSource, repo: &RemoteRepo) -> Result<ReleaseStatus, ScanError> {
    if repo.fork {
        debug!(repo = %repo.full_name, "fork, skipping release history");
        return Ok((None, None));
    }

    let tags = source
        .list_tags(&repo.owner.login, &repo.name)
        .map_err(|err| ScanError::remote("github.tags", repo.full_name.as_str(), err))?;
    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    let Some(latest) = latest_version(&names) else {
        return Ok((None, None));
    };

    let head = repo.default_branch.as_deref().unwrap_or(FALLBACK_BRANCH);
    let comparison = source
        .diff_commits(&repo.owner.login, &repo.name, latest, head)
        .map_err(|err| ScanError::remote("github.compare", repo.full_name.as_str(), err))?;

    let commits: Vec<CommitSummary> = comparison.commits.iter().map(summarize_commit).collect();
    let commits = (!commits.is_empty()).then_some(commits);
    Ok((Some(latest.to_string()), commits))
}

fn open_change_requests(
    source: &dyn RemoteSource,
    repo: &RemoteRepo,
) -> Result<Option<Vec<ChangeRequest>>, ScanError> {
    // Open pull requests count toward open issues, so zero means none.
    if repo.open_issues_count == 0 {
        return Ok(None);
    }

    let pulls = source
        .list_open_pull_requests(&repo.owner.login, &repo.name)
        .map_err(|err| ScanError::remote("github.pulls", repo.full_name.as_str(), err))?;
    let requests: Vec<ChangeRequest> = pulls
        .into_iter()
        .map(|pull| ChangeRequest {
            id: pull.number,
            author: pull.user.map(|u| u.login).unwrap_or_default(),
            title: pull.title,
        })
        .collect();
    Ok((!requests.is_empty()).then_some(requests))
}

fn summarize_commit(commit: &ApiCommit) -> CommitSummary {
    let author = commit
        .author
        .as_ref()
        .map(|a| a.login.clone())
        .filter(|login| !login.is_empty())
        .or_else(|| commit.commit.author.as_ref().map(|a| a.name.clone()))
        .unwrap_or_default();
    CommitSummary {
        id: commit.sha.clone(),
        author,
        first_line_of_message: commit
            .commit
            .message
            .lines()
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::num::NonZeroUsize;
    use std::sync::Mutex;

    use super::*;
    use crate::error::RemoteError;
    use crate::github::model::{
        Account, CommitDetail, Comparison, GitActor, Organization, PullRequest, Tag,
    };

    #[derive(Default)]
    struct FakeSource {
        own: Vec<RemoteRepo>,
        orgs: HashMap<String, Vec<RemoteRepo>>,
        tags: HashMap<String, Vec<&'static str>>,
        commits: HashMap<String, Vec<ApiCommit>>,
        pulls: HashMap<String, Vec<PullRequest>>,
        broken: Option<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn record(&self, call: String) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(call);
            }
        }

        fn called(&self, prefix: &str) -> bool {
            self.calls
                .lock()
                .map(|calls| calls.iter().any(|c| c.starts_with(prefix)))
                .unwrap_or(false)
        }

        fn check(&self, full_name: &str) -> Result<(), RemoteError> {
            if self.broken == Some(full_name) {
                return Err(RemoteError::Status {
                    code: 500,
                    url: format!("https://api.github.com/repos/{full_name}/tags"),
                    body: "server error".to_string(),
                });
            }
            Ok(())
        }
    }

    impl RemoteSource for FakeSource {
        fn list_own_repos(&self) -> Result<Vec<RemoteRepo>, RemoteError> {
            Ok(self.own.clone())
        }

        fn list_orgs(&self) -> Result<Vec<Organization>, RemoteError> {
            let mut orgs: Vec<Organization> = self
                .orgs
                .keys()
                .map(|login| Organization {
                    login: login.clone(),
                })
                .collect();
            orgs.sort_by(|a, b| a.login.cmp(&b.login));
            Ok(orgs)
        }

        fn list_org_repos(&self, org: &str) -> Result<Vec<RemoteRepo>, RemoteError> {
            Ok(self.orgs.get(org).cloned().unwrap_or_default())
        }

        fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<Tag>, RemoteError> {
            let full = format!("{owner}/{repo}");
            self.record(format!("tags {full}"));
            self.check(&full)?;
            Ok(self
                .tags
                .get(&full)
                .map(|names| {
                    names
                        .iter()
                        .map(|n| Tag {
                            name: (*n).to_string(),
                        })
                        .collect()
                })
                .unwrap_or_default())
        }

        fn diff_commits(
            &self,
            owner: &str,
            repo: &str,
            base: &str,
            head: &str,
        ) -> Result<Comparison, RemoteError> {
            let full = format!("{owner}/{repo}");
            self.record(format!("compare {full} {base}...{head}"));
            Ok(Comparison {
                commits: self.commits.get(&full).cloned().unwrap_or_default(),
            })
        }

        fn list_open_pull_requests(
            &self,
            owner: &str,
            repo: &str,
        ) -> Result<Vec<PullRequest>, RemoteError> {
            let full = format!("{owner}/{repo}");
            self.record(format!("pulls {full}"));
            Ok(self.pulls.get(&full).cloned().unwrap_or_default())
        }
    }

    fn remote_repo(full_name: &str) -> RemoteRepo {
        let (owner, name) = full_name.split_once('/').expect("owner/name");
        RemoteRepo {
            name: name.to_string(),
            full_name: full_name.to_string(),
            owner: Account {
                login: owner.to_string(),
            },
            clone_url: Some(format!("https://github.com/{full_name}.git")),
            default_branch: Some("main".to_string()),
            ..RemoteRepo::default()
        }
    }

    fn commit(sha: &str, login: Option<&str>, name: &str, message: &str) -> ApiCommit {
        ApiCommit {
            sha: sha.to_string(),
            commit: CommitDetail {
                message: message.to_string(),
                author: Some(GitActor {
                    name: name.to_string(),
                }),
            },
            author: login.map(|l| Account {
                login: l.to_string(),
            }),
        }
    }

    #[test]
    fn latest_tag_and_unreleased_commits() {
        let mut source = FakeSource::default();
        source
            .tags
            .insert("acme/tool".into(), vec!["v1.2.0", "v1.10.0", "not-a-version"]);
        source.commits.insert(
            "acme/tool".into(),
            vec![
                commit("a1", Some("octo"), "Octo Cat", "Add feature\n\nDetails here"),
                commit("b2", None, "Jo Dev", "Fix typo"),
            ],
        );

        let status = inspect_remote(&source, &remote_repo("acme/tool")).expect("inspect");
        assert_eq!(status.name, "acme/tool");
        assert_eq!(status.latest_version.as_deref(), Some("v1.10.0"));
        let commits = status.unreleased_commits.expect("commits");
        assert_eq!(
            commits,
            vec![
                CommitSummary {
                    id: "a1".into(),
                    author: "octo".into(),
                    first_line_of_message: "Add feature".into(),
                },
                CommitSummary {
                    id: "b2".into(),
                    author: "Jo Dev".into(),
                    first_line_of_message: "Fix typo".into(),
                },
            ]
        );
        assert!(source.called("compare acme/tool v1.10.0...main"));
        assert!(status.path.is_none());
    }

    #[test]
    fn forks_skip_release_history() {
        let mut source = FakeSource::default();
        source.tags.insert("acme/fork".into(), vec!["v9.0.0"]);
        let repo = RemoteRepo {
            fork: true,
            ..remote_repo("acme/fork")
        };
        let status = inspect_remote(&source, &repo).expect("inspect");
        assert!(status.latest_version.is_none());
        assert!(status.unreleased_commits.is_none());
        assert!(!source.called("tags"));
    }

    #[test]
    fn no_version_tags_skips_compare() {
        let mut source = FakeSource::default();
        source.tags.insert("acme/tool".into(), vec!["release-1", "nightly"]);
        let status = inspect_remote(&source, &remote_repo("acme/tool")).expect("inspect");
        assert!(status.latest_version.is_none());
        assert!(!source.called("compare"));
    }

    #[test]
    fn up_to_date_release_omits_commits() {
        let mut source = FakeSource::default();
        source.tags.insert("acme/tool".into(), vec!["v2.0.0"]);
        let status = inspect_remote(&source, &remote_repo("acme/tool")).expect("inspect");
        assert_eq!(status.latest_version.as_deref(), Some("v2.0.0"));
        assert!(status.unreleased_commits.is_none());
    }

    #[test]
    fn pull_requests_only_listed_with_open_issues() {
        let mut source = FakeSource::default();
        source.pulls.insert(
            "acme/tool".into(),
            vec![PullRequest {
                number: 42,
                title: "Add widgets".into(),
                user: Some(Account {
                    login: "octo".into(),
                }),
            }],
        );

        let quiet = inspect_remote(&source, &remote_repo("acme/tool")).expect("inspect");
        assert!(quiet.open_change_requests.is_none());
        assert!(!source.called("pulls"));

        let busy = RemoteRepo {
            open_issues_count: 1,
            ..remote_repo("acme/tool")
        };
        let status = inspect_remote(&source, &busy).expect("inspect");
        assert_eq!(
            status.open_change_requests,
            Some(vec![ChangeRequest {
                id: 42,
                author: "octo".into(),
                title: "Add widgets".into(),
            }])
        );
    }

    #[test]
    fn issues_without_pull_requests_omit_field() {
        let source = FakeSource::default();
        let repo = RemoteRepo {
            open_issues_count: 4,
            ..remote_repo("acme/tool")
        };
        let status = inspect_remote(&source, &repo).expect("inspect");
        assert!(status.open_change_requests.is_none());
        assert!(source.called("pulls acme/tool"));
    }

    #[test]
    fn name_falls_back_to_full_name() {
        let source = FakeSource::default();
        let repo = RemoteRepo {
            clone_url: None,
            git_url: None,
            ..remote_repo("acme/tool")
        };
        let status = inspect_remote(&source, &repo).expect("inspect");
        assert_eq!(status.name, "acme/tool");
        assert!(status.remote_url.is_none());
    }

    #[test]
    fn scan_covers_own_and_org_repos() {
        let mut source = FakeSource::default();
        source.own = vec![remote_repo("me/dotfiles"), remote_repo("me/old")];
        source
            .orgs
            .insert("acme".into(), vec![remote_repo("acme/tool"), remote_repo("acme/site")]);
        source.orgs.insert("labs".into(), vec![remote_repo("labs/x")]);
        source.tags.insert("acme/tool".into(), vec!["v0.1.0"]);

        let filter = RepoFilter::new(|r| r.full_name != "me/old");
        let opts = RemoteOptions {
            concurrency: NonZeroUsize::new(3).expect("non-zero"),
            progress: false,
        };
        let map = scan_remote(&source, &filter, &opts).expect("scan");
        let names: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["acme/site", "acme/tool", "labs/x", "me/dotfiles"]);
        assert_eq!(map["acme/tool"].latest_version.as_deref(), Some("v0.1.0"));
    }

    #[test]
    fn api_failure_fails_the_scan() {
        let mut source = FakeSource::default();
        source.own = (0..10).map(|i| remote_repo(&format!("me/r{i}"))).collect();
        source.broken = Some("me/r7");
        let err = scan_remote(&source, &RepoFilter::all(), &RemoteOptions::default())
            .expect_err("scan fails");
        let message = err.to_string();
        assert!(message.contains("github.tags"), "{message}");
        assert!(message.contains("me/r7"), "{message}");
    }
}
