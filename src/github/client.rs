use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::RemoteError;

use super::model::{Comparison, Organization, PullRequest, RemoteRepo, Tag};
use super::source::RemoteSource;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("repostatus/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ATTEMPTS: u32 = 3;
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// GitHub REST v3 client over a blocking `ureq` agent.
pub struct GithubClient {
    agent: ureq::Agent,
    api_url: String,
    token: Option<String>,
}

impl GithubClient {
    #[must_use]
    pub fn new(api_url: &str, token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    fn get_paginated<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, RemoteError> {
        let mut items = Vec::new();
        let mut next = Some(self.url(path));
        while let Some(url) = next {
            let (page, link): (Vec<T>, _) = self.get_json(&url)?;
            items.extend(page);
            next = link;
        }
        Ok(items)
    }

    /// Fetch one JSON document, returning it with the `rel="next"` page link.
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<(T, Option<String>), RemoteError> {
        let mut attempt = 1;
        loop {
            let mut request = self
                .agent
                .get(url)
                .set("Accept", "application/vnd.github+json")
                .set("X-GitHub-Api-Version", "2022-11-28");
            if let Some(token) = &self.token {
                request = request.set("Authorization", &format!("Bearer {token}"));
            }
            debug!(url, attempt, "GET");

            match request.call() {
                Ok(response) => {
                    let next = response.header("link").and_then(next_link);
                    let body = response
                        .into_json::<T>()
                        .map_err(|source| RemoteError::Decode {
                            url: url.to_string(),
                            source,
                        })?;
                    return Ok((body, next));
                }
                Err(ureq::Error::Status(code, response)) => {
                    let wait = rate_limit_wait(
                        code,
                        response.header("retry-after"),
                        response.header("x-ratelimit-remaining"),
                        response.header("x-ratelimit-reset"),
                        now_secs(),
                    );
                    if let Some(wait) = wait
                        && attempt < MAX_ATTEMPTS
                    {
                        warn!(url, code, wait_secs = wait.as_secs(), "rate limited, backing off");
                        thread::sleep(wait);
                        attempt += 1;
                        continue;
                    }
                    let body = response.into_string().unwrap_or_default();
                    return Err(RemoteError::Status {
                        code,
                        url: url.to_string(),
                        body: body.trim().to_string(),
                    });
                }
                Err(ureq::Error::Transport(transport)) => {
                    return Err(RemoteError::Transport {
                        url: url.to_string(),
                        message: transport.to_string(),
                    });
                }
            }
        }
    }
}

impl RemoteSource for GithubClient {
    fn list_own_repos(&self) -> Result<Vec<RemoteRepo>, RemoteError> {
        self.get_paginated("/user/repos?affiliation=owner&per_page=100")
    }

    fn list_orgs(&self) -> Result<Vec<Organization>, RemoteError> {
        self.get_paginated("/user/orgs?per_page=100")
    }

    fn list_org_repos(&self, org: &str) -> Result<Vec<RemoteRepo>, RemoteError> {
        self.get_paginated(&format!("/orgs/{org}/repos?per_page=100"))
    }

    fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<Tag>, RemoteError> {
        self.get_paginated(&format!("/repos/{owner}/{repo}/tags?per_page=100"))
    }

    fn diff_commits(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Comparison, RemoteError> {
        // Compare pages its commit list like any other listing.
        let mut comparison = Comparison::default();
        let mut next = Some(self.url(&format!(
            "/repos/{owner}/{repo}/compare/{base}...{head}?per_page=100"
        )));
        while let Some(url) = next {
            let (page, link): (Comparison, _) = self.get_json(&url)?;
            comparison.commits.extend(page.commits);
            next = link;
        }
        Ok(comparison)
    }

    fn list_open_pull_requests(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<PullRequest>, RemoteError> {
        self.get_paginated(&format!("/repos/{owner}/{repo}/pulls?state=open&per_page=100"))
    }
}

/// Extract the `rel="next"` target from an RFC 8288 `Link` header.
fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|p| p.trim() == "rel=\"next\"");
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(ToString::to_string)
    })
}

/// How long to wait before retrying a throttled request, if at all.
fn rate_limit_wait(
    code: u16,
    retry_after: Option<&str>,
    remaining: Option<&str>,
    reset: Option<&str>,
    now: u64,
) -> Option<Duration> {
    if code != 403 && code != 429 {
        return None;
    }
    if let Some(secs) = retry_after.and_then(|v| v.trim().parse::<u64>().ok()) {
        return Some(Duration::from_secs(secs).min(MAX_BACKOFF));
    }
    if remaining.map(str::trim) == Some("0") {
        let reset = reset.and_then(|v| v.trim().parse::<u64>().ok())?;
        return Some(Duration::from_secs(reset.saturating_sub(now).max(1)).min(MAX_BACKOFF));
    }
    None
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
