use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{step}: {repo} {message}")]
    Step {
        step: &'static str,
        repo: String,
        message: String,
    },
    #[error("{step}: {repo} failed to launch git: {source}")]
    Spawn {
        step: &'static str,
        repo: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{step}: {repo} {source}")]
    Remote {
        step: &'static str,
        repo: String,
        #[source]
        source: RemoteError,
    },
    #[error("failed to build scan thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl ScanError {
    pub(crate) fn remote(step: &'static str, repo: impl Into<String>, source: RemoteError) -> Self {
        Self::Remote {
            step,
            repo: repo.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("{url} returned HTTP {code}: {body}")]
    Status { code: u16, url: String, body: String },
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}
