use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::github::{DEFAULT_API_URL, FilterRules};
use crate::types::{
    DEFAULT_FETCH_TIMEOUT, DEFAULT_LOCAL_CONCURRENCY, LocalOptions, RemoteOptions,
    default_remote_concurrency,
};

pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub local: LocalConfig,
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(skip)]
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LocalConfig {
    #[serde(default)]
    pub roots: Vec<PathBuf>,
    pub depth: Option<usize>,
    pub concurrency: Option<usize>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub fetch: Option<bool>,
    pub fetch_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct GithubConfig {
    pub token_env: Option<String>,
    pub api_url: Option<String>,
    pub concurrency: Option<usize>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub include_forks: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub include_archived: Option<bool>,
    #[serde(default)]
    pub owners: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Read and parse a TOML config file.
///
/// # Errors
/// Returns an error when the file cannot be read or is not valid config.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config_text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: Config = toml::from_str(&config_text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.path = Some(path.to_path_buf());
    Ok(config)
}

/// `~/.config/repostatus/config.toml`, before tilde expansion.
#[must_use]
pub fn default_config_path() -> PathBuf {
    PathBuf::from("~/.config/repostatus/config.toml")
}

impl Config {
    /// # Errors
    /// Returns an error when a configured value is out of range.
    pub fn local_options(&self) -> Result<LocalOptions, ConfigError> {
        let local = &self.local;
        let concurrency = match local.concurrency {
            Some(n) => self.non_zero("local.concurrency", n)?,
            None => DEFAULT_LOCAL_CONCURRENCY,
        };
        let fetch_timeout = match local.fetch_timeout_secs {
            Some(0) => return Err(self.invalid("local.fetch-timeout-secs must be positive")),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_FETCH_TIMEOUT,
        };
        Ok(LocalOptions {
            roots: local.roots.clone(),
            depth: local.depth,
            concurrency,
            refresh_remotes: local.fetch.unwrap_or(true),
            fetch_timeout,
            progress: false,
        })
    }

    /// # Errors
    /// Returns an error when a configured value is out of range.
    pub fn remote_options(&self) -> Result<RemoteOptions, ConfigError> {
        let concurrency = match self.github.concurrency {
            Some(n) => self.non_zero("github.concurrency", n)?,
            None => default_remote_concurrency(),
        };
        Ok(RemoteOptions {
            concurrency,
            progress: false,
        })
    }

    #[must_use]
    pub fn filter_rules(&self) -> FilterRules {
        let github = &self.github;
        FilterRules {
            include_forks: github.include_forks.unwrap_or(true),
            include_archived: github.include_archived.unwrap_or(true),
            owners: github.owners.clone(),
            exclude: github.exclude.clone(),
        }
    }

    #[must_use]
    pub fn api_url(&self) -> &str {
        self.github.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    #[must_use]
    pub fn token_env(&self) -> &str {
        self.github.token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV)
    }

    fn non_zero(&self, key: &str, n: usize) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(n).ok_or_else(|| self.invalid(&format!("{key} must be at least 1")))
    }

    fn invalid(&self, message: &str) -> ConfigError {
        ConfigError::Invalid {
            path: self.path.clone().unwrap_or_default(),
            message: message.to_string(),
        }
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<toml::Value>::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(toml::Value::Integer(i)) => Ok(Some(i == 1)),
        Some(toml::Value::Boolean(b)) => Ok(Some(b)),
        Some(other) => Err(serde::de::Error::custom(format!(
            "flag must be boolean or integer, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, contents).expect("write config");
        (temp, path)
    }

    #[test]
    fn empty_file_uses_defaults() {
        let (_temp, path) = write_config("");
        let config = load_config(&path).expect("load");
        let local = config.local_options().expect("local");
        assert!(local.roots.is_empty());
        assert_eq!(local.concurrency, DEFAULT_LOCAL_CONCURRENCY);
        assert_eq!(local.fetch_timeout, DEFAULT_FETCH_TIMEOUT);
        assert!(local.refresh_remotes);
        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert_eq!(config.token_env(), DEFAULT_TOKEN_ENV);
        assert!(config.filter_rules().include_forks);
    }

    #[test]
    fn reads_both_sections() {
        let (_temp, path) = write_config(
            "[local]\nroots = [\"~/work\", \"/srv/git\"]\ndepth = 3\nconcurrency = 4\nfetch = 0\nfetch-timeout-secs = 5\n\n\
             [github]\ntoken-env = \"GH_PAT\"\napi-url = \"https://ghe.example.com/api/v3\"\nconcurrency = 16\n\
             include-forks = false\nowners = [\"acme\"]\nexclude = [\"acme/legacy\"]\n",
        );
        let config = load_config(&path).expect("load");
        let local = config.local_options().expect("local");
        assert_eq!(local.roots, vec![PathBuf::from("~/work"), PathBuf::from("/srv/git")]);
        assert_eq!(local.depth, Some(3));
        assert_eq!(local.concurrency.get(), 4);
        assert!(!local.refresh_remotes);
        assert_eq!(local.fetch_timeout, Duration::from_secs(5));

        let remote = config.remote_options().expect("remote");
        assert_eq!(remote.concurrency.get(), 16);
        assert_eq!(config.token_env(), "GH_PAT");
        assert_eq!(config.api_url(), "https://ghe.example.com/api/v3");
        let rules = config.filter_rules();
        assert!(!rules.include_forks);
        assert!(rules.include_archived);
        assert_eq!(rules.owners, vec!["acme".to_string()]);
        assert_eq!(rules.exclude, vec!["acme/legacy".to_string()]);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let (_temp, path) = write_config("[local]\nconcurrency = 0\n");
        let config = load_config(&path).expect("load");
        let err = config.local_options().expect_err("invalid");
        let message = err.to_string();
        assert!(message.contains("local.concurrency"), "{message}");
        assert!(message.contains("config.toml"), "{message}");
    }

    #[test]
    fn unknown_keys_fail_to_parse() {
        let (_temp, path) = write_config("[local]\nroot = \"~/src\"\n");
        let err = load_config(&path).expect_err("parse error");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn bad_flag_type_is_reported() {
        let (_temp, path) = write_config("[local]\nfetch = \"yes\"\n");
        let err = load_config(&path).expect_err("parse error");
        assert!(err.to_string().contains("flag must be boolean or integer"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let temp = tempdir().expect("tempdir");
        let err = load_config(&temp.path().join("absent.toml")).expect_err("read error");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
