use std::path::Path;

use crate::error::ScanError;

use super::GitRunner;

/// Captured result of one git invocation that exited, successfully or not.
pub(crate) struct StepOutput {
    pub(crate) success: bool,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

impl StepOutput {
    pub(crate) fn stderr_contains(&self, needle: &str) -> bool {
        self.stderr.to_ascii_lowercase().contains(needle)
    }

    pub(crate) fn into_failure(self, step: &'static str, repo: &Path) -> ScanError {
        let message = if self.stderr.trim().is_empty() {
            "exited unsuccessfully".to_string()
        } else {
            self.stderr.trim().to_string()
        };
        ScanError::Step {
            step,
            repo: repo.display().to_string(),
            message,
        }
    }
}

/// Run git for `step`, mapping launch failures to [`ScanError::Spawn`].
pub(crate) fn run_step(
    repo: &Path,
    git: &dyn GitRunner,
    step: &'static str,
    args: &[&str],
) -> Result<StepOutput, ScanError> {
    let out = git
        .run_git(repo, args)
        .map_err(|source| ScanError::Spawn {
            step,
            repo: repo.display().to_string(),
            source,
        })?;
    Ok(StepOutput {
        success: out.status.success(),
        stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
    })
}

/// Run git for `step` and return stdout, treating any non-zero exit as fatal.
pub(crate) fn run_required(
    repo: &Path,
    git: &dyn GitRunner,
    step: &'static str,
    args: &[&str],
) -> Result<String, ScanError> {
    let out = run_step(repo, git, step, args)?;
    if out.success {
        Ok(out.stdout)
    } else {
        Err(out.into_failure(step, repo))
    }
}
