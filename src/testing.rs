use std::io;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::Mutex;
use std::time::Duration;

use crate::git::GitRunner;

struct Reply {
    prefix: String,
    repo: Option<PathBuf>,
    code: i32,
    stdout: String,
    stderr: String,
}

/// Scripted git: replies are matched by argument prefix, most recent first.
/// Unmatched invocations succeed with empty output.
#[derive(Default)]
pub(crate) struct FakeGit {
    replies: Vec<Reply>,
    work_trees: Vec<PathBuf>,
    fetch_times_out: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeGit {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, prefix: &str, stdout: &str) -> Self {
        self.reply(prefix, None, 0, stdout, "")
    }

    pub(crate) fn fail(self, prefix: &str, code: i32, stderr: &str) -> Self {
        self.reply(prefix, None, code, "", stderr)
    }

    pub(crate) fn fail_in(self, repo: &Path, prefix: &str, code: i32, stderr: &str) -> Self {
        self.reply(prefix, Some(repo.to_path_buf()), code, "", stderr)
    }

    /// Directories at or below `dir` answer `true` to `--is-inside-work-tree`.
    pub(crate) fn work_tree(mut self, dir: PathBuf) -> Self {
        self.work_trees.push(dir);
        self
    }

    pub(crate) fn time_out_fetch(mut self) -> Self {
        self.fetch_times_out = true;
        self
    }

    pub(crate) fn was_called(&self, prefix: &str) -> bool {
        self.calls
            .lock()
            .map(|calls| calls.iter().any(|c| c.starts_with(prefix)))
            .unwrap_or(false)
    }

    fn reply(
        mut self,
        prefix: &str,
        repo: Option<PathBuf>,
        code: i32,
        stdout: &str,
        stderr: &str,
    ) -> Self {
        self.replies.push(Reply {
            prefix: prefix.to_string(),
            repo,
            code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        });
        self
    }
}

fn output(code: i32, stdout: &str, stderr: &str) -> Output {
    Output {
        status: ExitStatus::from_raw(code << 8),
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

impl GitRunner for FakeGit {
    fn run_git(&self, repo: &Path, args: &[&str]) -> io::Result<Output> {
        let joined = args.join(" ");
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(joined.clone());
        }

        if joined == "rev-parse --is-inside-work-tree" {
            let inside = self.work_trees.iter().any(|dir| repo.starts_with(dir));
            return Ok(if inside {
                output(0, "true\n", "")
            } else {
                output(128, "", "fatal: not a git repository\n")
            });
        }

        let reply = self.replies.iter().rev().find(|r| {
            joined.starts_with(&r.prefix) && r.repo.as_deref().is_none_or(|p| p == repo)
        });
        Ok(match reply {
            Some(r) => output(r.code, &r.stdout, &r.stderr),
            None => output(0, "", ""),
        })
    }

    fn run_git_with_timeout(
        &self,
        repo: &Path,
        args: &[&str],
        _timeout: Duration,
    ) -> io::Result<Output> {
        if self.fetch_times_out && args.first() == Some(&"fetch") {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(args.join(" "));
            }
            return Err(io::Error::new(io::ErrorKind::TimedOut, "git fetch timed out"));
        }
        self.run_git(repo, args)
    }
}
