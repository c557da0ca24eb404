use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(25);
// Minimum wait for pipe readers once git has exited near the deadline.
const PIPE_GRACE: Duration = Duration::from_millis(100);

pub trait GitRunner: Send + Sync {
    /// Run the `git` command within the given `repo` with `args`.
    ///
    /// # Errors
    /// Returns an error if the `git` process cannot be spawned or fails during execution.
    fn run_git(&self, repo: &Path, args: &[&str]) -> io::Result<Output>;

    /// Like [`GitRunner::run_git`], but kills the process once `timeout` elapses.
    ///
    /// # Errors
    /// A process that outlives `timeout` yields an error of kind
    /// [`io::ErrorKind::TimedOut`]; spawn failures are returned as-is.
    fn run_git_with_timeout(
        &self,
        repo: &Path,
        args: &[&str],
        _timeout: Duration,
    ) -> io::Result<Output> {
        self.run_git(repo, args)
    }
}

pub struct DefaultGitRunner;

impl DefaultGitRunner {
    fn command(repo: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(repo)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl GitRunner for DefaultGitRunner {
    fn run_git(&self, repo: &Path, args: &[&str]) -> io::Result<Output> {
        Self::command(repo, args).output()
    }

    fn run_git_with_timeout(
        &self,
        repo: &Path,
        args: &[&str],
        timeout: Duration,
    ) -> io::Result<Output> {
        let mut child = Self::command(repo, args).spawn()?;
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                kill(&mut child);
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("git {} timed out after {}s", args.join(" "), timeout.as_secs()),
                ));
            }
            thread::sleep(POLL_INTERVAL);
        };

        // Helpers git spawned (an ssh control master, say) may keep the
        // pipes open long after git itself exits.
        Ok(Output {
            status,
            stdout: collect(&stdout, deadline, args),
            stderr: collect(&stderr, deadline, args),
        })
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send(buf);
    });
    rx
}

fn collect(pipe: &Receiver<Vec<u8>>, deadline: Instant, args: &[&str]) -> Vec<u8> {
    let wait = deadline
        .saturating_duration_since(Instant::now())
        .max(PIPE_GRACE);
    pipe.recv_timeout(wait).unwrap_or_else(|_| {
        debug!(command = %args.join(" "), "output pipe still open after exit, not waiting");
        Vec::new()
    })
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
