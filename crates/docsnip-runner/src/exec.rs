// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Run compiled snippets and classify how they ended.

use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::compiler::CompileError;
use crate::loader::{Artifact, LoadError};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
/// How long output is still collected once the snippet process is gone.
/// Background children that inherited the pipes can hold them open forever.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// How one snippet ended.
#[derive(Debug)]
pub enum Outcome {
    Passed,
    Failed(Failure),
    Errored(InfraError),
}

/// Why a snippet that ran did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// `None` when the process was killed by a signal or the watchdog.
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub stdout: String,
    pub stderr: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.timed_out, self.exit_code) {
            (true, _) => write!(f, "killed after timeout"),
            (false, Some(code)) => write!(f, "exit status: {}", code),
            (false, None) => write!(f, "terminated by signal"),
        }
    }
}

/// A snippet that never got to run.
#[derive(Debug, thiserror::Error)]
pub enum InfraError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("cannot start {}: {source}", path.display())]
    Launch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Runs a loaded artifact.
pub trait Executor {
    fn execute(&self, artifact: &Artifact) -> Outcome;
}

/// Runs artifacts as child processes with a watchdog.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    timeout: Option<Duration>,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new(Some(Duration::from_secs(60)))
    }
}

impl ProcessExecutor {
    /// `None` lets snippets run forever.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn run(&self, mut cmd: Command) -> Outcome {
        let program = PathBuf::from(cmd.get_program());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        let mut child = match cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(source) => {
                return Outcome::Errored(InfraError::Launch {
                    path: program,
                    source,
                })
            }
        };

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let waited = self.wait(&mut child);
        let deadline = Instant::now() + DRAIN_GRACE;
        let stdout = collect(stdout, deadline);
        let stderr = collect(stderr, deadline);

        let (status, timed_out) = match waited {
            Ok(result) => result,
            Err(source) => {
                return Outcome::Errored(InfraError::Launch {
                    path: program,
                    source,
                })
            }
        };

        if status.success() && !timed_out {
            tracing::debug!(program = %program.display(), "snippet passed");
            return Outcome::Passed;
        }

        let failure = Failure {
            exit_code: status.code(),
            timed_out,
            stdout,
            stderr,
        };
        tracing::debug!(program = %program.display(), cause = %failure, "snippet failed");
        Outcome::Failed(failure)
    }

    /// Wait for the child, killing it once the timeout has elapsed.
    fn wait(&self, child: &mut Child) -> io::Result<(ExitStatus, bool)> {
        let Some(timeout) = self.timeout else {
            return Ok((child.wait()?, false));
        };
        let started_at = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok((status, false));
            }
            if started_at.elapsed() >= timeout {
                tracing::warn!(timeout_secs = timeout.as_secs_f64(), "killing snippet after timeout");
                kill_tree(child);
                return Ok((child.wait()?, true));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Executor for ProcessExecutor {
    fn execute(&self, artifact: &Artifact) -> Outcome {
        self.run(Command::new(&artifact.path))
    }
}

/// Kill the snippet and everything it spawned into its process group.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: plain syscall; the group was created at spawn and the
            // leader is not reaped yet, so its id cannot have been reused.
            unsafe {
                libc::kill(-pid, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
}

/// Read a pipe on its own thread, forwarding chunks as they arrive.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Receiver<Vec<u8>>> {
    pipe.map(|mut pipe| {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = [0u8; 8192];
            loop {
                match pipe.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        if tx.send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                }
            }
        });
        rx
    })
}

/// Everything a pipe produced until EOF or `deadline`, whichever is first.
fn collect(chunks: Option<Receiver<Vec<u8>>>, deadline: Instant) -> String {
    let Some(chunks) = chunks else {
        return String::new();
    };
    let mut buf = Vec::new();
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match chunks.recv_timeout(remaining) {
            Ok(chunk) => buf.extend_from_slice(&chunk),
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                // keep whatever is already queued
                buf.extend(chunks.try_iter().flatten());
                tracing::debug!("output pipe still open after exit, giving up on it");
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
