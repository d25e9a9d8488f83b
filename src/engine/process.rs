//! Engine subprocess spawning and output capture

use crate::error::DispatchError;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const PROCESS_TARGET: &str = "exkutor::engine::process";
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Everything the engine wrote before it exited.
#[derive(Debug)]
pub(super) struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: ExitStatus,
}

/// Wall-clock bound shared by the wait and the output collection.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    limit: Duration,
}

impl Deadline {
    /// `None` when `limit` is too large to represent, which is the same as
    /// waiting forever.
    fn after(start: Instant, limit: Duration) -> Option<Self> {
        start.checked_add(limit).map(|at| Self { at, limit })
    }

    fn remaining(self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    fn expired(self) -> bool {
        Instant::now() >= self.at
    }

    fn error(self) -> DispatchError {
        DispatchError::Timeout {
            timeout_secs: self.limit.as_secs(),
        }
    }
}

/// Owns a running child and reaps it on every exit path.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }

    fn wait(&mut self) -> io::Result<ExitStatus> {
        let status = self.child.wait()?;
        self.reaped = true;
        Ok(status)
    }

    /// Poll for exit, killing the child once `deadline` has passed.
    fn wait_until(&mut self, deadline: Deadline) -> Result<ExitStatus, DispatchError> {
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    self.reaped = true;
                    return Ok(status);
                }
                Ok(None) if deadline.expired() => {
                    warn!(
                        target: PROCESS_TARGET,
                        pid = self.child.id(),
                        timeout_secs = deadline.limit.as_secs(),
                        "engine timed out, killing process"
                    );
                    self.kill_and_reap();
                    return Err(deadline.error());
                }
                Ok(None) => thread::sleep(POLL_INTERVAL.min(deadline.remaining())),
                Err(source) => return Err(DispatchError::Capture { source }),
            }
        }
    }

    fn kill_and_reap(&mut self) {
        drop(self.child.kill());
        drop(self.child.wait());
        self.reaped = true;
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.reaped {
            self.kill_and_reap();
        }
    }
}

/// Run `program` with `args`, capturing stdout and stderr in full.
///
/// Both pipes are drained on helper threads so a chatty engine cannot stall
/// on a full pipe buffer. With a timeout, one deadline covers both the exit
/// and the output collection: a background grandchild that keeps the pipes
/// open after the engine exits still ends in [`DispatchError::Timeout`], and
/// its readers are left detached.
pub(super) fn run(
    program: &Path,
    args: &[&str],
    timeout: Option<Duration>,
) -> Result<CapturedOutput, DispatchError> {
    debug!(
        target: PROCESS_TARGET,
        program = %program.display(),
        ?timeout,
        "spawning engine"
    );

    let deadline = timeout.and_then(|limit| Deadline::after(Instant::now(), limit));
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| DispatchError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

    let mut guard = ChildGuard::new(child);
    let stdout_reader = spawn_reader(guard.child.stdout.take());
    let stderr_reader = spawn_reader(guard.child.stderr.take());

    let status = match deadline {
        Some(deadline) => guard.wait_until(deadline)?,
        None => guard
            .wait()
            .map_err(|source| DispatchError::Capture { source })?,
    };

    let stdout = collect_reader(&stdout_reader, deadline)?;
    let stderr = collect_reader(&stderr_reader, deadline)?;

    debug!(
        target: PROCESS_TARGET,
        ?status,
        stdout_bytes = stdout.len(),
        stderr_bytes = stderr.len(),
        "engine exited"
    );

    Ok(CapturedOutput {
        stdout,
        stderr,
        status,
    })
}

fn spawn_reader<R>(source: Option<R>) -> Receiver<io::Result<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let result = match source {
            Some(mut pipe) => pipe.read_to_end(&mut buffer).map(|_| buffer),
            None => Ok(buffer),
        };
        // The receiver is gone if the caller already gave up on this run.
        drop(sender.send(result));
    });
    receiver
}

/// Wait for one reader, no later than `deadline` when there is one.
fn collect_reader(
    receiver: &Receiver<io::Result<Vec<u8>>>,
    deadline: Option<Deadline>,
) -> Result<String, DispatchError> {
    let received = match deadline {
        Some(deadline) => receiver
            .recv_timeout(deadline.remaining())
            .map_err(|err| match err {
                RecvTimeoutError::Timeout => {
                    warn!(
                        target: PROCESS_TARGET,
                        timeout_secs = deadline.limit.as_secs(),
                        "engine output still open at deadline, abandoning readers"
                    );
                    deadline.error()
                }
                RecvTimeoutError::Disconnected => reader_lost(),
            })?,
        None => receiver.recv().map_err(|_| reader_lost())?,
    };
    let bytes = received.map_err(|source| DispatchError::Capture { source })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn reader_lost() -> DispatchError {
    DispatchError::Capture {
        source: io::Error::other("output reader panicked"),
    }
}
