// SPDX-License-Identifier: GPL-3.0-or-later

//! Runs child processes to completion.
//!
//! Every external tool (the build command, the compiler, the test executables)
//! goes through the [`Supervisor`]. It captures the standard output and error
//! of the child, forwards termination signals to it and, when asked, kills it
//! after a time limit.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(20);
// How long the output of a killed child is still read.
const KILL_GRACE_PERIOD: Duration = Duration::from_millis(200);

/// The outcome of a child process which ran to completion.
#[derive(Debug, Clone)]
pub struct Captured {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl Captured {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Supervises the execution of child processes.
///
/// The termination signals are registered once, when the supervisor is created.
/// After a signal arrives, the running child is killed and no new child is
/// started: every later call returns [`SuperviseError::Interrupted`].
#[derive(Debug, Clone)]
pub struct Supervisor {
    signaled: Arc<AtomicUsize>,
}

impl Supervisor {
    pub fn new() -> Result<Self, SuperviseError> {
        let signaled = Arc::new(AtomicUsize::new(0));
        for signal in signal_hook::consts::TERM_SIGNALS {
            signal_hook::flag::register_usize(*signal, Arc::clone(&signaled), *signal as usize)
                .map_err(SuperviseError::SignalRegistration)?;
        }
        Ok(Self { signaled })
    }

    /// A supervisor which does not listen to signals.
    pub fn detached() -> Self {
        Self { signaled: Arc::new(AtomicUsize::new(0)) }
    }

    /// Returns the signal number which interrupted the run, if any.
    pub fn interrupted(&self) -> Option<usize> {
        match self.signaled.load(Ordering::SeqCst) {
            0 => None,
            signal => Some(signal),
        }
    }

    /// Starts the command and waits for its completion.
    ///
    /// The standard input of the child is closed, the standard output and error
    /// are captured. A non-zero exit status is not an error here, the caller
    /// decides what it means. Exceeding the `timeout` is an error, and the child
    /// gets killed together with the processes it started.
    pub fn run(&self, command: &mut Command, timeout: Option<Duration>) -> Result<Captured, SuperviseError> {
        let executable = PathBuf::from(command.get_program());
        if let Some(signal) = self.interrupted() {
            return Err(SuperviseError::Interrupted { executable, signal });
        }

        // The child leads a new process group, so it can be killed with all
        // of its descendants.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        log::debug!("Running command: {}", command_line(command));
        let mut child = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| SuperviseError::ProcessSpawn { executable: executable.clone(), source: err })?;

        // The pipes are drained while the child runs, otherwise a chatty child
        // blocks on a full pipe and never exits.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let started = Instant::now();
        let status = loop {
            if let Some(signal) = self.interrupted() {
                log::debug!("Received signal, killing child process");
                terminate(&mut child, &executable)?;
                return Err(SuperviseError::Interrupted { executable, signal });
            }

            match child.try_wait() {
                Ok(Some(exit_status)) => break exit_status,
                Ok(None) => {
                    if let Some(limit) = timeout.filter(|limit| started.elapsed() >= *limit) {
                        log::debug!("Child process exceeded {limit:?}, killing it");
                        terminate(&mut child, &executable)?;
                        // A descendant which left the process group may still
                        // hold the pipes open, so don't wait for the end of them.
                        let deadline = Instant::now() + KILL_GRACE_PERIOD;
                        let stdout = salvage(stdout, deadline);
                        let stderr = salvage(stderr, deadline);
                        return Err(SuperviseError::Timeout { executable, limit, stdout, stderr });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(err) => {
                    log::error!("Error waiting for child process: {err}");
                    return Err(SuperviseError::ProcessWait { executable, source: err });
                }
            }
        };
        log::debug!("Child process exited: {status:?}");

        Ok(Captured { status, stdout: collect(&executable, stdout)?, stderr: collect(&executable, stderr)? })
    }
}

/// Renders the command the way it could be typed into a shell.
pub fn command_line(command: &Command) -> String {
    let words = std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|word| word.to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    shell_words::join(words)
}

fn terminate(child: &mut Child, executable: &Path) -> Result<(), SuperviseError> {
    kill_group(child);
    child
        .kill()
        .map_err(|err| SuperviseError::ProcessKill { executable: executable.to_path_buf(), source: err })?;
    child
        .wait()
        .map_err(|err| SuperviseError::ProcessWait { executable: executable.to_path_buf(), source: err })?;
    Ok(())
}

#[cfg(unix)]
fn kill_group(child: &Child) {
    let group = child.id() as libc::pid_t;
    // SAFETY: the child is not reaped yet, so its process group id can't be reused.
    if unsafe { libc::killpg(group, libc::SIGKILL) } != 0 {
        log::debug!("Failed to kill process group {group}: {}", io::Error::last_os_error());
    }
}

#[cfg(not(unix))]
fn kill_group(_child: &Child) {}

/// The output of a child stream, read on its own thread.
struct Drain {
    buffer: Arc<Mutex<Vec<u8>>>,
    reader: thread::JoinHandle<io::Result<()>>,
}

fn drain<R: Read + Send + 'static>(source: Option<R>) -> Option<Drain> {
    source.map(|mut source| {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buffer);
        let reader = thread::spawn(move || {
            let mut chunk = [0u8; 8192];
            loop {
                match source.read(&mut chunk) {
                    Ok(0) => return Ok(()),
                    Ok(count) => lock(&sink).extend_from_slice(&chunk[..count]),
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                    Err(err) => return Err(err),
                }
            }
        });
        Drain { buffer, reader }
    })
}

fn lock(buffer: &Mutex<Vec<u8>>) -> MutexGuard<'_, Vec<u8>> {
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Waits until the stream is closed and returns everything read from it.
fn collect(executable: &Path, drain: Option<Drain>) -> Result<String, SuperviseError> {
    let Some(Drain { buffer, reader }) = drain else {
        return Ok(String::new());
    };
    reader
        .join()
        .map_err(|_| io::Error::other("output reader thread panicked"))
        .and_then(|result| result)
        .map_err(|err| SuperviseError::OutputCapture { executable: executable.to_path_buf(), source: err })?;
    Ok(String::from_utf8_lossy(&lock(&buffer)).into_owned())
}

/// Returns what was read from the stream until the deadline.
///
/// A reader which is still blocked is left behind, it ends when the last
/// writer of the pipe goes away.
fn salvage(drain: Option<Drain>, deadline: Instant) -> String {
    let Some(Drain { buffer, reader }) = drain else {
        return String::new();
    };
    while !reader.is_finished() && Instant::now() < deadline {
        thread::sleep(POLL_INTERVAL);
    }
    String::from_utf8_lossy(&lock(&buffer)).into_owned()
}

/// Errors that can occur during process supervision.
#[derive(Error, Debug)]
pub enum SuperviseError {
    #[error("Failed to register signal handler: {0}")]
    SignalRegistration(#[source] io::Error),
    #[error("Failed to execute '{executable}': {source}", executable = executable.display())]
    ProcessSpawn {
        executable: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to kill process '{executable}': {source}", executable = executable.display())]
    ProcessKill {
        executable: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to wait for process '{executable}': {source}", executable = executable.display())]
    ProcessWait {
        executable: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to capture the output of '{executable}': {source}", executable = executable.display())]
    OutputCapture {
        executable: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Process '{executable}' did not finish within {limit:?}", executable = executable.display())]
    Timeout { executable: PathBuf, limit: Duration, stdout: String, stderr: String },
    #[error("Process '{executable}' was stopped by signal {signal}", executable = executable.display())]
    Interrupted { executable: PathBuf, signal: usize },
}

impl SuperviseError {
    pub fn is_interrupted(&self) -> bool {
        matches!(self, SuperviseError::Interrupted { .. })
    }
}
