use crate::error::spawn::SpawnError;
use crate::server::ServerCommand;

use common::ErrorLocation;

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::io::Result as IoResult;
use std::panic::Location;
use std::process::ExitStatus;
use std::sync::OnceLock;

use log::{debug, error, info, warn};
use regex::Regex;
use sysinfo::{Pid, ProcessesToUpdate, Signal, System};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child as TokioChild;
use tokio::spawn as TokioSpawn;
use tokio::sync::{oneshot, watch};

const SERVER_LOG_TARGET: &str = "server";
const ANNOUNCED_URL_PATTERN: &str = r"https?://(?P<host>[^\s:/]+):(?P<port>\d+)";
const URL_CAPTURE_HOST: &str = "host";
const URL_CAPTURE_PORT: &str = "port";

static URL_REGEX: OnceLock<Regex> = OnceLock::new();

pub(crate) fn get_url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| Regex::new(ANNOUNCED_URL_PATTERN).expect("valid regex pattern"))
}

/// Host and port of a URL the server printed, e.g. `Local URL: http://localhost:8501`.
pub(crate) fn announced_address(line: &str) -> Option<(String, u16)> {
    let caps = get_url_regex().captures(line)?;
    let host = caps.name(URL_CAPTURE_HOST)?.as_str().to_string();
    let port = caps.name(URL_CAPTURE_PORT)?.as_str().parse::<u16>().ok()?;
    Some((host, port))
}

/// How the child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerExit {
    /// `None` when the process was ended by a signal.
    pub code: Option<i32>,
}

impl ServerExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ServerExit {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl Display for ServerExit {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self.code {
            Some(code) => write!(formatter, "exit code {code}"),
            None => write!(formatter, "terminated by signal"),
        }
    }
}

/// Handle to the spawned server.
///
/// The child itself is owned by a supervising task that reaps it and
/// publishes its exit. Dropping the handle kills the child.
#[derive(Debug)]
pub struct ServerProcess {
    pid: Option<u32>,
    terminate_tx: Option<oneshot::Sender<bool>>,
    exit_rx: watch::Receiver<Option<ServerExit>>,
}

impl ServerProcess {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn has_exited(&self) -> bool {
        self.exit_rx.borrow().is_some()
    }

    pub fn exit(&self) -> Option<ServerExit> {
        *self.exit_rx.borrow()
    }

    /// Ask the child to stop.
    ///
    /// Sends SIGTERM where the platform supports it, otherwise kills the
    /// process. Does not wait for the child to exit. Calling it again is a
    /// no-op.
    ///
    /// # Returns
    ///
    /// * `true` - A termination request was issued
    /// * `false` - Already terminated, or the child had already exited
    pub fn terminate(&mut self) -> bool {
        let Some(terminate_tx) = self.terminate_tx.take() else {
            debug!("Terminate already requested for server (PID: {:?})", self.pid);
            return false;
        };

        if self.has_exited() {
            debug!("Server (PID: {:?}) already exited", self.pid);
            return false;
        }

        let signalled = self.pid.is_some_and(signal_terminate);

        // The supervising task falls back to a hard kill when no signal went out
        if terminate_tx.send(signalled).is_err() {
            debug!("Server supervisor already finished (PID: {:?})", self.pid);
        }

        true
    }

    /// Wait until the supervising task has reaped the child.
    pub async fn wait(&mut self) -> Option<ServerExit> {
        self.exit_rx
            .wait_for(|exit| exit.is_some())
            .await
            .ok()
            .and_then(|exit| *exit)
    }
}

/// Spawn the server process and start forwarding its output.
///
/// Must be called from within a tokio runtime.
///
/// # Arguments
///
/// * `command` - Resolved invocation
/// * `expected_port` - Port the server should announce; a different announced port is logged
///
/// # Returns
///
/// * `Ok(ServerProcess)` - The child started
/// * `Err(SpawnError)` - The interpreter could not be started or its pipes were missing
#[track_caller]
pub fn spawn_server(
    command: &ServerCommand,
    expected_port: u16,
) -> Result<ServerProcess, SpawnError> {
    info!("Starting server: {command}");
    debug!("Server working directory: {}", command.working_dir().display());

    let mut child = command.to_command().spawn().map_err(|e| SpawnError::Spawn {
        message: format!("Failed to spawn {}: {e}", command.program().display()),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(e),
    })?;

    let pid = child.id();
    info!("Server spawned (PID: {pid:?})");

    let stdout = child.stdout.take().ok_or_else(|| SpawnError::Stream {
        message: "Child process has no stdout".to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let stderr = child.stderr.take().ok_or_else(|| SpawnError::Stream {
        message: "Child process has no stderr".to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    TokioSpawn(forward_lines(stdout, "stdout", Some(expected_port)));
    TokioSpawn(forward_lines(stderr, "stderr", None));

    let (terminate_tx, terminate_rx) = oneshot::channel();
    let (exit_tx, exit_rx) = watch::channel(None);

    TokioSpawn(supervise(child, pid, terminate_rx, exit_tx));

    Ok(ServerProcess {
        pid,
        terminate_tx: Some(terminate_tx),
        exit_rx,
    })
}

async fn forward_lines<R>(stream: R, stream_name: &'static str, expected_port: Option<u16>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut lines = BufReader::new(stream).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                info!(target: SERVER_LOG_TARGET, "{stream_name}: {line}");

                if let Some(expected) = expected_port
                    && let Some((host, port)) = announced_address(&line)
                {
                    if port == expected {
                        debug!("Server announced http://{host}:{port}");
                    } else {
                        warn!("Server announced port {port} on {host}, expected {expected}");
                    }
                }
            }
            Ok(None) => {
                debug!("Server {stream_name} closed");
                break;
            }
            Err(e) => {
                warn!("Failed to read server {stream_name}: {e}");
                break;
            }
        }
    }
}

/// What woke the supervising task.
enum Wake {
    Exited(IoResult<ExitStatus>),
    Signalled,
    KillRequested,
}

async fn supervise(
    mut child: TokioChild,
    pid: Option<u32>,
    terminate_rx: oneshot::Receiver<bool>,
    exit_tx: watch::Sender<Option<ServerExit>>,
) {
    let wake = tokio::select! {
        status = child.wait() => Wake::Exited(status),
        // A dropped handle reads as an unsignalled request
        signalled = terminate_rx => match signalled {
            Ok(true) => Wake::Signalled,
            Ok(false) | Err(_) => Wake::KillRequested,
        },
    };

    let status = match wake {
        Wake::Exited(status) => status,
        Wake::Signalled => child.wait().await,
        Wake::KillRequested => {
            debug!("Killing server (PID: {pid:?})");
            if let Err(e) = child.start_kill() {
                warn!("Failed to kill server (PID: {pid:?}): {e}");
            }
            child.wait().await
        }
    };

    let exit = match status {
        Ok(status) => ServerExit::from(status),
        Err(e) => {
            error!("Failed to wait for server (PID: {pid:?}): {e}");
            ServerExit { code: None }
        }
    };

    if exit.success() {
        info!("Server process exited with {exit}");
    } else {
        warn!("Server process exited with {exit}");
    }

    exit_tx.send_replace(Some(exit));
}

/// Send SIGTERM to `pid`. Returns `false` if the process is gone or the
/// platform has no such signal.
fn signal_terminate(pid: u32) -> bool {
    let mut sys = System::new();
    let target = Pid::from_u32(pid);
    sys.refresh_processes(ProcessesToUpdate::Some(&[target]), true);

    match sys.process(target).and_then(|p| p.kill_with(Signal::Term)) {
        Some(sent) => {
            debug!("Sent SIGTERM to PID {pid}: success={sent}");
            sent
        }
        None => {
            debug!("SIGTERM unavailable for PID {pid}");
            false
        }
    }
}
