//! Lifecycle pairing of the launcher window and the server process.
//!
//! The supervisor owns at most one window reference and at most one
//! [`ServerProcess`]. Startup attaches the window, spawns the server, waits
//! for it to answer and then navigates. Shutdown terminates the server and
//! drops the window, so the server never outlives its window.
//!
//! Every attach starts a new generation. A startup run only touches the window
//! and server of its own generation.

use crate::APP_NAME;
use crate::config::{LauncherConfig, ReadinessTimings};
use crate::error::CoreError;
use crate::error::supervisor::SupervisorError;
use crate::error::window::WindowError;
use crate::policy::{LinkAction, LinkPolicy};
use crate::readiness::wait_until_reachable;
use crate::server::port::find_listener;
use crate::server::spawn::spawn_server;
use crate::server::{ServerCommand, ServerProcess};

use common::ErrorLocation;

use std::mem::take;
use std::panic::Location;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, info, warn};
use url::Url;

pub const ERROR_DIALOG_TITLE: &str = const_format::concatcp!(APP_NAME, " Error");
pub const ERROR_DIALOG_MESSAGE: &str =
    "Failed to start the terminal. Make sure Python and required packages are installed.";

/// The native window as seen by the supervisor.
///
/// Implemented by the desktop app on top of a Tauri webview window, and by
/// test doubles.
pub trait WindowHost: Send + Sync + 'static {
    /// Whether the native window still exists.
    fn is_open(&self) -> bool;

    /// Show and focus the window.
    fn reveal(&self) -> Result<(), WindowError>;

    /// Load `url` in the window.
    fn navigate(&self, url: &Url) -> Result<(), WindowError>;

    /// Blocking error dialog.
    fn show_error(&self, title: &str, message: &str);

    /// Open `url` in the user's default browser.
    fn open_external(&self, url: &Url) -> Result<(), WindowError>;
}

/// How a startup sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The window was pointed at the server.
    Loaded,
    /// The server never answered or the window refused the URL; the error dialog was shown.
    Failed,
    /// The window went away before navigation; nothing was done.
    WindowClosed,
}

/// Proof that a window was attached; consumed by [`Supervisor::run`].
///
/// Each attach starts a new generation. A run only acts on the window and
/// server of its own generation, so a run outliving its window (closed and
/// reopened during the poll) ends without touching the new one.
#[derive(Debug)]
#[must_use = "an attached window does nothing until the launch is run"]
pub struct Launch {
    generation: u64,
}

struct AttachedWindow<W> {
    generation: u64,
    window: Arc<W>,
    revealed: bool,
}

struct WindowSlot<W> {
    attached: Option<AttachedWindow<W>>,
    // Display-ready arrived before the window was attached
    ready_early: bool,
}

struct RunningServer {
    generation: u64,
    process: ServerProcess,
}

pub struct Supervisor<W: WindowHost> {
    server_command: ServerCommand,
    server_port: u16,
    target: Url,
    timings: ReadinessTimings,
    links: LinkPolicy,
    generation: AtomicU64,
    window: Mutex<WindowSlot<W>>,
    server: Mutex<Option<RunningServer>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<W: WindowHost> Supervisor<W> {
    /// Supervisor for the Streamlit app found under `app_root`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] if the config is invalid or the server URL does not parse.
    pub fn new(config: &LauncherConfig, app_root: &Path) -> Result<Self, CoreError> {
        Self::with_command(config, ServerCommand::streamlit(&config.server, app_root))
    }

    /// Supervisor that runs `server_command` instead of the Streamlit invocation.
    ///
    /// The readiness target is still taken from `config.server`.
    #[track_caller]
    pub fn with_command(
        config: &LauncherConfig,
        server_command: ServerCommand,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let timings = config.readiness.timings()?;

        let url = config.server.url();
        let target = Url::parse(&url).map_err(|e| SupervisorError::InvalidTarget {
            message: format!("Invalid server URL {url}: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(Self {
            server_command,
            server_port: config.server.port,
            links: LinkPolicy::new(target.clone()),
            target,
            timings,
            generation: AtomicU64::new(0),
            window: Mutex::new(WindowSlot {
                attached: None,
                ready_early: false,
            }),
            server: Mutex::new(None),
        })
    }

    /// URL the window is pointed at once the server answers.
    pub fn target(&self) -> &Url {
        &self.target
    }

    pub fn server_command(&self) -> &ServerCommand {
        &self.server_command
    }

    pub fn has_window(&self) -> bool {
        lock(&self.window).attached.is_some()
    }

    pub fn has_server(&self) -> bool {
        lock(&self.server).is_some()
    }

    pub fn server_pid(&self) -> Option<u32> {
        lock(&self.server)
            .as_ref()
            .and_then(|running| running.process.pid())
    }

    /// Attach a window and run the startup sequence.
    ///
    /// Spawn failures are logged only; they surface as a failed navigation.
    ///
    /// # Returns
    ///
    /// * `Ok(NavigationOutcome)` - The sequence ran to completion
    /// * `Err(CoreError)` - A window is already attached
    pub async fn startup(&self, window: Arc<W>) -> Result<NavigationOutcome, CoreError> {
        let launch = self.attach(window)?;
        Ok(self.run(launch).await)
    }

    /// Attach a freshly created, hidden window.
    ///
    /// Call this before the window can report display-ready. A ready signal
    /// that still arrives first is remembered and the window is revealed here.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::AlreadyRunning`] if a window is already attached.
    #[track_caller]
    pub fn attach(&self, window: Arc<W>) -> Result<Launch, CoreError> {
        let mut slot = lock(&self.window);

        if slot.attached.is_some() {
            return Err(SupervisorError::AlreadyRunning {
                message: String::from("A launcher window is already attached"),
                location: ErrorLocation::from(Location::caller()),
            }
            .into());
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let reveal_now = take(&mut slot.ready_early);
        slot.attached = Some(AttachedWindow {
            generation,
            window: Arc::clone(&window),
            revealed: reveal_now,
        });
        drop(slot);

        debug!("Window attached (generation {generation})");

        if reveal_now {
            debug!("Display-ready arrived before attach, revealing now");
            reveal(&*window);
        }

        Ok(Launch { generation })
    }

    /// Spawn the server, wait for it and navigate the window attached by `launch`.
    pub async fn run(&self, launch: Launch) -> NavigationOutcome {
        self.start_server(launch.generation);
        self.navigate_when_ready(launch.generation).await
    }

    fn start_server(&self, generation: u64) {
        if !self.is_attached(generation) {
            debug!("Window of generation {generation} is gone, not spawning a server");
            return;
        }

        match find_listener(self.server_port) {
            Ok(Some(owner)) => warn!(
                "Port {} is already in use by {} (PID: {:?}); the window may show that process",
                owner.port,
                owner.name.as_deref().unwrap_or("an unknown process"),
                owner.pid
            ),
            Ok(None) => {}
            Err(e) => debug!("Skipping port check: {e}"),
        }

        let mut slot = lock(&self.server);

        if let Some(existing) = slot.as_ref() {
            match existing.process.exit() {
                None => {
                    warn!(
                        "Server already running (PID: {:?}), not spawning another",
                        existing.process.pid()
                    );
                    return;
                }
                Some(exit) => debug!("Previous server ended with {exit}"),
            }
        }

        *slot = match spawn_server(&self.server_command, self.server_port) {
            Ok(process) => Some(RunningServer {
                generation,
                process,
            }),
            Err(e) => {
                error!("Failed to start server: {e}");
                None
            }
        };
    }

    fn is_attached(&self, generation: u64) -> bool {
        lock(&self.window)
            .attached
            .as_ref()
            .is_some_and(|attached| attached.generation == generation)
    }

    /// Whether the server spawned for `generation` is no longer running.
    fn server_gone(&self, generation: u64) -> bool {
        lock(&self.server).as_ref().is_none_or(|running| {
            running.generation != generation || running.process.has_exited()
        })
    }

    /// The open window of `generation`, if it is still the attached one.
    fn window_of(&self, generation: u64) -> Option<Arc<W>> {
        lock(&self.window)
            .attached
            .as_ref()
            .filter(|attached| attached.generation == generation)
            .map(|attached| Arc::clone(&attached.window))
            .filter(|window| window.is_open())
    }

    fn current_window(&self) -> Option<Arc<W>> {
        lock(&self.window)
            .attached
            .as_ref()
            .map(|attached| Arc::clone(&attached.window))
            .filter(|window| window.is_open())
    }

    async fn navigate_when_ready(&self, generation: u64) -> NavigationOutcome {
        let readiness =
            wait_until_reachable(&self.target, &self.timings, || self.server_gone(generation))
                .await;

        // The wait is not cancelled on close, so the window may be gone or replaced by now
        let Some(window) = self.window_of(generation) else {
            info!("Window closed before navigation to {}", self.target);
            return NavigationOutcome::WindowClosed;
        };

        let result = readiness
            .map_err(CoreError::from)
            .and_then(|()| window.navigate(&self.target).map_err(CoreError::from));

        match result {
            Ok(()) => {
                info!("Window navigated to {}", self.target);
                NavigationOutcome::Loaded
            }
            Err(e) => {
                error!("Failed to load {}: {e}", self.target);
                window.show_error(ERROR_DIALOG_TITLE, ERROR_DIALOG_MESSAGE);
                NavigationOutcome::Failed
            }
        }
    }

    /// The window finished a page load. Reveals and focuses it on the first one.
    pub fn window_ready(&self) {
        let mut guard = lock(&self.window);
        let slot = &mut *guard;

        let Some(attached) = slot.attached.as_mut() else {
            debug!("Display-ready before attach, deferring reveal");
            slot.ready_early = true;
            return;
        };

        if attached.revealed || !attached.window.is_open() {
            return;
        }

        attached.revealed = true;
        let window = Arc::clone(&attached.window);
        drop(guard);

        reveal(&*window);
    }

    /// Loaded content asked for a new window. It is never created.
    pub fn route_new_window(&self, url: &Url) -> LinkAction {
        let action = self.links.for_new_window(url);
        self.apply_link_action(url, action);
        action
    }

    /// The window is about to navigate. Returns `true` to let it proceed.
    pub fn route_navigation(&self, url: &Url) -> bool {
        let action = self.links.for_navigation(url);
        self.apply_link_action(url, action);
        action == LinkAction::Stay
    }

    fn apply_link_action(&self, url: &Url, action: LinkAction) {
        match action {
            LinkAction::Stay => {}
            LinkAction::OpenExternal => match self.current_window() {
                Some(window) => {
                    info!("Opening {url} in the default browser");
                    if let Err(e) = window.open_external(url) {
                        warn!("Failed to open {url} externally: {e}");
                    }
                }
                None => debug!("No window to open {url} from"),
            },
            LinkAction::Block => debug!("Blocked navigation to {url}"),
        }
    }

    /// Terminate the server and drop the window reference. Safe to call repeatedly.
    pub fn shutdown(&self) {
        let server = lock(&self.server).take();

        if let Some(RunningServer { mut process, .. }) = server {
            if process.terminate() {
                info!("Server termination requested (PID: {:?})", process.pid());
            } else {
                debug!("Server (PID: {:?}) was already stopped", process.pid());
            }
        }

        let mut slot = lock(&self.window);
        slot.ready_early = false;
        if slot.attached.take().is_some() {
            debug!("Window reference cleared");
        }
    }
}

fn reveal<W: WindowHost>(window: &W) {
    if let Err(e) = window.reveal() {
        warn!("Failed to reveal window: {e}");
    }
}
